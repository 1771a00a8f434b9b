use std::time::Duration;

pub const DEFAULT_CHANNEL: &str = "cpu";

#[derive(serde::Deserialize, serde::Serialize, Clone, Debug, PartialEq)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct Settings {
    pub scale: f32,
    pub font_size: f32,
    pub update_interval_ms: u64,
    /// Number of samples kept in the chart window.
    pub history_length: usize,
    pub line_width: f32,
    pub chart_height: f32,
    pub channel: String,
    #[serde(skip)]
    show_window: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scale: 1.2,
            font_size: 15.0,
            update_interval_ms: 1000,
            history_length: 20,
            line_width: 2.0,
            chart_height: 220.0,
            channel: DEFAULT_CHANNEL.to_owned(),
            show_window: false,
        }
    }
}

impl Settings {
    pub fn show(&mut self) {
        self.show_window = true;
    }

    pub fn is_visible(&self) -> bool {
        self.show_window
    }

    pub fn hide(&mut self) {
        self.show_window = false;
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms)
    }

    pub fn apply(&self, ctx: &egui::Context) {
        ctx.set_pixels_per_point(self.scale);

        let mut style = (*ctx.style()).clone();
        style.text_styles = [
            (
                egui::TextStyle::Heading,
                egui::FontId::new(self.font_size + 4.0, egui::FontFamily::Proportional),
            ),
            (
                egui::TextStyle::Body,
                egui::FontId::new(self.font_size, egui::FontFamily::Proportional),
            ),
            (
                egui::TextStyle::Monospace,
                egui::FontId::new(self.font_size, egui::FontFamily::Monospace),
            ),
            (
                egui::TextStyle::Button,
                egui::FontId::new(self.font_size, egui::FontFamily::Proportional),
            ),
            (
                egui::TextStyle::Small,
                egui::FontId::new(self.font_size - 2.0, egui::FontFamily::Proportional),
            ),
        ]
        .into();
        ctx.set_style(style);
    }
}
