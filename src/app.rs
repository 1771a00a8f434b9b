use log::warn;

use crate::components::cpu_chart::{self, CpuChart};
use crate::components::{show_settings_window, Settings};
use crate::event::EventBus;
use crate::metrics::CpuProducer;

const SETTINGS_KEY: &str = "cpu_line_settings";

// Field order is drop order: the chart lets go of its listener before the
// producer and the bus go away.
pub struct CpuChartApp {
    chart: CpuChart,
    producer: Option<CpuProducer>,
    bus: EventBus,
    settings: Settings,
}

impl CpuChartApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Load previous settings (if any).
        // Note that you must enable the `persistence` feature for this to work.
        let settings: Settings = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, SETTINGS_KEY))
            .unwrap_or_default();

        // Every emitted sample wakes the UI; there is no continuous repaint.
        let ctx = cc.egui_ctx.clone();
        let bus = EventBus::with_waker(move || ctx.request_repaint());

        Self::with_bus(bus, settings)
    }

    pub fn with_bus(bus: EventBus, settings: Settings) -> Self {
        let producer = start_producer(&bus, &settings);
        let chart = CpuChart::mount(&bus, settings.channel.clone(), settings.history_length);

        Self {
            chart,
            producer,
            bus,
            settings,
        }
    }

    pub fn chart(&self) -> &CpuChart {
        &self.chart
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Delivers pending events and advances the chart.
    fn update_metrics(&mut self) {
        self.bus.pump();
        self.chart.advance();
    }

    pub fn apply_settings_changes(&mut self, previous: &Settings) {
        if previous.update_interval_ms != self.settings.update_interval_ms {
            if let Some(producer) = &self.producer {
                producer.set_update_interval(self.settings.update_interval());
            }
        }
        if previous.channel != self.settings.channel {
            self.switch_channel(&previous.channel);
        } else if previous.history_length != self.settings.history_length {
            self.remount_chart();
        }
    }

    /// Moves the producer and the chart over to the configured channel and
    /// closes the one they used before.
    fn switch_channel(&mut self, previous: &str) {
        self.chart.deactivate();
        self.producer = None;
        self.bus.close_channel(previous);
        self.producer = start_producer(&self.bus, &self.settings);
        self.remount_chart();
    }

    /// Swaps in a fresh chart. The old subscription is released before the
    /// new one is taken.
    fn remount_chart(&mut self) {
        self.chart.deactivate();
        let fresh = CpuChart::mount(
            &self.bus,
            self.settings.channel.clone(),
            self.settings.history_length,
        );
        std::mem::replace(&mut self.chart, fresh).unmount();
    }
}

fn start_producer(bus: &EventBus, settings: &Settings) -> Option<CpuProducer> {
    let emitter = bus.open_channel(&settings.channel);
    match CpuProducer::spawn(emitter, settings.update_interval()) {
        Ok(producer) => Some(producer),
        Err(err) => {
            warn!("Could not start CPU producer: {err}");
            None
        }
    }
}

impl eframe::App for CpuChartApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, SETTINGS_KEY, &self.settings);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let previous = self.settings.clone();
        self.settings.apply(ctx);
        self.update_metrics();

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.add_space(16.0);
                egui::widgets::global_theme_preference_buttons(ui);

                ui.add_space(16.0);
                if ui.button("⚙").clicked() {
                    self.settings.show();
                }
            });
        });

        show_settings_window(ctx, &mut self.settings);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("CPU");
            cpu_chart::show(
                ui,
                &mut self.chart,
                self.settings.chart_height,
                self.settings.line_width,
            );
        });

        if previous != self.settings {
            self.apply_settings_changes(&previous);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_one_subscription_and_zeros() {
        let app = CpuChartApp::with_bus(EventBus::new(), Settings::default());
        assert!(app.chart().is_active());
        assert_eq!(app.chart().window().capacity(), 20);
        assert!(app.chart().snapshot().iter().all(|s| s.value == 0.0));
    }

    #[test]
    fn changing_history_length_remounts_the_chart() {
        let mut app = CpuChartApp::with_bus(EventBus::new(), Settings::default());
        let previous = app.settings.clone();

        app.settings_mut().history_length = 50;
        app.apply_settings_changes(&previous);

        assert_eq!(app.chart().window().capacity(), 50);
        assert!(app.chart().is_active());
        assert_eq!(app.bus.listener_count("cpu"), 1);
    }

    #[test]
    fn changing_the_interval_keeps_the_chart() {
        let mut app = CpuChartApp::with_bus(EventBus::new(), Settings::default());
        let previous = app.settings.clone();

        app.settings_mut().update_interval_ms = 2000;
        app.apply_settings_changes(&previous);

        let producer = app.producer.as_ref().unwrap();
        assert_eq!(producer.update_interval(), std::time::Duration::from_secs(2));
        assert_eq!(app.bus.listener_count("cpu"), 1);
    }

    #[test]
    fn changing_the_channel_moves_producer_and_chart() {
        let mut app = CpuChartApp::with_bus(EventBus::new(), Settings::default());
        let previous = app.settings.clone();

        app.settings_mut().channel = "cpu-alt".to_owned();
        app.apply_settings_changes(&previous);

        assert!(app.chart().is_active());
        assert!(app.chart().warning().is_none());
        assert_eq!(app.chart().channel(), "cpu-alt");
        assert!(app.bus.is_open("cpu-alt"));
        assert!(!app.bus.is_open("cpu"));
        assert_eq!(app.bus.listener_count("cpu"), 0);
        assert_eq!(app.bus.listener_count("cpu-alt"), 1);
        assert!(app.producer.as_ref().unwrap().is_running());

        app.bus
            .open_channel("cpu-alt")
            .emit_value(serde_json::json!({ "cpu": { "usage": 33.0 } }))
            .unwrap();
        app.update_metrics();
        assert!(app.chart().snapshot().iter().any(|s| s.value == 33.0));
    }
}
