use log::{debug, info};
use once_cell::sync::OnceCell;

static THEME: OnceCell<ChartTheme> = OnceCell::new();

/// Process-wide chart styling, registered once before any chart exists.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartTheme {
    /// Color at the bottom of the value ramp.
    pub low: [u8; 3],
    pub mid: [u8; 3],
    pub high: [u8; 3],
    /// Used while the plot area has no geometry yet.
    pub fallback: [u8; 3],
    pub stroke_alpha: f32,
    pub fill_alpha: f32,
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self {
            low: [0, 255, 0],
            mid: [255, 255, 0],
            high: [255, 0, 0],
            fallback: [255, 0, 0],
            stroke_alpha: 1.0,
            fill_alpha: 0.2,
        }
    }
}

/// Registers the theme for the whole process. Only the first call has an
/// effect; later calls return `false` and leave the registered theme alone.
pub fn register(theme: ChartTheme) -> bool {
    match THEME.set(theme) {
        Ok(()) => {
            info!("Registered chart theme");
            true
        }
        Err(_) => {
            debug!("Chart theme already registered, ignoring");
            false
        }
    }
}

/// The registered theme, or the default one if nothing was registered.
pub fn current() -> &'static ChartTheme {
    THEME.get_or_init(ChartTheme::default)
}
