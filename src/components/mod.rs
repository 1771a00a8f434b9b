pub mod cpu_chart;
pub mod settings;

pub use cpu_chart::CpuChart;
pub use settings::{show_settings_window, Settings};
