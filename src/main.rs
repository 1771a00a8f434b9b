#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use cpu_line::components::cpu_chart::theme::{self, ChartTheme};

fn main() -> eframe::Result {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    // Once per process, before any chart is built.
    theme::register(ChartTheme::default());

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([480.0, 360.0])
            .with_min_inner_size([300.0, 220.0]),
        ..Default::default()
    };
    eframe::run_native(
        "cpu-line",
        native_options,
        Box::new(|cc| Ok(Box::new(cpu_line::CpuChartApp::new(cc)))),
    )
}
