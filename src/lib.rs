#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod components;
pub mod error;
pub mod event;
pub mod metrics;
pub use app::CpuChartApp;
