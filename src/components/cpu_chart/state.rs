use log::{info, warn};

use super::gradient::{build_gradient, ColorRamp, RenderArea};
use super::subscription::{SampleInbox, Subscription};
use super::theme;
use super::window::SlidingWindow;
use crate::error::SubscriptionError;
use crate::event::{EventBus, Sample};

/// Fixed axis layout of the chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisConfig {
    pub y_min: f64,
    pub y_max: f64,
    pub x_visible: bool,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            y_min: 0.0,
            y_max: 100.0,
            x_visible: false,
        }
    }
}

/// Everything the plot needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub labels: Vec<usize>,
    pub series: Vec<Sample>,
    pub stroke: ColorRamp,
    pub fill: ColorRamp,
    pub axes: AxisConfig,
}

/// A live CPU chart bound to one event channel.
///
/// Owns its window exclusively; the only way samples get in is
/// [`CpuChart::advance`], which drains what the subscription collected.
#[derive(Debug)]
pub struct CpuChart {
    channel: String,
    window: SlidingWindow,
    inbox: SampleInbox,
    subscription: Subscription,
    render_area: Option<RenderArea>,
    warning: Option<String>,
}

impl CpuChart {
    pub fn new(channel: impl Into<String>, capacity: usize) -> Self {
        Self {
            channel: channel.into(),
            window: SlidingWindow::initial(capacity),
            inbox: SampleInbox::new(),
            subscription: Subscription::new(),
            render_area: None,
            warning: None,
        }
    }

    /// Creates the chart and subscribes it right away. A failed subscription
    /// is kept as a warning; the chart still renders its zeros.
    pub fn mount(bus: &EventBus, channel: impl Into<String>, capacity: usize) -> Self {
        let mut chart = Self::new(channel, capacity);
        info!(
            "Mounting chart on `{}` with {} samples",
            chart.channel,
            chart.window.capacity()
        );
        // Already surfaced through `warning()`.
        let _ = chart.activate(bus);
        chart
    }

    pub fn activate(&mut self, bus: &EventBus) -> Result<(), SubscriptionError> {
        match self.subscription.activate(bus, &self.channel, &self.inbox) {
            Ok(_) => {
                self.warning = None;
                Ok(())
            }
            Err(err) => {
                warn!("Chart on `{}` is not receiving data: {err}", self.channel);
                if !matches!(err, SubscriptionError::AlreadyActive(_)) {
                    self.warning = Some(err.to_string());
                }
                Err(err)
            }
        }
    }

    pub fn deactivate(&mut self) -> bool {
        self.subscription.deactivate()
    }

    /// Releases the subscription and discards the window.
    pub fn unmount(mut self) {
        info!("Unmounting chart on `{}`", self.channel);
        self.deactivate();
    }

    pub fn is_active(&self) -> bool {
        self.subscription.is_active()
    }

    /// Pushes every sample received since the last call, in order, and
    /// returns how many there were. Without new samples this changes nothing.
    pub fn advance(&mut self) -> usize {
        let pending = self.inbox.drain();
        for sample in &pending {
            self.window.push(*sample);
        }
        pending.len()
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn window(&self) -> &SlidingWindow {
        &self.window
    }

    pub fn snapshot(&self) -> Vec<Sample> {
        self.window.snapshot()
    }

    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    pub fn render_area(&self) -> Option<RenderArea> {
        self.render_area
    }

    /// Records the plot geometry seen in the last frame. Returns `true` when
    /// it changed, meaning the ramps are stale.
    pub fn set_render_area(&mut self, area: RenderArea) -> bool {
        let changed = self.render_area != Some(area);
        self.render_area = Some(area);
        changed
    }

    pub fn chart_data(&self) -> ChartData {
        let theme = theme::current();
        ChartData {
            labels: (0..self.window.capacity()).collect(),
            series: self.window.snapshot(),
            stroke: build_gradient(self.render_area, theme.stroke_alpha),
            fill: build_gradient(self.render_area, theme.fill_alpha),
            axes: AxisConfig::default(),
        }
    }
}
