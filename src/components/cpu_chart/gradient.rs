//! Green → yellow → red ramp over the plot area.
//!
//! The ramp colors screen space, not individual samples: a point is colored
//! by where it lands between the bottom and the top edge of the plot.

use egui::{Color32, Rect};

use super::theme::{self, ChartTheme};

/// Vertical extent of the surface the series is drawn on, in screen
/// coordinates (y grows downwards, so `bottom > top`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderArea {
    pub top: f32,
    pub bottom: f32,
}

impl RenderArea {
    pub fn new(top: f32, bottom: f32) -> Self {
        Self { top, bottom }
    }
}

impl From<Rect> for RenderArea {
    fn from(rect: Rect) -> Self {
        Self::new(rect.top(), rect.bottom())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// Relative position, 0 at the bottom edge and 1 at the top edge.
    pub position: f32,
    pub rgb: [u8; 3],
    pub alpha: f32,
}

impl GradientStop {
    pub fn color32(&self) -> Color32 {
        to_color32(self.rgb, self.alpha)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColorRamp {
    Linear {
        area: RenderArea,
        stops: [GradientStop; 3],
    },
    Solid(GradientStop),
}

/// Builds the ramp for `area` using the registered chart theme.
pub fn build_gradient(area: Option<RenderArea>, alpha: f32) -> ColorRamp {
    build_gradient_with(theme::current(), area, alpha)
}

pub fn build_gradient_with(theme: &ChartTheme, area: Option<RenderArea>, alpha: f32) -> ColorRamp {
    let stop = |position, rgb| GradientStop {
        position,
        rgb,
        alpha,
    };

    match area {
        Some(area) => ColorRamp::Linear {
            area,
            stops: [
                stop(0.0, theme.low),
                stop(0.5, theme.mid),
                stop(1.0, theme.high),
            ],
        },
        None => ColorRamp::Solid(stop(0.0, theme.fallback)),
    }
}

impl ColorRamp {
    pub fn is_solid(&self) -> bool {
        matches!(self, ColorRamp::Solid(_))
    }

    pub fn stops(&self) -> &[GradientStop] {
        match self {
            ColorRamp::Linear { stops, .. } => stops,
            ColorRamp::Solid(stop) => std::slice::from_ref(stop),
        }
    }

    /// Color at screen-space height `y`.
    pub fn color_at(&self, y: f32) -> Color32 {
        match self {
            ColorRamp::Solid(stop) => stop.color32(),
            ColorRamp::Linear { area, stops } => {
                let height = area.bottom - area.top;
                let t = if height.abs() <= f32::EPSILON {
                    0.0
                } else {
                    ((area.bottom - y) / height).clamp(0.0, 1.0)
                };
                let (rgb, alpha) = sample_stops(stops, t);
                to_color32(rgb, alpha)
            }
        }
    }
}

fn sample_stops(stops: &[GradientStop], t: f32) -> ([u8; 3], f32) {
    let upper = stops
        .iter()
        .position(|s| s.position >= t)
        .unwrap_or(stops.len() - 1);
    if upper == 0 {
        return (stops[0].rgb, stops[0].alpha);
    }

    let (a, b) = (&stops[upper - 1], &stops[upper]);
    let span = b.position - a.position;
    let f = if span > 0.0 {
        (t - a.position) / span
    } else {
        1.0
    };
    let channel = |i: usize| (a.rgb[i] as f32 + (b.rgb[i] as f32 - a.rgb[i] as f32) * f).round() as u8;

    (
        [channel(0), channel(1), channel(2)],
        a.alpha + (b.alpha - a.alpha) * f,
    )
}

fn to_color32(rgb: [u8; 3], alpha: f32) -> Color32 {
    let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(rgb[0], rgb[1], rgb[2], a)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREEN: [u8; 3] = [0, 255, 0];
    const YELLOW: [u8; 3] = [255, 255, 0];
    const RED: [u8; 3] = [255, 0, 0];

    fn linear(alpha: f32) -> ColorRamp {
        build_gradient_with(&ChartTheme::default(), Some(RenderArea::new(0.0, 100.0)), alpha)
    }

    #[test]
    fn opaque_ramp_has_three_stops() {
        let ramp = linear(1.0);
        let stops: Vec<_> = ramp.stops().iter().map(|s| (s.position, s.rgb, s.alpha)).collect();
        assert_eq!(
            stops,
            vec![(0.0, GREEN, 1.0), (0.5, YELLOW, 1.0), (1.0, RED, 1.0)]
        );
    }

    #[test]
    fn translucent_ramp_keeps_positions() {
        let ramp = linear(0.2);
        let stops: Vec<_> = ramp.stops().iter().map(|s| (s.position, s.rgb, s.alpha)).collect();
        assert_eq!(
            stops,
            vec![(0.0, GREEN, 0.2), (0.5, YELLOW, 0.2), (1.0, RED, 0.2)]
        );
        assert!(ramp.stops().iter().all(|s| s.color32().a() == 51));
    }

    #[test]
    fn no_area_falls_back_to_solid() {
        let ramp = build_gradient_with(&ChartTheme::default(), None, 1.0);
        assert!(ramp.is_solid());
        assert_eq!(ramp.color_at(0.0), Color32::from_rgb(255, 0, 0));
        assert_eq!(ramp.color_at(500.0), ramp.color_at(-20.0));
    }

    #[test]
    fn color_follows_screen_height() {
        let ramp = linear(1.0);
        assert_eq!(ramp.color_at(100.0), Color32::from_rgb(0, 255, 0));
        assert_eq!(ramp.color_at(50.0), Color32::from_rgb(255, 255, 0));
        assert_eq!(ramp.color_at(0.0), Color32::from_rgb(255, 0, 0));
        // halfway between green and yellow
        assert_eq!(ramp.color_at(75.0), Color32::from_rgb(128, 255, 0));
    }

    #[test]
    fn points_outside_the_area_are_clamped() {
        let ramp = linear(1.0);
        assert_eq!(ramp.color_at(180.0), ramp.color_at(100.0));
        assert_eq!(ramp.color_at(-40.0), ramp.color_at(0.0));
    }

    #[test]
    fn degenerate_area_uses_bottom_color() {
        let ramp = build_gradient_with(&ChartTheme::default(), Some(RenderArea::new(10.0, 10.0)), 1.0);
        assert_eq!(ramp.color_at(10.0), Color32::from_rgb(0, 255, 0));
    }

    #[test]
    fn area_from_rect() {
        let rect = Rect::from_min_max(egui::pos2(5.0, 20.0), egui::pos2(200.0, 180.0));
        assert_eq!(RenderArea::from(rect), RenderArea::new(20.0, 180.0));
    }
}
