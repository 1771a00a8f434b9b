use egui::{Mesh, Pos2, Stroke, Vec2};
use egui_plot::{Plot, PlotPoint};

use super::gradient::{ColorRamp, RenderArea};
use super::state::CpuChart;

/// Vertical subdivisions per column of the area fill. Vertex colors are
/// interpolated linearly, so more rows follow the ramp stops more closely.
const FILL_ROWS: u32 = 8;

pub fn show(ui: &mut egui::Ui, chart: &mut CpuChart, height: f32, line_width: f32) {
    let data = chart.chart_data();
    let window = chart.window();

    ui.horizontal(|ui| {
        ui.label(format!("CPU Usage: {:.1}%", window.latest().value));
        ui.add_space(16.0);
        ui.label(format!("Peak: {:.1}%", window.peak()));
    });
    if let Some(warning) = chart.warning() {
        let color = ui.visuals().warn_fg_color;
        ui.colored_label(color, format!("⚠ {warning}"));
    }

    let x_max = data.labels.len().saturating_sub(1).max(1) as f64;
    let plot = Plot::new(("cpu_plot", chart.channel()))
        .height(height)
        .show_axes([data.axes.x_visible, true])
        .show_x(false)
        .show_y(false)
        .set_margin_fraction(Vec2::ZERO)
        .include_x(0.0)
        .include_x(x_max)
        .include_y(data.axes.y_min)
        .include_y(data.axes.y_max)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .allow_double_click_reset(false);

    let transform = plot.show(ui, |_plot_ui| {}).transform;
    let frame = *transform.frame();

    let points: Vec<Pos2> = data
        .labels
        .iter()
        .zip(&data.series)
        .map(|(&x, sample)| transform.position_from_point(&PlotPoint::new(x as f64, sample.value as f64)))
        .collect();
    let baseline = transform
        .position_from_point(&PlotPoint::new(0.0, data.axes.y_min))
        .y;

    // Values beyond the axis range are clipped by the frame.
    let painter = ui.painter_at(frame);
    painter.add(fill_mesh(&points, baseline, &data.fill));
    for pair in points.windows(2) {
        let color = data.stroke.color_at((pair[0].y + pair[1].y) / 2.0);
        painter.line_segment([pair[0], pair[1]], Stroke::new(line_width, color));
    }

    if chart.set_render_area(RenderArea::from(frame)) {
        ui.ctx().request_repaint();
    }
}

fn fill_mesh(points: &[Pos2], baseline: f32, ramp: &ColorRamp) -> Mesh {
    let mut mesh = Mesh::default();
    for pair in points.windows(2) {
        let first = mesh.vertices.len() as u32;
        for row in 0..=FILL_ROWS {
            let t = row as f32 / FILL_ROWS as f32;
            for point in pair {
                let y = baseline + (point.y - baseline) * t;
                mesh.colored_vertex(Pos2::new(point.x, y), ramp.color_at(y));
            }
        }
        for row in 0..FILL_ROWS {
            let i = first + row * 2;
            mesh.add_triangle(i, i + 1, i + 2);
            mesh.add_triangle(i + 1, i + 3, i + 2);
        }
    }
    mesh
}
