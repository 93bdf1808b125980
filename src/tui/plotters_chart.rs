//! Plotters-powered expansion-rate chart widget for Ratatui.
//!
//! Plotters gives us axis and tick rendering for free; the output lands in the
//! Ratatui buffer through `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A render-only chart description.
///
/// All series and bounds are computed outside the render call.
pub struct UamPlottersChart<'a> {
    /// Line series for the selected quantity.
    pub curve: &'a [(f64, f64)],
    /// Matter-only reference `Ωm (1+z)³` (empty unless E² is shown).
    pub reference: &'a [(f64, f64)],
    /// Marker at the cursor redshift.
    pub cursor: Option<(f64, f64)>,
    /// X bounds (redshift).
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: String,
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for UamPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to lay out a chart in a tiny area.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let x0 = self.x_bounds[0];
        let x1 = self.x_bounds[1];
        let y0 = self.y_bounds[0];
        let y1 = self.y_bounds[1];

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(&self.y_label)
                .x_labels(6)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let curve_color = RGBColor(0, 255, 255); // cyan
            let reference_color = RGBColor(255, 200, 0); // amber
            let cursor_color = RGBColor(255, 0, 255); // magenta

            if !self.reference.is_empty() {
                chart.draw_series(LineSeries::new(self.reference.iter().copied(), &reference_color))?;
            }
            chart.draw_series(LineSeries::new(self.curve.iter().copied(), &curve_color))?;

            // `Circle` radii are mis-scaled by the ratatui backend; a pixel is reliable.
            if let Some(p) = self.cursor {
                chart.draw_series(std::iter::once(Pixel::new(p, cursor_color)))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
