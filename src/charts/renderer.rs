//! Static Chart Renderer
//! Draws chart specifications to SVG with plotters, for the export endpoint.
//!
//! Supported layouts:
//! 1. Lines: one line with markers per series, legend when more than one
//! 2. Horizontal bars: largest value on top, category labels on the y axis

use crate::charts::plotter::{Bar, ChartKind, ChartSpec, TimeSeries, PALETTE, PRIMARY_COLOR};
use plotters::coord::Shift;
use plotters::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Static export is not available for {0} charts")]
    Unsupported(&'static str),
    #[error("Chart '{0}' has no data to draw")]
    Empty(String),
    #[error("Drawing failed: {0}")]
    Draw(String),
}

fn draw_error<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Draw(e.to_string())
}

fn rgb((r, g, b): (u8, u8, u8)) -> RGBColor {
    RGBColor(r, g, b)
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render a chart to an SVG document.
    pub fn render_svg(spec: &ChartSpec, width: u32, height: u32) -> Result<String, RenderError> {
        match &spec.kind {
            ChartKind::Lines { .. } | ChartKind::HorizontalBars { .. } => {}
            other => return Err(RenderError::Unsupported(other.name())),
        }
        if spec.is_empty() {
            return Err(RenderError::Empty(spec.id.clone()));
        }

        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(draw_error)?;

            match &spec.kind {
                ChartKind::Lines {
                    x_label,
                    y_label,
                    series,
                    ..
                } => Self::draw_lines(&root, &spec.title, x_label, y_label, series)?,
                ChartKind::HorizontalBars {
                    x_label,
                    y_label,
                    bars,
                    ..
                } => Self::draw_bars(&root, &spec.title, x_label, y_label, bars)?,
                other => return Err(RenderError::Unsupported(other.name())),
            }

            root.present().map_err(draw_error)?;
        }
        Ok(svg)
    }

    fn draw_lines(
        root: &DrawingArea<SVGBackend<'_>, Shift>,
        title: &str,
        x_label: &str,
        y_label: &str,
        series: &[TimeSeries],
    ) -> Result<(), RenderError> {
        let (x_min, x_max) = series
            .iter()
            .flat_map(|s| s.x.iter().copied())
            .fold((i64::MAX, i64::MIN), |(lo, hi), x| (lo.min(x), hi.max(x)));
        let (y_min, y_max) = series
            .iter()
            .flat_map(|s| s.y.iter().copied())
            .fold((0.0_f64, 0.0_f64), |(lo, hi), y| (lo.min(y), hi.max(y)));
        let pad = ((y_max - y_min) * 0.1).max(1.0);

        let mut chart = ChartBuilder::on(root)
            .caption(title, ("sans-serif", 22))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(80)
            .build_cartesian_2d(x_min..x_max.max(x_min + 1), y_min..(y_max + pad))
            .map_err(draw_error)?;

        chart
            .configure_mesh()
            .x_desc(x_label)
            .y_desc(y_label)
            .draw()
            .map_err(draw_error)?;

        for (i, s) in series.iter().enumerate() {
            let color = if series.len() == 1 {
                rgb(PRIMARY_COLOR)
            } else {
                rgb(PALETTE[i % PALETTE.len()])
            };
            let points: Vec<(i64, f64)> = s.x.iter().copied().zip(s.y.iter().copied()).collect();

            chart
                .draw_series(LineSeries::new(points.clone(), color.stroke_width(3)))
                .map_err(draw_error)?
                .label(s.name.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            chart
                .draw_series(points.into_iter().map(|p| Circle::new(p, 4, color.filled())))
                .map_err(draw_error)?;
        }

        if series.len() > 1 {
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .map_err(draw_error)?;
        }
        Ok(())
    }

    fn draw_bars(
        root: &DrawingArea<SVGBackend<'_>, Shift>,
        title: &str,
        x_label: &str,
        y_label: &str,
        bars: &[Bar],
    ) -> Result<(), RenderError> {
        let n = bars.len();
        let x_max = bars.iter().map(|b| b.value).fold(0.0_f64, f64::max).max(1.0) * 1.1;
        // Bar i sits at y = n - 1 - i so the first (largest) bar is drawn on top.
        let labels: Vec<&str> = bars.iter().rev().map(|b| b.label.as_str()).collect();
        let formatter = |y: &f64| {
            let index = y.round();
            if (y - index).abs() > 1e-6 || index < 0.0 {
                return String::new();
            }
            labels
                .get(index as usize)
                .map(|label| label.to_string())
                .unwrap_or_default()
        };

        let mut chart = ChartBuilder::on(root)
            .caption(title, ("sans-serif", 22))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(180)
            .build_cartesian_2d(0.0..x_max, -0.5..(n as f64 - 0.5))
            .map_err(draw_error)?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(n)
            .y_label_formatter(&formatter)
            .x_desc(x_label)
            .y_desc(y_label)
            .draw()
            .map_err(draw_error)?;

        let color = rgb(PRIMARY_COLOR);
        chart
            .draw_series(bars.iter().enumerate().map(|(i, bar)| {
                let y = (n - 1 - i) as f64;
                Rectangle::new([(0.0, y - 0.35), (bar.value, y + 0.35)], color.filled())
            }))
            .map_err(draw_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn donut_export_is_unsupported() {
        let spec = ChartSpec {
            id: "sector-distribution".to_string(),
            title: "Distribuição".to_string(),
            kind: ChartKind::Donut {
                slices: vec![Bar {
                    label: "Varejo".to_string(),
                    value: 1.0,
                }],
                hole: 0.4,
                colors: Vec::new(),
            },
        };

        assert!(matches!(
            StaticChartRenderer::render_svg(&spec, 800, 600),
            Err(RenderError::Unsupported("donut"))
        ));
    }

    #[test]
    fn empty_chart_is_rejected_before_drawing() {
        let spec = ChartSpec {
            id: "top-companies".to_string(),
            title: "Top".to_string(),
            kind: ChartKind::HorizontalBars {
                x_label: String::new(),
                y_label: String::new(),
                bars: Vec::new(),
                color_scale: "Blues".to_string(),
            },
        };

        assert!(matches!(
            StaticChartRenderer::render_svg(&spec, 800, 600),
            Err(RenderError::Empty(id)) if id == "top-companies"
        ));
    }
}
