//! 2×2 scatter-plus-trend figure, one panel per mode.

use anyhow::{Result, anyhow};
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;

use crate::reporter::report::ModeCorrelation;

const SIZE: (u32, u32) = (1200, 1000);

/// Renders the panels to an SVG file at `path`.
pub fn render_panels(path: &Path, panels: &[ModeCorrelation]) -> Result<()> {
    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| anyhow!("{e}"))?;

    for (area, panel) in root.split_evenly((2, 2)).iter().zip(panels) {
        draw_panel(area, panel)?;
    }

    root.present().map_err(|e| anyhow!("{e}"))?;
    Ok(())
}

fn draw_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    panel: &ModeCorrelation,
) -> Result<()> {
    let x_range = padded_range(panel.points.iter().map(|p| p.0));
    let y_range = padded_range(panel.points.iter().map(|p| p.1));

    let mut chart = ChartBuilder::on(area)
        .caption(panel.mode.label(), ("sans-serif", 22).into_font())
        .margin(12)
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(x_range.clone(), y_range)
        .map_err(|e| anyhow!("{e}"))?;

    chart
        .configure_mesh()
        .x_desc(panel.axis_label())
        .y_desc("Unemployment rate (%)")
        .draw()
        .map_err(|e| anyhow!("{e}"))?;

    chart
        .draw_series(
            panel
                .points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 2, BLUE.mix(0.4).filled())),
        )
        .map_err(|e| anyhow!("{e}"))?;

    if let Some(trend) = panel.trend {
        let line = [x_range.start, x_range.end].map(|x| (x, trend.at(x)));
        chart
            .draw_series(LineSeries::new(line, RED.stroke_width(2)))
            .map_err(|e| anyhow!("{e}"))?;
    }

    Ok(())
}

/// Data extent with 5% padding; falls back to a unit range for empty or
/// degenerate input.
fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    let pad = if max > min { (max - min) * 0.05 } else { 0.5 };
    (min - pad)..(max + pad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::TransportMode;
    use crate::reporter::stats::{linear_fit, spearman};

    fn panel(mode: TransportMode, points: Vec<(f64, f64)>) -> ModeCorrelation {
        let (x, y): (Vec<f64>, Vec<f64>) = points.iter().copied().unzip();
        ModeCorrelation {
            mode,
            sample_size: points.len(),
            correlation: spearman(&x, &y),
            trend: linear_fit(&x, &y),
            points,
        }
    }

    #[test]
    fn test_padded_range() {
        assert_eq!(padded_range(std::iter::empty()), 0.0..1.0);
        assert_eq!(padded_range([3.0].into_iter()), 2.5..3.5);
        let r = padded_range([0.0, 100.0].into_iter());
        assert_eq!(r, -5.0..105.0);
    }

    #[test]
    fn test_render_writes_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("correlation.svg");
        let panels: Vec<_> = TransportMode::ALL
            .into_iter()
            .map(|mode| panel(mode, vec![(100.0, 9.0), (400.0, 7.5), (900.0, 4.0)]))
            .collect();

        render_panels(&path, &panels).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Public transit"));
    }

    #[test]
    fn test_render_handles_empty_panels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.svg");
        let panels: Vec<_> = TransportMode::ALL
            .into_iter()
            .map(|mode| panel(mode, vec![]))
            .collect();

        render_panels(&path, &panels).unwrap();
        assert!(path.exists());
    }
}
