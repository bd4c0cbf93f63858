//! Per-mode correlation between job accessibility and unemployment.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aggregator::types::AggregationSummary;
use crate::grid::GridStore;
use crate::mode::TransportMode;
use crate::reporter::stats::{Correlation, LinearFit, linear_fit, spearman};

/// Scatter data and statistics for one mode.
#[derive(Debug, Clone, Serialize)]
pub struct ModeCorrelation {
    pub mode: TransportMode,
    pub sample_size: usize,
    pub correlation: Option<Correlation>,
    pub trend: Option<LinearFit>,
    /// (reachable jobs, unemployment rate) per cell.
    #[serde(skip)]
    pub points: Vec<(f64, f64)>,
}

impl ModeCorrelation {
    /// Builds the scatter for `mode` from cells that have both an
    /// unemployment rate and accessibility values.
    pub fn from_grid(grid: &GridStore, mode: TransportMode) -> Self {
        let points: Vec<(f64, f64)> = grid
            .cells()
            .iter()
            .filter_map(|cell| {
                let rate = cell.unemployment_rate?;
                let jobs = cell.accessibility?.get(mode).reachable_jobs;
                Some((jobs, rate))
            })
            .collect();

        let (x, y): (Vec<f64>, Vec<f64>) = points.iter().copied().unzip();

        Self {
            mode,
            sample_size: points.len(),
            correlation: spearman(&x, &y),
            trend: linear_fit(&x, &y),
            points,
        }
    }

    /// Text printed under the x axis of the mode's plot.
    pub fn axis_label(&self) -> String {
        match self.correlation {
            Some(c) => format!("Spearman r = {:.3}, p = {:.3e}", c.rho, c.p_value),
            None => format!("Spearman r undefined (n = {})", self.sample_size),
        }
    }
}

/// Summary written as `report.json`.
#[derive(Debug, Serialize)]
pub struct CorrelationReport {
    pub generated_at: DateTime<Utc>,
    pub cells: usize,
    pub modes: Vec<ModeCorrelation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<AggregationSummary>,
}

impl CorrelationReport {
    pub fn from_grid(grid: &GridStore, aggregation: Option<AggregationSummary>) -> Self {
        Self {
            generated_at: Utc::now(),
            cells: grid.len(),
            modes: TransportMode::ALL
                .into_iter()
                .map(|mode| ModeCorrelation::from_grid(grid, mode))
                .collect(),
            aggregation,
        }
    }
}
