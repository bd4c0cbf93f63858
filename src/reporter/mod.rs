//! Correlation reporting over the population-filtered grid.
//!
//! For each transport mode the reachable-job count of every cell is ranked
//! against its unemployment rate. The Spearman coefficient, its p-value and a
//! least-squares trend are written to `report.json` and drawn as a 2×2 SVG.

pub mod plot;
pub mod report;
pub mod stats;

use anyhow::Result;
use std::path::Path;
use tracing::info;

use crate::aggregator::types::AggregationSummary;
use crate::grid::GridStore;
use crate::output::write_json;
use report::CorrelationReport;

pub const REPORT_FILE: &str = "report.json";
pub const PLOT_FILE: &str = "correlation.svg";

/// Builds the report for an already filtered grid and writes the JSON
/// summary and the plot into `output_dir`.
#[tracing::instrument(skip(grid, aggregation), fields(cells = grid.len()))]
pub fn report(
    grid: &GridStore,
    output_dir: &Path,
    aggregation: Option<AggregationSummary>,
) -> Result<CorrelationReport> {
    let report = CorrelationReport::from_grid(grid, aggregation);

    for mode in &report.modes {
        match mode.correlation {
            Some(c) => info!(
                mode = %mode.mode,
                n = mode.sample_size,
                rho = c.rho,
                p_value = c.p_value,
                "Spearman correlation"
            ),
            None => info!(mode = %mode.mode, n = mode.sample_size, "Correlation undefined"),
        }
    }

    std::fs::create_dir_all(output_dir)?;
    write_json(&output_dir.join(REPORT_FILE), &report)?;
    plot::render_panels(&output_dir.join(PLOT_FILE), &report.modes)?;

    info!(output_dir = %output_dir.display(), "Report written");
    Ok(report)
}
