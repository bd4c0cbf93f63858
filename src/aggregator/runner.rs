use anyhow::Result;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::aggregator::aggregate::aggregate_cell;
use crate::aggregator::types::{AccessibilityTable, AggregationOutcome, AggregationSummary};
use crate::grid::{CellId, JobIndex};
use crate::manifest::Manifest;
use crate::source::TravelTimeSource;

/// Aggregates every manifest entry whose cell is in `eligible`.
///
/// Entries outside `eligible` are skipped before their file is opened. Up to
/// `concurrency` files are parsed at once on the blocking pool; the result
/// table is ordered by cell ID, so output does not depend on scheduling.
/// A file that fails to load is logged and counted, leaving that cell out of
/// the table.
#[tracing::instrument(
    skip_all,
    fields(entries = manifest.len(), eligible = eligible.len(), concurrency = concurrency)
)]
pub async fn aggregate_all<S>(
    source: Arc<S>,
    manifest: &Manifest,
    jobs: Arc<JobIndex>,
    eligible: &HashSet<CellId>,
    time_budget: f64,
    concurrency: usize,
) -> Result<AggregationOutcome>
where
    S: TravelTimeSource + 'static,
{
    let started_at = Utc::now();
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));

    let mut skipped = 0;
    let mut tasks = vec![];

    for entry in manifest.entries() {
        if !eligible.contains(&entry.cell_id) {
            skipped += 1;
            continue;
        }

        let permit = semaphore.clone().acquire_owned().await?;
        let source = source.clone();
        let jobs = jobs.clone();
        let entry = entry.clone();

        let cell_span = tracing::info_span!("aggregate_cell", cell_id = entry.cell_id);

        let task = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let _guard = cell_span.enter();
            let result = source
                .load(&entry)
                .map(|file| aggregate_cell(&file.records, &jobs, time_budget));
            if result.is_ok() {
                debug!("Cell aggregated");
            }
            (entry, result)
        });
        tasks.push(task);
    }

    let mut table = AccessibilityTable::new();
    let mut failed = 0;

    for task in tasks {
        match task.await {
            Ok((entry, Ok(record))) => {
                table.insert(entry.cell_id, record);
            }
            Ok((entry, Err(e))) => {
                warn!(
                    cell_id = entry.cell_id,
                    error = %e,
                    "Skipping cell, travel-time file unusable"
                );
                failed += 1;
            }
            Err(e) => {
                error!(error = %e, "Aggregation task panicked");
                failed += 1;
            }
        }
    }

    let summary = AggregationSummary {
        started_at,
        finished_at: Utc::now(),
        time_budget,
        manifest_entries: manifest.len(),
        processed: table.len(),
        skipped,
        failed,
    };

    info!(
        processed = summary.processed,
        skipped = summary.skipped,
        failed = summary.failed,
        "Aggregation finished"
    );

    Ok(AggregationOutcome { table, summary })
}
