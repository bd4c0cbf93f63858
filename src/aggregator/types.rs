//! Data types produced by the aggregation pass.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::grid::CellId;
use crate::mode::TransportMode;

/// Accessibility of one destination cell by one mode.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ModeAccessibility {
    /// Job-weighted mean travel time in minutes. `None` when no origin with
    /// jobs reaches the cell by this mode.
    pub avg_time: Option<f64>,
    /// Jobs at origins reachable within the time budget. Kept unrounded.
    pub reachable_jobs: f64,
}

/// The eight derived values of one cell, computed together from one file.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AccessibilityRecord {
    modes: [ModeAccessibility; 4],
}

impl AccessibilityRecord {
    pub fn get(&self, mode: TransportMode) -> &ModeAccessibility {
        &self.modes[mode.index()]
    }

    pub fn set(&mut self, mode: TransportMode, value: ModeAccessibility) {
        self.modes[mode.index()] = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (TransportMode, &ModeAccessibility)> {
        TransportMode::ALL.into_iter().zip(self.modes.iter())
    }
}

/// Results of an aggregation run, ordered by cell ID.
pub type AccessibilityTable = BTreeMap<CellId, AccessibilityRecord>;

/// Counters describing one aggregation run.
#[derive(Debug, Clone, Serialize)]
pub struct AggregationSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub time_budget: f64,
    pub manifest_entries: usize,
    pub processed: usize,
    /// Cells left out because they lack valid unemployment data.
    pub skipped: usize,
    /// Cells whose travel-time file could not be read or parsed.
    pub failed: usize,
}

/// Table plus summary, as returned by [`crate::aggregator::runner::aggregate_all`].
#[derive(Debug)]
pub struct AggregationOutcome {
    pub table: AccessibilityTable,
    pub summary: AggregationSummary,
}
