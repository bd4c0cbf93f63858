//! Transport modes covered by the travel-time matrix.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four modes a travel-time file carries a column for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    Car,
    Walk,
    Bike,
    PublicTransit,
}

impl TransportMode {
    /// All modes, in output column order.
    pub const ALL: [TransportMode; 4] = [
        TransportMode::Car,
        TransportMode::Walk,
        TransportMode::Bike,
        TransportMode::PublicTransit,
    ];

    /// Position of the mode in fixed-shape per-mode arrays.
    pub fn index(self) -> usize {
        match self {
            TransportMode::Car => 0,
            TransportMode::Walk => 1,
            TransportMode::Bike => 2,
            TransportMode::PublicTransit => 3,
        }
    }

    /// Short key used as the prefix of derived column names.
    pub fn key(self) -> &'static str {
        match self {
            TransportMode::Car => "car",
            TransportMode::Walk => "walk",
            TransportMode::Bike => "bike",
            TransportMode::PublicTransit => "pt",
        }
    }

    /// Human readable name used in plot captions.
    pub fn label(self) -> &'static str {
        match self {
            TransportMode::Car => "Car",
            TransportMode::Walk => "Walk",
            TransportMode::Bike => "Bike",
            TransportMode::PublicTransit => "Public transit",
        }
    }

    /// Output column holding the job-weighted average travel time.
    pub fn avg_time_column(self) -> &'static str {
        match self {
            TransportMode::Car => "car_avg_t",
            TransportMode::Walk => "walk_avg_t",
            TransportMode::Bike => "bike_avg_t",
            TransportMode::PublicTransit => "pt_avg_t",
        }
    }

    /// Output column holding the reachable-job count.
    pub fn job_count_column(self) -> &'static str {
        match self {
            TransportMode::Car => "car_jobs",
            TransportMode::Walk => "walk_jobs",
            TransportMode::Bike => "bike_jobs",
            TransportMode::PublicTransit => "pt_jobs",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
