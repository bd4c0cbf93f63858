//! Rows of the travel-time matrix.

use crate::grid::CellId;
use crate::mode::TransportMode;

/// One origin's travel times to a destination cell.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelTimeRecord {
    pub origin_id: CellId,
    /// Minutes per mode, indexed by [`TransportMode::index`]. `None` marks
    /// the unreachable sentinel.
    pub times: [Option<f64>; 4],
}

impl TravelTimeRecord {
    pub fn new(origin_id: CellId, times: [Option<f64>; 4]) -> Self {
        Self { origin_id, times }
    }

    pub fn time(&self, mode: TransportMode) -> Option<f64> {
        self.times[mode.index()]
    }
}

/// All records of one destination cell's file.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelTimeFile {
    pub destination_id: CellId,
    pub records: Vec<TravelTimeRecord>,
}
