use crate::aggregator::types::{AccessibilityRecord, ModeAccessibility};
use crate::grid::JobIndex;
use crate::mode::TransportMode;
use crate::travel_time::TravelTimeRecord;

/// Running sums for one mode.
#[derive(Debug, Default, Clone, Copy)]
struct ModeAccumulator {
    weighted_time: f64,
    weight: f64,
    reachable_jobs: f64,
}

impl ModeAccumulator {
    fn add(&mut self, time: f64, jobs: f64, time_budget: f64) {
        self.weighted_time += time * jobs;
        self.weight += jobs;
        if time < time_budget {
            self.reachable_jobs += jobs;
        }
    }

    fn finish(self) -> ModeAccessibility {
        let avg_time = if self.weight > 0.0 {
            Some(self.weighted_time / self.weight)
        } else {
            None
        };
        ModeAccessibility {
            avg_time,
            reachable_jobs: self.reachable_jobs,
        }
    }
}

/// Reduces one destination cell's travel times to its accessibility record.
///
/// Each record is joined to the job count at its origin; records whose
/// origin is not in `jobs` are dropped. Per mode, only records with a
/// reachable (non-sentinel) time contribute, to both the numerator and the
/// denominator of the weighted average:
///
/// ```text
/// avg_time       = Σ(time_i × jobs_i) / Σ(jobs_i)
/// reachable_jobs = Σ jobs_i  where time_i < time_budget
/// ```
///
/// A zero denominator yields `avg_time = None`.
pub fn aggregate_cell(
    records: &[TravelTimeRecord],
    jobs: &JobIndex,
    time_budget: f64,
) -> AccessibilityRecord {
    let mut acc = [ModeAccumulator::default(); 4];

    for record in records {
        let Some(&origin_jobs) = jobs.get(&record.origin_id) else {
            continue;
        };
        for mode in TransportMode::ALL {
            if let Some(time) = record.time(mode) {
                acc[mode.index()].add(time, origin_jobs, time_budget);
            }
        }
    }

    let mut result = AccessibilityRecord::default();
    for mode in TransportMode::ALL {
        result.set(mode, acc[mode.index()].finish());
    }
    result
}
