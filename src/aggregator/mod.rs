//! Job-accessibility aggregation.
//!
//! For every eligible destination cell the travel-time file is joined to the
//! job counts at its origins and reduced, per transport mode, to a
//! job-weighted average travel time and a count of jobs reachable within the
//! time budget. Results are collected into an [`types::AccessibilityTable`]
//! which is merged into the grid store as a separate step.

pub mod aggregate;
pub mod runner;
pub mod types;
