//! Persistence of enriched grids, accessibility tables and run summaries.
//!
//! Supports GeoJSON, CSV export and append, and pretty JSON.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use geojson::FeatureCollection;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

use crate::aggregator::types::AccessibilityTable;
use crate::grid::CellId;

/// Writes a FeatureCollection as GeoJSON.
pub fn write_feature_collection(path: &Path, collection: &FeatureCollection) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, collection)?;
    writer.flush()?;
    debug!(path = %path.display(), features = collection.features.len(), "GeoJSON written");
    Ok(())
}

/// Writes any serializable value as pretty-printed JSON.
pub fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

/// Flat CSV row of one aggregated cell.
#[derive(Debug, Serialize)]
struct AccessibilityRow {
    cell_id: CellId,
    car_avg_t: Option<f64>,
    car_jobs: f64,
    walk_avg_t: Option<f64>,
    walk_jobs: f64,
    bike_avg_t: Option<f64>,
    bike_jobs: f64,
    pt_avg_t: Option<f64>,
    pt_jobs: f64,
}

/// Writes the accessibility table as an attribute-only CSV, one row per
/// aggregated cell. Undefined averages are left empty.
pub fn write_accessibility_csv(path: &Path, table: &AccessibilityTable) -> Result<()> {
    use crate::mode::TransportMode::{Bike, Car, PublicTransit, Walk};

    let mut writer = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    for (&cell_id, record) in table {
        writer.serialize(AccessibilityRow {
            cell_id,
            car_avg_t: record.get(Car).avg_time,
            car_jobs: record.get(Car).reachable_jobs,
            walk_avg_t: record.get(Walk).avg_time,
            walk_jobs: record.get(Walk).reachable_jobs,
            bike_avg_t: record.get(Bike).avg_time,
            bike_jobs: record.get(Bike).reachable_jobs,
            pt_avg_t: record.get(PublicTransit).avg_time,
            pt_jobs: record.get(PublicTransit).reachable_jobs,
        })?;
    }
    writer.flush()?;

    Ok(())
}

/// Appends a record as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &Path, record: &impl Serialize) -> Result<()> {
    let file_exists = path.exists();
    debug!(path = %path.display(), file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(record)?;
    writer.flush()?;

    Ok(())
}
