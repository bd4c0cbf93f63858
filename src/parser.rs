//! Parser for delimited travel-time files.

use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::Read;

use crate::config::AccessibilityConfig;
use crate::error::TravelTimeError;
use crate::grid::CellId;
use crate::mode::TransportMode;
use crate::travel_time::TravelTimeRecord;

/// Decodes the records of one travel-time file.
///
/// The header row must name the configured origin column and one time column
/// per mode; other columns are ignored. `path` is only used in error messages.
///
/// # Errors
///
/// Returns an error if the configured delimiter is not ASCII, a required
/// column is missing, a row is malformed, or a value does not parse as a
/// number.
pub fn parse_travel_times<R: Read>(
    reader: R,
    path: &str,
    config: &AccessibilityConfig,
) -> Result<Vec<TravelTimeRecord>, TravelTimeError> {
    let delimiter = config
        .delimiter_byte()
        .map_err(|_| TravelTimeError::InvalidDelimiter(config.delimiter))?;
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().map_err(|source| csv_error(path, source))?.clone();
    let origin_idx = column_index(&headers, &config.origin_column, path)?;
    let mut mode_idx = [0usize; 4];
    for mode in TransportMode::ALL {
        mode_idx[mode.index()] = column_index(&headers, config.modes.column(mode), path)?;
    }

    let mut records = Vec::new();
    for result in rdr.records() {
        let row = result.map_err(|source| csv_error(path, source))?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();

        let origin_raw = row.get(origin_idx).unwrap_or_default();
        let origin_id = parse_cell_id(origin_raw).ok_or_else(|| TravelTimeError::InvalidValue {
            path: path.to_string(),
            line,
            column: config.origin_column.clone(),
            value: origin_raw.to_string(),
        })?;

        let mut times = [None; 4];
        for mode in TransportMode::ALL {
            let raw = row.get(mode_idx[mode.index()]).unwrap_or_default();
            let value: f64 = raw.parse().map_err(|_| TravelTimeError::InvalidValue {
                path: path.to_string(),
                line,
                column: config.modes.column(mode).to_string(),
                value: raw.to_string(),
            })?;
            times[mode.index()] = config.clean(value);
        }

        records.push(TravelTimeRecord::new(origin_id, times));
    }

    Ok(records)
}

/// Parses a cell ID written either as an integer or as an integral float.
pub fn parse_cell_id(raw: &str) -> Option<CellId> {
    let raw = raw.trim();
    if let Ok(id) = raw.parse::<CellId>() {
        return Some(id);
    }
    let value: f64 = raw.parse().ok()?;
    if value.fract() == 0.0 && value >= 0.0 && value <= CellId::MAX as f64 {
        Some(value as CellId)
    } else {
        None
    }
}

fn column_index(
    headers: &StringRecord,
    column: &str,
    path: &str,
) -> Result<usize, TravelTimeError> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| TravelTimeError::MissingColumn {
            path: path.to_string(),
            column: column.to_string(),
        })
}

fn csv_error(path: &str, source: csv::Error) -> TravelTimeError {
    TravelTimeError::Csv {
        path: path.to_string(),
        source,
    }
}
