//! Typed errors for the two input stores.

use crate::grid::CellId;

/// Failure reading one travel-time file. The aggregator logs these and skips
/// the affected cell.
#[derive(thiserror::Error, Debug)]
pub enum TravelTimeError {
    #[error("failed reading '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("malformed travel-time file '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("travel-time file '{path}' has no column '{column}'")]
    MissingColumn { path: String, column: String },
    #[error("travel-time file '{path}' line {line}: invalid {column} value '{value}'")]
    InvalidValue {
        path: String,
        line: u64,
        column: String,
        value: String,
    },
    #[error("delimiter must be a single ASCII character, got {0:?}")]
    InvalidDelimiter(char),
}

/// Failure loading or writing the grid store. These abort the run.
#[derive(thiserror::Error, Debug)]
pub enum GridError {
    #[error("failed reading '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to read '{path}' as GeoJSON: {source}")]
    GeoJson {
        path: String,
        source: geojson::Error,
    },
    #[error("grid store '{path}' must be a FeatureCollection but found a single {found}")]
    NotFeatureCollection { path: String, found: &'static str },
    #[error("feature {index} has no properties")]
    MissingProperties { index: usize },
    #[error("feature {index} has no usable '{column}' cell ID")]
    InvalidCellId { index: usize, column: String },
    #[error("cell {0} appears more than once in the grid store")]
    DuplicateCell(CellId),
}
