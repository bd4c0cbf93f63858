//! The YKR grid store: one GeoJSON feature per 250m cell.
//!
//! Geometry and unrelated properties are carried through untouched; only the
//! configured demographic properties and the eight derived accessibility
//! properties are interpreted.

use geojson::{Feature, FeatureCollection, GeoJson, JsonObject, JsonValue};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use tracing::debug;

use crate::aggregator::types::{AccessibilityRecord, AccessibilityTable, ModeAccessibility};
use crate::config::{AccessibilityConfig, GridColumns};
use crate::error::GridError;
use crate::mode::TransportMode;
use crate::parser::parse_cell_id;

/// YKR cell identifier.
pub type CellId = u64;

/// Job counts located at each cell, sentinel cells left out.
pub type JobIndex = HashMap<CellId, f64>;

/// Demographic attributes of one cell. Suppressed values are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub id: CellId,
    pub jobs: Option<f64>,
    pub employed: Option<f64>,
    pub unemployed: Option<f64>,
    pub unemployment_rate: Option<f64>,
    /// Present once accessibility columns have been merged or loaded.
    pub accessibility: Option<AccessibilityRecord>,
}

impl GridCell {
    /// Unemployment rate present and employed/unemployed counts not suppressed.
    pub fn has_valid_unemployment(&self) -> bool {
        self.unemployment_rate.is_some() && self.employed.is_some() && self.unemployed.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct GridStore {
    collection: FeatureCollection,
    /// Parallel to `collection.features`.
    cells: Vec<GridCell>,
    config: AccessibilityConfig,
}

impl GridStore {
    /// Reads a GeoJSON FeatureCollection from `path`.
    pub fn load(path: &str, config: &AccessibilityConfig) -> Result<Self, GridError> {
        let contents = std::fs::read_to_string(path).map_err(|source| GridError::Io {
            path: path.to_string(),
            source,
        })?;
        let collection = match GeoJson::from_str(&contents) {
            Ok(GeoJson::FeatureCollection(fc)) => fc,
            Ok(GeoJson::Feature(_)) => {
                return Err(GridError::NotFeatureCollection {
                    path: path.to_string(),
                    found: "Feature",
                });
            }
            Ok(GeoJson::Geometry(_)) => {
                return Err(GridError::NotFeatureCollection {
                    path: path.to_string(),
                    found: "Geometry",
                });
            }
            Err(source) => {
                return Err(GridError::GeoJson {
                    path: path.to_string(),
                    source,
                });
            }
        };

        let store = Self::from_collection(collection, config)?;
        debug!(path, cells = store.len(), "Grid store loaded");
        Ok(store)
    }

    pub fn from_collection(
        collection: FeatureCollection,
        config: &AccessibilityConfig,
    ) -> Result<Self, GridError> {
        let mut seen = HashSet::new();
        let mut cells = Vec::with_capacity(collection.features.len());
        for (index, feature) in collection.features.iter().enumerate() {
            let cell = parse_cell(index, feature, config)?;
            if !seen.insert(cell.id) {
                return Err(GridError::DuplicateCell(cell.id));
            }
            cells.push(cell);
        }

        Ok(Self {
            collection,
            cells,
            config: config.clone(),
        })
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn collection(&self) -> &FeatureCollection {
        &self.collection
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Job counts keyed by cell, for joining travel-time origins.
    pub fn job_index(&self) -> JobIndex {
        self.cells
            .iter()
            .filter_map(|c| c.jobs.map(|jobs| (c.id, jobs)))
            .collect()
    }

    /// Cells worth aggregating: those with reliable unemployment statistics.
    pub fn unemployment_valid_ids(&self) -> HashSet<CellId> {
        self.cells
            .iter()
            .filter(|c| c.has_valid_unemployment())
            .map(|c| c.id)
            .collect()
    }

    /// Writes the eight accessibility properties of every cell from `table`.
    /// Cells missing from the table get nulls.
    pub fn merge(&mut self, table: &AccessibilityTable) {
        for (feature, cell) in self.collection.features.iter_mut().zip(self.cells.iter_mut()) {
            let record = table.get(&cell.id).copied();
            let properties = feature.properties.get_or_insert_with(JsonObject::new);
            for mode in TransportMode::ALL {
                let value = record.map(|r| *r.get(mode));
                properties.insert(
                    mode.avg_time_column().to_string(),
                    value.and_then(|v| v.avg_time).map_or(JsonValue::Null, JsonValue::from),
                );
                properties.insert(
                    mode.job_count_column().to_string(),
                    value.map_or(JsonValue::Null, |v| JsonValue::from(v.reachable_jobs)),
                );
            }
            cell.accessibility = record;
        }
    }

    /// The population-filtered subset, with reachable-job counts narrowed to
    /// integers.
    pub fn filtered(&self) -> Result<Self, GridError> {
        let features: Vec<Feature> = self
            .collection
            .features
            .iter()
            .zip(self.cells.iter())
            .filter(|(_, cell)| cell.has_valid_unemployment())
            .map(|(feature, _)| {
                let mut feature = feature.clone();
                if let Some(properties) = feature.properties.as_mut() {
                    narrow_job_counts(properties);
                }
                feature
            })
            .collect();

        let collection = FeatureCollection {
            bbox: self.collection.bbox.clone(),
            features,
            foreign_members: self.collection.foreign_members.clone(),
        };
        Self::from_collection(collection, &self.config)
    }
}

fn narrow_job_counts(properties: &mut JsonObject) {
    for mode in TransportMode::ALL {
        if let Some(value) = properties.get_mut(mode.job_count_column()) {
            if let Some(jobs) = value.as_f64() {
                *value = JsonValue::from(jobs.round() as i64);
            }
        }
    }
}

fn parse_cell(
    index: usize,
    feature: &Feature,
    config: &AccessibilityConfig,
) -> Result<GridCell, GridError> {
    let properties = feature
        .properties
        .as_ref()
        .ok_or(GridError::MissingProperties { index })?;
    let columns: &GridColumns = &config.grid;

    let id = properties
        .get(&columns.cell_id)
        .and_then(|v| match v {
            JsonValue::Number(n) => parse_cell_id(&n.to_string()),
            JsonValue::String(s) => parse_cell_id(s),
            _ => None,
        })
        .ok_or_else(|| GridError::InvalidCellId {
            index,
            column: columns.cell_id.clone(),
        })?;

    let number = |column: &str| property_number(properties, column, config);

    Ok(GridCell {
        id,
        jobs: number(&columns.jobs),
        employed: number(&columns.employed),
        unemployed: number(&columns.unemployed),
        unemployment_rate: number(&columns.unemployment_rate),
        accessibility: parse_accessibility(properties),
    })
}

/// Reads a numeric property; absent, null, unparsable and sentinel values are `None`.
fn property_number(
    properties: &JsonObject,
    column: &str,
    config: &AccessibilityConfig,
) -> Option<f64> {
    let value = match properties.get(column)? {
        JsonValue::Number(n) => n.as_f64()?,
        JsonValue::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    config.clean(value)
}

/// Reads back previously merged accessibility properties. A cell counts as
/// aggregated only if all four job counts are present.
fn parse_accessibility(properties: &JsonObject) -> Option<AccessibilityRecord> {
    let mut record = AccessibilityRecord::default();
    for mode in TransportMode::ALL {
        let reachable_jobs = properties.get(mode.job_count_column())?.as_f64()?;
        let avg_time = properties.get(mode.avg_time_column()).and_then(JsonValue::as_f64);
        record.set(
            mode,
            ModeAccessibility {
                avg_time,
                reachable_jobs,
            },
        );
    }
    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feature(properties: JsonValue) -> Feature {
        Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::Point(vec![25.0, 60.2]))),
            id: None,
            properties: properties.as_object().cloned(),
            foreign_members: None,
        }
    }

    fn store(features: Vec<Feature>) -> GridStore {
        GridStore::from_collection(
            FeatureCollection {
                bbox: None,
                features,
                foreign_members: None,
            },
            &AccessibilityConfig::default(),
        )
        .unwrap()
    }

    fn sample() -> GridStore {
        store(vec![
            feature(json!({
                "YKR_ID": 1,
                "tyopaikat": 100,
                "tyolliset": 40,
                "tyottomat": 4,
                "tyottomyysaste": 9.1,
            })),
            feature(json!({
                "YKR_ID": 2,
                "tyopaikat": -1,
                "tyolliset": -1,
                "tyottomat": 3,
                "tyottomyysaste": 7.0,
            })),
            feature(json!({
                "YKR_ID": "3",
                "tyopaikat": 50,
                "tyolliset": 10,
                "tyottomat": 2,
                "tyottomyysaste": null,
            })),
        ])
    }

    #[test]
    fn test_sentinels_become_none() {
        let grid = sample();
        let cell = &grid.cells()[1];
        assert_eq!(cell.jobs, None);
        assert_eq!(cell.employed, None);
        assert_eq!(cell.unemployed, Some(3.0));
        assert!(!cell.has_valid_unemployment());
    }

    #[test]
    fn test_job_index_excludes_sentinel_jobs() {
        let index = sample().job_index();
        assert_eq!(index.len(), 2);
        assert_eq!(index.get(&1), Some(&100.0));
        assert_eq!(index.get(&3), Some(&50.0));
    }

    #[test]
    fn test_unemployment_valid_ids() {
        let ids = sample().unemployment_valid_ids();
        assert_eq!(ids, HashSet::from([1]));
    }

    #[test]
    fn test_merge_sets_values_and_nulls() {
        let mut grid = sample();
        let mut record = AccessibilityRecord::default();
        record.set(
            TransportMode::Car,
            ModeAccessibility {
                avg_time: Some(12.5),
                reachable_jobs: 150.4,
            },
        );
        let table = AccessibilityTable::from([(1, record)]);

        grid.merge(&table);

        let props = grid.collection().features[0].properties.as_ref().unwrap();
        assert_eq!(props["car_avg_t"], json!(12.5));
        assert_eq!(props["car_jobs"], json!(150.4));
        assert_eq!(props["walk_avg_t"], JsonValue::Null);
        assert_eq!(props["walk_jobs"], json!(0.0));

        let props = grid.collection().features[1].properties.as_ref().unwrap();
        for mode in TransportMode::ALL {
            assert_eq!(props[mode.avg_time_column()], JsonValue::Null);
            assert_eq!(props[mode.job_count_column()], JsonValue::Null);
        }
        assert_eq!(grid.cells()[0].accessibility, Some(record));
        assert_eq!(grid.cells()[1].accessibility, None);
    }

    #[test]
    fn test_filtered_rounds_job_counts() {
        let mut grid = sample();
        let mut record = AccessibilityRecord::default();
        record.set(
            TransportMode::Bike,
            ModeAccessibility {
                avg_time: Some(20.0),
                reachable_jobs: 150.6,
            },
        );
        grid.merge(&AccessibilityTable::from([(1, record)]));

        let filtered = grid.filtered().unwrap();

        assert_eq!(filtered.len(), 1);
        let props = filtered.collection().features[0].properties.as_ref().unwrap();
        assert_eq!(props["bike_jobs"], json!(151));
        assert_eq!(props["bike_avg_t"], json!(20.0));
        let record = filtered.cells()[0].accessibility.unwrap();
        let jobs = record.get(TransportMode::Bike).reachable_jobs;
        assert!((jobs - 150.6).abs() <= 1.0);
    }

    #[test]
    fn test_missing_cell_id_is_error() {
        let result = GridStore::from_collection(
            FeatureCollection {
                bbox: None,
                features: vec![feature(json!({"tyopaikat": 1}))],
                foreign_members: None,
            },
            &AccessibilityConfig::default(),
        );
        assert!(matches!(result, Err(GridError::InvalidCellId { index: 0, .. })));
    }

    #[test]
    fn test_duplicate_cell_is_error() {
        let result = GridStore::from_collection(
            FeatureCollection {
                bbox: None,
                features: vec![feature(json!({"YKR_ID": 5})), feature(json!({"YKR_ID": 5}))],
                foreign_members: None,
            },
            &AccessibilityConfig::default(),
        );
        assert!(matches!(result, Err(GridError::DuplicateCell(5))));
    }

    #[test]
    fn test_load_rejects_single_feature() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cell.geojson");
        let single = GeoJson::Feature(feature(json!({"YKR_ID": 1})));
        std::fs::write(&path, single.to_string()).unwrap();

        let result = GridStore::load(path.to_str().unwrap(), &AccessibilityConfig::default());
        assert!(matches!(result, Err(GridError::NotFeatureCollection { found: "Feature", .. })));
    }
}
