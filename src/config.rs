//! Run configuration: time budget, file format and column names.
//!
//! Every field has a default matching the Helsinki region YKR grid and
//! travel-time matrix, so a config file only needs to list what differs:
//! ```json
//! {
//!   "time_budget": 20,
//!   "grid": { "jobs": "tp_tyos" },
//!   "modes": { "bike": "bike_f_t" }
//! }
//! ```

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::mode::TransportMode;

/// Property names read from the grid store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridColumns {
    pub cell_id: String,
    pub jobs: String,
    pub employed: String,
    pub unemployed: String,
    pub unemployment_rate: String,
}

impl Default for GridColumns {
    fn default() -> Self {
        Self {
            cell_id: "YKR_ID".to_string(),
            jobs: "tyopaikat".to_string(),
            employed: "tyolliset".to_string(),
            unemployed: "tyottomat".to_string(),
            unemployment_rate: "tyottomyysaste".to_string(),
        }
    }
}

/// Travel-time column name for each mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeColumns {
    pub car: String,
    pub walk: String,
    pub bike: String,
    pub public_transit: String,
}

impl Default for ModeColumns {
    fn default() -> Self {
        Self {
            car: "car_r_t".to_string(),
            walk: "walk_t".to_string(),
            bike: "bike_s_t".to_string(),
            public_transit: "pt_r_t".to_string(),
        }
    }
}

impl ModeColumns {
    pub fn column(&self, mode: TransportMode) -> &str {
        match mode {
            TransportMode::Car => &self.car,
            TransportMode::Walk => &self.walk,
            TransportMode::Bike => &self.bike,
            TransportMode::PublicTransit => &self.public_transit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessibilityConfig {
    /// Minutes; a destination is reachable when travel time is strictly below this.
    pub time_budget: f64,
    pub delimiter: char,
    /// Marker for suppressed demographics and unreachable travel times.
    pub sentinel: f64,
    /// Travel-time column joined against the grid cell ID.
    pub origin_column: String,
    pub grid: GridColumns,
    pub modes: ModeColumns,
}

impl Default for AccessibilityConfig {
    fn default() -> Self {
        Self {
            time_budget: 30.0,
            delimiter: ';',
            sentinel: -1.0,
            origin_column: "from_id".to_string(),
            grid: GridColumns::default(),
            modes: ModeColumns::default(),
        }
    }
}

impl AccessibilityConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("reading config {path}"))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("parsing config {path}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.time_budget.is_finite() || self.time_budget <= 0.0 {
            bail!("time_budget must be a positive number, got {}", self.time_budget);
        }
        self.delimiter_byte()?;
        Ok(())
    }

    /// The delimiter as the single byte the csv reader expects.
    pub fn delimiter_byte(&self) -> Result<u8> {
        if !self.delimiter.is_ascii() {
            bail!("delimiter must be an ASCII character, got {:?}", self.delimiter);
        }
        Ok(self.delimiter as u8)
    }

    /// Maps the sentinel (and NaN) to `None`.
    pub fn clean(&self, value: f64) -> Option<f64> {
        if value.is_nan() || value == self.sentinel {
            None
        } else {
            Some(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: AccessibilityConfig =
            serde_json::from_str(r#"{"time_budget": 20, "modes": {"bike": "bike_f_t"}}"#)
                .unwrap();

        assert_eq!(config.time_budget, 20.0);
        assert_eq!(config.delimiter, ';');
        assert_eq!(config.modes.column(TransportMode::Bike), "bike_f_t");
        assert_eq!(config.modes.column(TransportMode::Car), "car_r_t");
        assert_eq!(config.grid.cell_id, "YKR_ID");
    }

    #[test]
    fn test_clean_drops_sentinel() {
        let config = AccessibilityConfig::default();
        assert_eq!(config.clean(-1.0), None);
        assert_eq!(config.clean(f64::NAN), None);
        assert_eq!(config.clean(0.0), Some(0.0));
        assert_eq!(config.clean(42.5), Some(42.5));
    }

    #[test]
    fn test_validate_rejects_non_ascii_delimiter() {
        let config = AccessibilityConfig {
            delimiter: '§',
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_budget() {
        let config = AccessibilityConfig {
            time_budget: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"delimiter": ",", "origin_column": "origin_id"}"#).unwrap();

        let config = AccessibilityConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.delimiter_byte().unwrap(), b',');
        assert_eq!(config.origin_column, "origin_id");
    }
}
