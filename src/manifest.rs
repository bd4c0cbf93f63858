//! Explicit list of travel-time files to process.
//!
//! The directory tree is walked once up front; everything downstream iterates
//! the resulting (cell ID, path) pairs and never touches the directory again.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::grid::CellId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Destination cell whose incoming travel times the file holds.
    pub cell_id: CellId,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Builds a manifest from every file under `root` whose name ends with a
    /// cell ID, e.g. `5785xxx/travel_times_to_ 5785640.txt` or the same with
    /// a trailing `.gz`.
    pub fn from_dir(root: &Path) -> Result<Self> {
        let mut by_cell = BTreeMap::new();
        walk_dir(root, &mut by_cell)
            .with_context(|| format!("scanning travel-time directory {}", root.display()))?;

        let entries = by_cell
            .into_iter()
            .map(|(cell_id, path)| ManifestEntry { cell_id, path })
            .collect();
        Ok(Self { entries })
    }

    /// Builds a manifest from explicit pairs, ordered by cell ID.
    pub fn from_entries(mut entries: Vec<ManifestEntry>) -> Self {
        entries.sort_by_key(|e| e.cell_id);
        Self { entries }
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Extracts the destination cell ID from the trailing digits of a file stem.
pub fn cell_id_from_path(path: &Path) -> Option<CellId> {
    let name = path.file_name()?.to_str()?;
    let name = name.strip_suffix(".gz").unwrap_or(name);
    let stem = match name.rfind('.') {
        Some(dot) => &name[..dot],
        None => name,
    };

    let digits_start = stem
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;
    stem[digits_start..].parse().ok()
}

fn walk_dir(dir: &Path, by_cell: &mut BTreeMap<CellId, PathBuf>) -> Result<()> {
    let mut entries: Vec<_> = fs::read_dir(dir)?.collect::<std::io::Result<_>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            walk_dir(&path, by_cell)?;
            continue;
        }

        let Some(cell_id) = cell_id_from_path(&path) else {
            debug!(path = %path.display(), "Ignoring file without a cell ID");
            continue;
        };

        if let Some(existing) = by_cell.get(&cell_id) {
            warn!(
                cell_id,
                kept = %existing.display(),
                ignored = %path.display(),
                "Duplicate travel-time file for cell"
            );
            continue;
        }
        by_cell.insert(cell_id, path);
    }

    Ok(())
}
