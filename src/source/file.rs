use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use tracing::debug;

use super::TravelTimeSource;
use crate::config::AccessibilityConfig;
use crate::error::TravelTimeError;
use crate::manifest::ManifestEntry;
use crate::parser::parse_travel_times;
use crate::travel_time::TravelTimeFile;

/// Reads travel-time files from the local filesystem, decompressing `.gz`
/// files on the fly.
pub struct FileSource {
    config: AccessibilityConfig,
}

impl FileSource {
    pub fn new(config: AccessibilityConfig) -> Self {
        Self { config }
    }
}

impl TravelTimeSource for FileSource {
    fn load(&self, entry: &ManifestEntry) -> Result<TravelTimeFile, TravelTimeError> {
        let path = entry.path.display().to_string();
        let file = File::open(&entry.path).map_err(|source| TravelTimeError::Io {
            path: path.clone(),
            source,
        })?;

        let gzipped = entry.path.extension().and_then(|e| e.to_str()) == Some("gz");
        let reader: Box<dyn Read> = if gzipped {
            Box::new(GzDecoder::new(BufReader::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };

        let records = parse_travel_times(reader, &path, &self.config)?;
        debug!(path = %path, gzipped, records = records.len(), "Travel-time file parsed");

        Ok(TravelTimeFile {
            destination_id: entry.cell_id,
            records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::TransportMode;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    const CONTENT: &str = "from_id;to_id;walk_t;pt_r_t;car_r_t;bike_s_t\n1;9;40;20;10;-1\n";

    #[test]
    fn test_load_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("travel_times_to_ 9.txt");
        std::fs::write(&path, CONTENT).unwrap();

        let source = FileSource::new(AccessibilityConfig::default());
        let file = source.load(&ManifestEntry { cell_id: 9, path }).unwrap();

        assert_eq!(file.destination_id, 9);
        assert_eq!(file.records.len(), 1);
        assert_eq!(file.records[0].time(TransportMode::Car), Some(10.0));
        assert_eq!(file.records[0].time(TransportMode::Bike), None);
    }

    #[test]
    fn test_load_gzipped_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("travel_times_to_ 9.txt.gz");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(CONTENT.as_bytes()).unwrap();
        std::fs::write(&path, encoder.finish().unwrap()).unwrap();

        let source = FileSource::new(AccessibilityConfig::default());
        let file = source.load(&ManifestEntry { cell_id: 9, path }).unwrap();

        assert_eq!(file.records.len(), 1);
        assert_eq!(file.records[0].time(TransportMode::Walk), Some(40.0));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileSource::new(AccessibilityConfig::default());
        let err = source
            .load(&ManifestEntry {
                cell_id: 9,
                path: dir.path().join("absent.txt"),
            })
            .unwrap_err();

        assert!(matches!(err, TravelTimeError::Io { .. }));
    }
}
