//! Where travel-time files come from.

mod file;

pub use file::FileSource;

use crate::error::TravelTimeError;
use crate::manifest::ManifestEntry;
use crate::travel_time::TravelTimeFile;

/// Loads the travel-time records of one manifest entry.
pub trait TravelTimeSource: Send + Sync {
    fn load(&self, entry: &ManifestEntry) -> Result<TravelTimeFile, TravelTimeError>;
}
