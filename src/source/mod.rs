//! Providers of occupancy snapshots.
//!
//! A source hands the analysis two views of its data: the full snapshot
//! history, and the current state of each monitored location. Sources are
//! selected via the `[data]` section of the config file.

use crate::config::DataSection;
use crate::error::ParkingError;
use crate::snapshot::{MonitoredLocation, OccupancySnapshot};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::info;

pub mod json;
pub mod mock;

use json::JsonFileSource;
use mock::MockSource;

pub trait SnapshotSource: std::fmt::Debug {
    /// Every snapshot the source knows about, in no particular order.
    fn history(&self) -> Result<Vec<OccupancySnapshot>, SourceError>;

    /// Each monitored location paired with its latest snapshot.
    fn current(&self) -> Result<Vec<MonitoredLocation>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read snapshot file: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse snapshot file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid snapshot data: {0}")]
    Data(#[from] ParkingError),
    #[error("unknown data source: {0}")]
    UnknownSource(String),
    #[error("data source {0} requires a path")]
    MissingPath(String),
}

pub fn create_source(
    data: &DataSection,
    now: OffsetDateTime,
) -> Result<Box<dyn SnapshotSource>, SourceError> {
    match data.source_kind() {
        "mock" => {
            let seed = data.seed();
            info!(seed, "Generating mock parking data");
            Ok(Box::new(MockSource::generate(seed, now)?))
        }
        "json" => {
            let path = data
                .path()
                .ok_or_else(|| SourceError::MissingPath("json".to_string()))?;
            info!(path = %path.display(), "Loading parking snapshots");
            Ok(Box::new(JsonFileSource::load(path)?))
        }
        other => Err(SourceError::UnknownSource(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use time::macros::datetime;

    #[test]
    fn default_section_creates_mock_source() -> Result<(), SourceError> {
        let source = create_source(&DataSection::default(), datetime!(2026-03-01 12:00 UTC))?;

        assert_eq!(source.current()?.len(), 10);
        Ok(())
    }

    #[test]
    fn json_source_without_path_is_rejected() {
        let data = DataSection {
            source: Some("json".to_string()),
            path: Some(PathBuf::new()),
            seed: None,
        };

        let result = create_source(&data, datetime!(2026-03-01 12:00 UTC));

        assert!(matches!(result, Err(SourceError::MissingPath(_))));
    }

    #[test]
    fn unknown_source_is_rejected() {
        let data = DataSection {
            source: Some("camera".to_string()),
            ..DataSection::default()
        };

        let result = create_source(&data, datetime!(2026-03-01 12:00 UTC));

        assert!(matches!(result, Err(SourceError::UnknownSource(kind)) if kind == "camera"));
    }
}
