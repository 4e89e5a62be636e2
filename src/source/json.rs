use crate::geo::Coordinate;
use crate::snapshot::{LocationId, MonitoredLocation, OccupancySnapshot, latest_per_location};
use crate::source::{SnapshotSource, SourceError};
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

/// On-disk layout: known locations plus their snapshot history.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotFile {
    pub locations: Vec<LocationEntry>,
    #[serde(default)]
    pub snapshots: Vec<OccupancySnapshot>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocationEntry {
    pub location_id: LocationId,
    pub coordinate: Coordinate,
}

#[derive(Debug, Clone)]
pub struct JsonFileSource {
    file: SnapshotFile,
}

impl JsonFileSource {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, SourceError> {
        let file: SnapshotFile = serde_json::from_str(contents)?;
        Ok(Self { file })
    }
}

impl SnapshotSource for JsonFileSource {
    fn history(&self) -> Result<Vec<OccupancySnapshot>, SourceError> {
        Ok(self.file.snapshots.clone())
    }

    fn current(&self) -> Result<Vec<MonitoredLocation>, SourceError> {
        let mut latest = latest_per_location(&self.file.snapshots);
        let mut current: Vec<MonitoredLocation> = Vec::with_capacity(self.file.locations.len());

        for entry in &self.file.locations {
            if current
                .iter()
                .any(|location| location.location_id == entry.location_id)
            {
                warn!(location_id = %entry.location_id, "Duplicate location entry, skipping");
                continue;
            }
            let Some(slot) = latest
                .iter()
                .position(|snapshot| snapshot.location_id == entry.location_id)
            else {
                warn!(location_id = %entry.location_id, "No snapshots for location, skipping");
                continue;
            };
            current.push(MonitoredLocation {
                location_id: entry.location_id.clone(),
                coordinate: entry.coordinate,
                latest: latest.swap_remove(slot),
            });
        }

        Ok(current)
    }
}
