use crate::error::ParkingError;
use crate::geo::Coordinate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use time::{Duration, OffsetDateTime};
use tracing::warn;

/// Identifies a monitored location (a street in the demo city).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(String);

impl LocationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LocationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for LocationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One timestamped observation of a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancySnapshot {
    pub location_id: LocationId,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub cars_parked: u32,
    pub total_spaces: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_transactions: Option<u32>,
}

impl OccupancySnapshot {
    pub fn occupancy_ratio(&self) -> Result<f64, ParkingError> {
        if self.total_spaces == 0 {
            return Err(ParkingError::ZeroCapacity);
        }
        Ok(self.cars_parked as f64 / self.total_spaces as f64)
    }

    /// Checks capacity is positive and not exceeded.
    pub fn validate(&self) -> Result<(), ParkingError> {
        if self.total_spaces == 0 {
            return Err(ParkingError::ZeroCapacity);
        }
        if self.cars_parked > self.total_spaces {
            return Err(ParkingError::OverCapacity {
                location_id: self.location_id.clone(),
                cars_parked: self.cars_parked,
                total_spaces: self.total_spaces,
            });
        }
        Ok(())
    }
}

/// A location together with its most recent snapshot, as shown on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoredLocation {
    pub location_id: LocationId,
    pub coordinate: Coordinate,
    pub latest: OccupancySnapshot,
}

/// Dashboard time window selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeRange {
    #[default]
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
}

impl TimeRange {
    pub fn duration(self) -> Duration {
        match self {
            Self::Day => Duration::hours(24),
            Self::Week => Duration::days(7),
            Self::Month => Duration::days(30),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Day => "24h",
            Self::Week => "7d",
            Self::Month => "30d",
        }
    }
}

/// Validated, timestamp-ordered snapshots of a single location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationSeries {
    location_id: LocationId,
    snapshots: Vec<OccupancySnapshot>,
}

impl LocationSeries {
    /// Builds a series, rejecting foreign or inconsistent snapshots.
    ///
    /// Snapshots are stable-sorted by timestamp, so equal timestamps keep
    /// the order they were supplied in.
    pub fn new(
        location_id: LocationId,
        mut snapshots: Vec<OccupancySnapshot>,
    ) -> Result<Self, ParkingError> {
        for snapshot in &snapshots {
            let checked = if snapshot.location_id != location_id {
                Err(ParkingError::ForeignSnapshot {
                    expected: location_id.clone(),
                    found: snapshot.location_id.clone(),
                })
            } else {
                snapshot.validate()
            };
            if let Err(err) = checked {
                warn!(
                    location_id = %location_id,
                    timestamp = %snapshot.timestamp,
                    error = %err,
                    "Rejecting snapshot series"
                );
                return Err(err);
            }
        }
        snapshots.sort_by_key(|snapshot| snapshot.timestamp);
        Ok(Self {
            location_id,
            snapshots,
        })
    }

    pub fn empty(location_id: LocationId) -> Self {
        Self {
            location_id,
            snapshots: Vec::new(),
        }
    }

    pub fn location_id(&self) -> &LocationId {
        &self.location_id
    }

    pub fn snapshots(&self) -> &[OccupancySnapshot] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Snapshots with `start < timestamp <= end`.
    pub fn within(&self, start: OffsetDateTime, end: OffsetDateTime) -> LocationSeries {
        let snapshots = self
            .snapshots
            .iter()
            .filter(|snapshot| snapshot.timestamp > start && snapshot.timestamp <= end)
            .cloned()
            .collect();
        Self {
            location_id: self.location_id.clone(),
            snapshots,
        }
    }

    /// The trailing `range` ending at `now`.
    pub fn window(&self, range: TimeRange, now: OffsetDateTime) -> LocationSeries {
        self.within(now - range.duration(), now)
    }
}

/// Distinct location ids in first-seen order.
pub fn location_ids(snapshots: &[OccupancySnapshot]) -> Vec<LocationId> {
    let mut ids: Vec<LocationId> = Vec::new();
    for snapshot in snapshots {
        if !ids.contains(&snapshot.location_id) {
            ids.push(snapshot.location_id.clone());
        }
    }
    ids
}

/// Splits a mixed snapshot list into unvalidated per-location groups,
/// in first-seen order.
pub fn partition_by_location(
    snapshots: Vec<OccupancySnapshot>,
) -> Vec<(LocationId, Vec<OccupancySnapshot>)> {
    let mut index: HashMap<LocationId, usize> = HashMap::new();
    let mut groups: Vec<(LocationId, Vec<OccupancySnapshot>)> = Vec::new();

    for snapshot in snapshots {
        match index.get(&snapshot.location_id) {
            Some(&slot) => groups[slot].1.push(snapshot),
            None => {
                index.insert(snapshot.location_id.clone(), groups.len());
                groups.push((snapshot.location_id.clone(), vec![snapshot]));
            }
        }
    }

    groups
}

/// Splits a mixed snapshot list into one validated series per location.
pub fn group_by_location(
    snapshots: Vec<OccupancySnapshot>,
) -> Result<Vec<LocationSeries>, ParkingError> {
    partition_by_location(snapshots)
        .into_iter()
        .map(|(location_id, snapshots)| LocationSeries::new(location_id, snapshots))
        .collect()
}

/// Most recent snapshot per location, in first-seen order.
pub fn latest_per_location(snapshots: &[OccupancySnapshot]) -> Vec<OccupancySnapshot> {
    let mut index: HashMap<&LocationId, usize> = HashMap::new();
    let mut latest: Vec<OccupancySnapshot> = Vec::new();

    for snapshot in snapshots {
        match index.get(&snapshot.location_id) {
            Some(&slot) => {
                if snapshot.timestamp >= latest[slot].timestamp {
                    latest[slot] = snapshot.clone();
                }
            }
            None => {
                index.insert(&snapshot.location_id, latest.len());
                latest.push(snapshot.clone());
            }
        }
    }

    latest
}
