use crate::analysis::classifier::{AvailabilityClassifier, StatusTier};
use crate::error::ParkingError;
use crate::geo::{Coordinate, distance_km};
use crate::snapshot::{LocationId, MonitoredLocation};
use serde::Serialize;

/// A location placed relative to a reference point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedLocation {
    pub location_id: LocationId,
    pub coordinate: Coordinate,
    pub distance_km: f64,
    pub status: StatusTier,
    pub available_spaces: u32,
    pub total_spaces: u32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProximityRanker {
    classifier: AvailabilityClassifier,
}

impl ProximityRanker {
    pub fn new(classifier: AvailabilityClassifier) -> Self {
        Self { classifier }
    }

    /// Orders every location by distance from `reference`, nearest first.
    ///
    /// The sort is stable: equidistant locations keep their input order.
    /// Available spaces never go below zero, even for over-full snapshots.
    pub fn rank(
        &self,
        reference: &Coordinate,
        locations: &[MonitoredLocation],
    ) -> Result<Vec<RankedLocation>, ParkingError> {
        let mut ranked = locations
            .iter()
            .map(|location| self.enrich(reference, location))
            .collect::<Result<Vec<_>, _>>()?;

        ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        Ok(ranked)
    }

    fn enrich(
        &self,
        reference: &Coordinate,
        location: &MonitoredLocation,
    ) -> Result<RankedLocation, ParkingError> {
        let latest = &location.latest;
        if latest.location_id != location.location_id {
            return Err(ParkingError::ForeignSnapshot {
                expected: location.location_id.clone(),
                found: latest.location_id.clone(),
            });
        }
        let status = self.classifier.tier_for_ratio(latest.occupancy_ratio()?);

        Ok(RankedLocation {
            location_id: location.location_id.clone(),
            coordinate: location.coordinate,
            distance_km: distance_km(reference, &location.coordinate),
            status,
            available_spaces: latest.total_spaces.saturating_sub(latest.cars_parked),
            total_spaces: latest.total_spaces,
        })
    }
}
