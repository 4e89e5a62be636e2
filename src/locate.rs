//! Where "nearby" is measured from.
//!
//! The analysis only needs a coordinate; how it was obtained (a device
//! prompt, a config value) stays behind [`LocationProvider`]. When no
//! position can be had, the city centre is used instead.

use crate::geo::Coordinate;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

/// Malmö city centre.
pub const DEFAULT_CENTER: Coordinate = Coordinate::new_unchecked(55.605, 13.002);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationError {
    #[error("Location access was denied. Please enable location services to find nearby parking.")]
    PermissionDenied,
    #[error("Location information is unavailable. Please try again later.")]
    PositionUnavailable,
    #[error("The request to get your location timed out. Please try again.")]
    Timeout,
    #[error("Geolocation is not supported on this device.")]
    Unsupported,
    #[error("An unknown error occurred while trying to get your location.")]
    Unknown,
}

pub trait LocationProvider {
    fn current_position(&self) -> Result<Coordinate, LocationError>;
}

/// A provider that always answers with the same position, or never does.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation {
    position: Option<Coordinate>,
}

impl FixedLocation {
    pub fn new(position: Coordinate) -> Self {
        Self {
            position: Some(position),
        }
    }

    pub fn unset() -> Self {
        Self { position: None }
    }
}

impl From<Option<Coordinate>> for FixedLocation {
    fn from(position: Option<Coordinate>) -> Self {
        Self { position }
    }
}

impl LocationProvider for FixedLocation {
    fn current_position(&self) -> Result<Coordinate, LocationError> {
        self.position.ok_or(LocationError::Unsupported)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceOrigin {
    Located,
    Fallback(LocationError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferencePoint {
    pub coordinate: Coordinate,
    pub origin: ReferenceOrigin,
}

/// Asks `provider` for a position, falling back to the city centre.
pub fn resolve_reference(provider: &dyn LocationProvider) -> ReferencePoint {
    match provider.current_position() {
        Ok(coordinate) => {
            info!(
                lat = coordinate.lat(),
                lon = coordinate.lon(),
                "Using located reference point"
            );
            ReferencePoint {
                coordinate,
                origin: ReferenceOrigin::Located,
            }
        }
        Err(err) => {
            warn!(error = %err, "Reference location unavailable, using city centre");
            ReferencePoint {
                coordinate: DEFAULT_CENTER,
                origin: ReferenceOrigin::Fallback(err),
            }
        }
    }
}
