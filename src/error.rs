use crate::snapshot::LocationId;
use thiserror::Error;

/// Broad classes of [`ParkingError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller passed something that can never be valid.
    InvalidInput,
    /// The data itself is inconsistent.
    Data,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParkingError {
    #[error("total spaces must be positive")]
    ZeroCapacity,
    #[error("coordinate out of range: lat {lat}, lon {lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },
    #[error("invalid availability thresholds: high {high} must be in (0, {limited}]")]
    InvalidThresholds { high: f64, limited: f64 },
    #[error("{location_id}: {cars_parked} cars parked exceeds {total_spaces} spaces")]
    OverCapacity {
        location_id: LocationId,
        cars_parked: u32,
        total_spaces: u32,
    },
    #[error("snapshot for {found} does not belong to {expected}")]
    ForeignSnapshot {
        expected: LocationId,
        found: LocationId,
    },
}

impl ParkingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ZeroCapacity | Self::InvalidCoordinate { .. } | Self::InvalidThresholds { .. } => {
                ErrorKind::InvalidInput
            }
            Self::OverCapacity { .. } | Self::ForeignSnapshot { .. } => ErrorKind::Data,
        }
    }
}
