//! Occupancy ratio to availability tier.
//!
//! Ratio = cars parked / total spaces:
//! below 0.7 is `High`, below 0.9 is `Limited`, anything else is `None`.

use crate::error::ParkingError;
use serde::{Deserialize, Serialize};

/// Ratios strictly below this are high availability.
pub const HIGH_AVAILABILITY_BELOW: f64 = 0.7;
/// Ratios strictly below this (and at or above the high bound) are limited.
pub const LIMITED_AVAILABILITY_BELOW: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusTier {
    High,
    Limited,
    None,
}

impl StatusTier {
    pub fn label(self) -> &'static str {
        match self {
            Self::High => "High Availability",
            Self::Limited => "Limited Availability",
            Self::None => "No Availability",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierThresholds {
    pub high_below: f64,
    pub limited_below: f64,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            high_below: HIGH_AVAILABILITY_BELOW,
            limited_below: LIMITED_AVAILABILITY_BELOW,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AvailabilityClassifier {
    thresholds: ClassifierThresholds,
}

impl AvailabilityClassifier {
    pub fn new(thresholds: ClassifierThresholds) -> Result<Self, ParkingError> {
        let ClassifierThresholds {
            high_below,
            limited_below,
        } = thresholds;
        let finite = high_below.is_finite() && limited_below.is_finite();
        if !finite || high_below <= 0.0 || high_below > limited_below {
            return Err(ParkingError::InvalidThresholds {
                high: high_below,
                limited: limited_below,
            });
        }
        Ok(Self { thresholds })
    }

    pub fn classify(&self, cars_parked: u32, total_spaces: u32) -> Result<StatusTier, ParkingError> {
        if total_spaces == 0 {
            return Err(ParkingError::ZeroCapacity);
        }
        let ratio = cars_parked as f64 / total_spaces as f64;
        Ok(self.tier_for_ratio(ratio))
    }

    pub(crate) fn tier_for_ratio(&self, ratio: f64) -> StatusTier {
        if ratio < self.thresholds.high_below {
            StatusTier::High
        } else if ratio < self.thresholds.limited_below {
            StatusTier::Limited
        } else {
            StatusTier::None
        }
    }
}

/// Classifies with the default thresholds.
pub fn classify(cars_parked: u32, total_spaces: u32) -> Result<StatusTier, ParkingError> {
    AvailabilityClassifier::default().classify(cars_parked, total_spaces)
}
