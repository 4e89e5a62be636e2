//! Deterministic demo data for the city of Malmö.
//!
//! Hourly history covers five streets with business, evening and night
//! traffic patterns; the current table covers ten streets.

use crate::geo::Coordinate;
use crate::snapshot::{LocationId, MonitoredLocation, OccupancySnapshot};
use crate::source::{SnapshotSource, SourceError};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use time::{Duration, OffsetDateTime};

pub const HISTORY_HOURS: i64 = 24;

/// Cars parked is drawn from `base..base + spread`.
#[derive(Debug, Clone, Copy)]
struct CarRange {
    base: u32,
    spread: u32,
}

#[derive(Debug, Clone, Copy)]
struct StreetProfile {
    name: &'static str,
    total_spaces: u32,
    lat: f64,
    lon: f64,
    business: CarRange,
    evening: CarRange,
    night: CarRange,
    /// Paid share of parked cars is drawn from `min..min + spread`.
    paid_min: f64,
    paid_spread: f64,
}

impl StreetProfile {
    /// `hour` is the snapshot's hour of day, not how many hours ago it was taken.
    fn cars_for_hour(&self, hour: u8) -> CarRange {
        match hour {
            8..=17 => self.business,
            18..=22 => self.evening,
            _ => self.night,
        }
    }
}

const fn range(base: u32, spread: u32) -> CarRange {
    CarRange { base, spread }
}

const PROFILES: [StreetProfile; 5] = [
    StreetProfile {
        name: "Södra Förstadsgatan",
        total_spaces: 30,
        lat: 55.595,
        lon: 13.003,
        business: range(20, 10),
        evening: range(15, 10),
        night: range(5, 5),
        paid_min: 0.7,
        paid_spread: 0.2,
    },
    StreetProfile {
        name: "Amiralsgatan",
        total_spaces: 50,
        lat: 55.605,
        lon: 13.012,
        business: range(35, 15),
        evening: range(25, 10),
        night: range(10, 8),
        paid_min: 0.6,
        paid_spread: 0.2,
    },
    StreetProfile {
        name: "Drottninggatan",
        total_spaces: 25,
        lat: 55.608,
        lon: 13.001,
        business: range(18, 7),
        evening: range(12, 8),
        night: range(3, 5),
        paid_min: 0.75,
        paid_spread: 0.15,
    },
    StreetProfile {
        name: "Föreningsgatan",
        total_spaces: 40,
        lat: 55.612,
        lon: 13.008,
        business: range(28, 12),
        evening: range(20, 10),
        night: range(8, 7),
        paid_min: 0.65,
        paid_spread: 0.2,
    },
    StreetProfile {
        name: "Regementsgatan",
        total_spaces: 30,
        lat: 55.599,
        lon: 12.995,
        business: range(22, 8),
        evening: range(15, 7),
        night: range(5, 5),
        paid_min: 0.7,
        paid_spread: 0.2,
    },
];

/// (street, cars parked, total spaces, lat, lon)
const CURRENT: [(&str, u32, u32, f64, f64); 10] = [
    ("Södra Förstadsgatan", 23, 30, 55.595, 13.003),
    ("Amiralsgatan", 42, 50, 55.605, 13.012),
    ("Drottninggatan", 18, 25, 55.608, 13.001),
    ("Föreningsgatan", 32, 40, 55.612, 13.008),
    ("Regementsgatan", 24, 30, 55.599, 12.995),
    ("Bergsgatan", 15, 20, 55.604, 12.991),
    ("Friisgatan", 8, 15, 55.593, 13.008),
    ("Kalendegatan", 12, 15, 55.606, 13.000),
    ("Östergatan", 9, 12, 55.609, 13.005),
    ("Baltzarsgatan", 7, 10, 55.605, 13.002),
];

#[derive(Debug, Clone)]
pub struct MockSource {
    history: Vec<OccupancySnapshot>,
    current: Vec<MonitoredLocation>,
}

impl MockSource {
    /// Builds the demo data set; identical seeds and `now` give identical data.
    pub fn generate(seed: u64, now: OffsetDateTime) -> Result<Self, SourceError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut history = Vec::with_capacity(PROFILES.len() * HISTORY_HOURS as usize);

        for profile in &PROFILES {
            for hours_ago in (0..HISTORY_HOURS).rev() {
                let timestamp = now - Duration::hours(hours_ago);
                history.push(hourly_snapshot(&mut rng, profile, timestamp));
            }
        }

        let current = CURRENT
            .iter()
            .map(|&(name, cars_parked, total_spaces, lat, lon)| {
                Ok(MonitoredLocation {
                    location_id: LocationId::from(name),
                    coordinate: Coordinate::new(lat, lon)?,
                    latest: OccupancySnapshot {
                        location_id: LocationId::from(name),
                        timestamp: now,
                        cars_parked,
                        total_spaces,
                        paid_transactions: None,
                    },
                })
            })
            .collect::<Result<Vec<_>, SourceError>>()?;

        Ok(Self { history, current })
    }
}

fn hourly_snapshot(
    rng: &mut ChaCha8Rng,
    profile: &StreetProfile,
    timestamp: OffsetDateTime,
) -> OccupancySnapshot {
    let cars = profile.cars_for_hour(timestamp.hour());
    let cars_parked = cars.base + rng.gen_range(0..cars.spread);
    let paid_share = profile.paid_min + rng.r#gen::<f64>() * profile.paid_spread;
    let paid_transactions = (cars_parked as f64 * paid_share).floor() as u32;

    OccupancySnapshot {
        location_id: LocationId::from(profile.name),
        timestamp,
        cars_parked,
        total_spaces: profile.total_spaces,
        paid_transactions: Some(paid_transactions),
    }
}

impl SnapshotSource for MockSource {
    fn history(&self) -> Result<Vec<OccupancySnapshot>, SourceError> {
        Ok(self.history.clone())
    }

    fn current(&self) -> Result<Vec<MonitoredLocation>, SourceError> {
        Ok(self.current.clone())
    }
}
