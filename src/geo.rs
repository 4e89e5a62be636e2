//! Great-circle distance on WGS84 coordinates.

use crate::error::ParkingError;
use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A validated latitude/longitude pair in decimal degrees.
///
/// Construction rejects non-finite values and anything outside
/// `[-90, 90]` x `[-180, 180]`, so every `Coordinate` in circulation is
/// safe to feed into [`distance_km`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct RawCoordinate {
    lat: f64,
    lon: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = ParkingError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.lat, raw.lon)
    }
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Result<Self, ParkingError> {
        let lat_ok = lat.is_finite() && (-90.0..=90.0).contains(&lat);
        let lon_ok = lon.is_finite() && (-180.0..=180.0).contains(&lon);
        if lat_ok && lon_ok {
            Ok(Self { lat, lon })
        } else {
            Err(ParkingError::InvalidCoordinate { lat, lon })
        }
    }

    /// For compile-time constants already known to be in range.
    pub(crate) const fn new_unchecked(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }
}

/// Haversine distance between two coordinates in kilometers.
pub fn distance_km(a: &Coordinate, b: &Coordinate) -> f64 {
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lon = (b.lon - a.lon).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push h a hair outside [0, 1] for antipodal points.
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).expect("valid coordinate")
    }

    #[test]
    fn distance_to_self_is_zero() {
        for c in [coord(55.605, 13.002), coord(-33.9, 151.2), coord(90.0, 180.0)] {
            assert_eq!(distance_km(&c, &c), 0.0);
        }
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            (coord(55.595, 13.003), coord(55.612, 13.008)),
            (coord(0.0, -179.9), coord(0.0, 179.9)),
            (coord(-45.0, 10.0), coord(60.0, -120.0)),
        ];

        for (a, b) in pairs {
            let ab = distance_km(&a, &b);
            let ba = distance_km(&b, &a);
            assert!((ab - ba).abs() < 1e-9, "{ab} != {ba}");
        }
    }

    #[test]
    fn one_degree_of_latitude_matches_arc_length() {
        let a = coord(10.0, 20.0);
        let b = coord(11.0, 20.0);
        let expected = EARTH_RADIUS_KM * std::f64::consts::PI / 180.0;

        assert!((distance_km(&a, &b) - expected).abs() < 1e-6);
    }

    #[test]
    fn antipodal_points_are_half_circumference_apart() {
        let a = coord(0.0, 0.0);
        let b = coord(0.0, 180.0);
        let distance = distance_km(&a, &b);

        assert!(!distance.is_nan());
        assert!((distance - EARTH_RADIUS_KM * std::f64::consts::PI).abs() < 1e-6);
    }

    #[test]
    fn nearby_streets_are_about_a_kilometer_apart() {
        let center = coord(55.605, 13.002);
        let south = coord(55.595, 13.003);

        let distance = distance_km(&center, &south);

        assert!(distance > 1.10 && distance < 1.13, "got {distance}");
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        assert!(matches!(
            Coordinate::new(90.5, 0.0),
            Err(ParkingError::InvalidCoordinate { .. })
        ));
        assert!(matches!(
            Coordinate::new(0.0, -180.01),
            Err(ParkingError::InvalidCoordinate { .. })
        ));
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn deserialize_validates_range() {
        let ok: Result<Coordinate, _> = serde_json::from_str(r#"{"lat": 55.6, "lon": 13.0}"#);
        let bad: Result<Coordinate, _> = serde_json::from_str(r#"{"lat": 123.0, "lon": 13.0}"#);

        assert_eq!(ok.ok(), Some(coord(55.6, 13.0)));
        assert!(bad.is_err());
    }
}
