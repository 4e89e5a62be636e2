use crate::analysis::classifier::StatusTier;
use crate::analysis::proximity::RankedLocation;
use crate::analysis::statistics::{AvailabilitySummary, round_one_decimal};
use crate::analysis::{Analyzer, LocationSummary};
use crate::error::ParkingError;
use crate::locate::{LocationError, ReferenceOrigin, ReferencePoint};
use crate::snapshot::TimeRange;
use crate::source::{SnapshotSource, SourceError};
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::info;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("timestamp format error: {0}")]
    Format(#[from] time::error::Format),
    #[error("analysis failed: {0}")]
    Analysis(#[from] ParkingError),
    #[error("data source failed: {0}")]
    Source(#[from] SourceError),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct StatisticsResponse {
    pub location_id: String,
    pub average_occupancy_pct: f64,
    pub peak_hour: String,
    pub payment_compliance_pct: f64,
    pub estimated_revenue_loss: i64,
    pub currency: String,
    pub total_cars_parked: u64,
    pub total_paid: u64,
    pub total_unpaid: i64,
    pub samples: usize,
}

impl StatisticsResponse {
    pub fn new(location: &LocationSummary, currency: &str) -> Self {
        let summary = &location.summary;
        Self {
            location_id: location.location_id.to_string(),
            average_occupancy_pct: summary.average_occupancy_display(),
            peak_hour: peak_hour_label(summary),
            payment_compliance_pct: summary.payment_compliance_display(),
            estimated_revenue_loss: summary.estimated_revenue_loss,
            currency: currency.to_string(),
            total_cars_parked: summary.total_cars_parked,
            total_paid: summary.total_paid,
            total_unpaid: summary.total_unpaid,
            samples: summary.sample_count,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct NearbyLocationResponse {
    pub location_id: String,
    pub lat: f64,
    pub lon: f64,
    pub distance_km: f64,
    pub distance: String,
    pub status: StatusTier,
    pub status_label: String,
    pub available_spaces: u32,
    pub total_spaces: u32,
    pub free_percent: u32,
}

impl From<&RankedLocation> for NearbyLocationResponse {
    fn from(ranked: &RankedLocation) -> Self {
        Self {
            location_id: ranked.location_id.to_string(),
            lat: ranked.coordinate.lat(),
            lon: ranked.coordinate.lon(),
            distance_km: ranked.distance_km,
            distance: format_distance(ranked.distance_km),
            status: ranked.status,
            status_label: ranked.status.label().to_string(),
            available_spaces: ranked.available_spaces,
            total_spaces: ranked.total_spaces,
            free_percent: percent_free(ranked.available_spaces, ranked.total_spaces),
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceSource {
    Located,
    Fallback,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ReferenceResponse {
    pub lat: f64,
    pub lon: f64,
    pub source: ReferenceSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<LocationError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl From<&ReferencePoint> for ReferenceResponse {
    fn from(reference: &ReferencePoint) -> Self {
        let (source, error) = match reference.origin {
            ReferenceOrigin::Located => (ReferenceSource::Located, None),
            ReferenceOrigin::Fallback(err) => (ReferenceSource::Fallback, Some(err)),
        };
        Self {
            lat: reference.coordinate.lat(),
            lon: reference.coordinate.lon(),
            source,
            error_code: error,
            error_message: error.map(|err| err.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ReportResponse {
    pub generated_at: String,
    pub time_range: TimeRange,
    pub reference: ReferenceResponse,
    pub statistics: Vec<StatisticsResponse>,
    pub nearby: Vec<NearbyLocationResponse>,
}

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub time_range: TimeRange,
    pub currency: String,
}

/// Runs both analyses over `source` and shapes the result for display.
pub fn build_report(
    analyzer: &Analyzer,
    source: &dyn SnapshotSource,
    reference: &ReferencePoint,
    options: &ReportOptions,
    now: OffsetDateTime,
) -> Result<ReportResponse, ReportError> {
    let summaries = analyzer.summarize_all(source.history()?, options.time_range, now);
    let ranked = analyzer.rank(&reference.coordinate, &source.current()?)?;
    info!(
        locations = summaries.len(),
        nearby = ranked.len(),
        range = options.time_range.label(),
        "Report built"
    );

    Ok(ReportResponse {
        generated_at: format_timestamp(now)?,
        time_range: options.time_range,
        reference: ReferenceResponse::from(reference),
        statistics: summaries
            .iter()
            .map(|summary| StatisticsResponse::new(summary, &options.currency))
            .collect(),
        nearby: ranked.iter().map(NearbyLocationResponse::from).collect(),
    })
}

/// Meters below one kilometer, otherwise kilometers to one decimal.
pub fn format_distance(distance_km: f64) -> String {
    if distance_km < 1.0 {
        format!("{} m", (distance_km * 1000.0).round() as u64)
    } else {
        format!("{:.1} km", round_one_decimal(distance_km))
    }
}

pub fn percent_free(available_spaces: u32, total_spaces: u32) -> u32 {
    if total_spaces == 0 {
        return 0;
    }
    (available_spaces as f64 / total_spaces as f64 * 100.0).round() as u32
}

/// `"H:00"` for the peak hour, `"00:00"` when there was nothing to summarize.
pub fn peak_hour_label(summary: &AvailabilitySummary) -> String {
    if summary.sample_count == 0 {
        return "00:00".to_string();
    }
    format!("{}:00", summary.peak_hour)
}

pub fn format_timestamp(timestamp: OffsetDateTime) -> Result<String, time::error::Format> {
    timestamp.format(&Rfc3339)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;
    use crate::snapshot::LocationId;
    use crate::source::json::JsonFileSource;
    use serde_json::json;
    use time::macros::datetime;

    #[test]
    fn distances_switch_units_at_one_kilometer() {
        assert_eq!(format_distance(0.0), "0 m");
        assert_eq!(format_distance(0.168), "168 m");
        assert_eq!(format_distance(0.9996), "1000 m");
        assert_eq!(format_distance(1.0), "1.0 km");
        assert_eq!(format_distance(1.387), "1.4 km");
        assert_eq!(format_distance(12.34), "12.3 km");
    }

    #[test]
    fn percent_free_rounds_to_whole_percent() {
        assert_eq!(percent_free(8, 50), 16);
        assert_eq!(percent_free(7, 15), 47);
        assert_eq!(percent_free(0, 12), 0);
        assert_eq!(percent_free(0, 0), 0);
    }

    #[test]
    fn peak_label_defaults_for_empty_summary() {
        let empty = AvailabilitySummary::empty();
        let busy = AvailabilitySummary {
            peak_hour: 9,
            sample_count: 24,
            ..AvailabilitySummary::empty()
        };

        assert_eq!(peak_hour_label(&empty), "00:00");
        assert_eq!(peak_hour_label(&busy), "9:00");
    }

    #[test]
    fn statistics_response_rounds_for_display() -> Result<(), serde_json::Error> {
        let location = LocationSummary {
            location_id: LocationId::from("Amiralsgatan"),
            summary: AvailabilitySummary {
                average_occupancy_pct: 71.234,
                peak_hour: 12,
                payment_compliance_pct: 68.96,
                estimated_revenue_loss: 3460,
                total_cars_parked: 558,
                total_paid: 385,
                total_unpaid: 173,
                sample_count: 24,
            },
        };

        let value = serde_json::to_value(StatisticsResponse::new(&location, "SEK"))?;

        assert_eq!(
            value,
            json!({
                "location_id": "Amiralsgatan",
                "average_occupancy_pct": 71.2,
                "peak_hour": "12:00",
                "payment_compliance_pct": 69.0,
                "estimated_revenue_loss": 3460,
                "currency": "SEK",
                "total_cars_parked": 558,
                "total_paid": 385,
                "total_unpaid": 173,
                "samples": 24
            })
        );
        Ok(())
    }

    #[test]
    fn nearby_response_includes_status_and_formatted_distance() -> Result<(), Box<dyn std::error::Error>>
    {
        let ranked = RankedLocation {
            location_id: LocationId::from("Kalendegatan"),
            coordinate: Coordinate::new(55.606, 13.0)?,
            distance_km: 0.168,
            status: StatusTier::Limited,
            available_spaces: 3,
            total_spaces: 15,
        };

        let value = serde_json::to_value(NearbyLocationResponse::from(&ranked))?;

        assert_eq!(
            value,
            json!({
                "location_id": "Kalendegatan",
                "lat": 55.606,
                "lon": 13.0,
                "distance_km": 0.168,
                "distance": "168 m",
                "status": "limited",
                "status_label": "Limited Availability",
                "available_spaces": 3,
                "total_spaces": 15,
                "free_percent": 20
            })
        );
        Ok(())
    }

    #[test]
    fn fallback_reference_carries_error_code_and_message() -> Result<(), serde_json::Error> {
        let reference = ReferencePoint {
            coordinate: crate::locate::DEFAULT_CENTER,
            origin: ReferenceOrigin::Fallback(LocationError::Timeout),
        };

        let value = serde_json::to_value(ReferenceResponse::from(&reference))?;

        assert_eq!(
            value,
            json!({
                "lat": 55.605,
                "lon": 13.002,
                "source": "fallback",
                "error_code": "TIMEOUT",
                "error_message": "The request to get your location timed out. Please try again."
            })
        );
        Ok(())
    }

    #[test]
    fn located_reference_omits_error_fields() -> Result<(), Box<dyn std::error::Error>> {
        let reference = ReferencePoint {
            coordinate: Coordinate::new(55.6, 13.0)?,
            origin: ReferenceOrigin::Located,
        };

        let value = serde_json::to_value(ReferenceResponse::from(&reference))?;

        assert_eq!(value, json!({ "lat": 55.6, "lon": 13.0, "source": "located" }));
        Ok(())
    }

    #[test]
    fn over_capacity_street_does_not_suppress_the_report() -> Result<(), Box<dyn std::error::Error>>
    {
        let source = JsonFileSource::parse(
            r#"{
                "locations": [
                    { "location_id": "Spångatan", "coordinate": { "lat": 55.600, "lon": 13.000 } },
                    { "location_id": "Kalendegatan", "coordinate": { "lat": 55.606, "lon": 13.000 } }
                ],
                "snapshots": [
                    { "location_id": "Spångatan", "timestamp": "2026-03-01T10:00:00Z", "cars_parked": 23, "total_spaces": 20 },
                    { "location_id": "Kalendegatan", "timestamp": "2026-03-01T10:00:00Z", "cars_parked": 6, "total_spaces": 15, "paid_transactions": 6 }
                ]
            }"#,
        )?;
        let reference = ReferencePoint {
            coordinate: Coordinate::new(55.606, 13.0)?,
            origin: ReferenceOrigin::Located,
        };
        let options = ReportOptions {
            time_range: TimeRange::Day,
            currency: "SEK".to_string(),
        };

        let report = build_report(
            &Analyzer::default(),
            &source,
            &reference,
            &options,
            datetime!(2026-03-01 12:00 UTC),
        )?;

        assert_eq!(report.statistics.len(), 1);
        assert_eq!(report.statistics[0].location_id, "Kalendegatan");
        assert_eq!(report.nearby.len(), 2);
        assert_eq!(report.nearby[0].location_id, "Kalendegatan");
        assert_eq!(report.nearby[1].location_id, "Spångatan");
        assert_eq!(report.nearby[1].available_spaces, 0);
        assert_eq!(report.nearby[1].status, StatusTier::None);
        Ok(())
    }

    #[test]
    fn timestamps_format_as_rfc3339() -> Result<(), time::error::Format> {
        assert_eq!(
            format_timestamp(datetime!(2026-03-01 12:30 UTC))?,
            "2026-03-01T12:30:00Z"
        );
        Ok(())
    }
}
