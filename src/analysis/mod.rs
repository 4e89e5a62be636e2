use crate::config::{Config, ConfigError};
use crate::error::ParkingError;
use crate::geo::Coordinate;
use crate::snapshot::{
    LocationId, LocationSeries, MonitoredLocation, OccupancySnapshot, TimeRange,
    partition_by_location,
};
use time::OffsetDateTime;
use tracing::{debug, warn};

pub mod classifier;
pub mod proximity;
pub mod statistics;

use classifier::AvailabilityClassifier;
use proximity::{ProximityRanker, RankedLocation};
use statistics::{AvailabilitySummary, StatisticsAggregator};

/// Summary for one location over the requested window.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationSummary {
    pub location_id: LocationId,
    pub summary: AvailabilitySummary,
}

/// Bundles the configured aggregator and ranker.
#[derive(Debug, Clone, Copy, Default)]
pub struct Analyzer {
    aggregator: StatisticsAggregator,
    ranker: ProximityRanker,
}

impl Analyzer {
    pub fn new(classifier: AvailabilityClassifier, aggregator: StatisticsAggregator) -> Self {
        Self {
            aggregator,
            ranker: ProximityRanker::new(classifier),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let classifier = AvailabilityClassifier::new(config.classifier_thresholds())?;
        let mut aggregator = StatisticsAggregator::new(config.rate_per_transaction());
        if let Some(offset) = config.hour_offset()? {
            aggregator = aggregator.with_hour_offset(offset);
        }
        Ok(Self::new(classifier, aggregator))
    }

    /// Summary for a single location, as the dashboard shows for the selected street.
    ///
    /// A location with no snapshots in the window gets the zero summary.
    pub fn summarize_location(
        &self,
        history: &[OccupancySnapshot],
        location_id: &LocationId,
        range: TimeRange,
        now: OffsetDateTime,
    ) -> Result<AvailabilitySummary, ParkingError> {
        let snapshots: Vec<OccupancySnapshot> = history
            .iter()
            .filter(|snapshot| &snapshot.location_id == location_id)
            .cloned()
            .collect();
        let series = LocationSeries::new(location_id.clone(), snapshots)?;
        Ok(self.aggregator.summarize(&series.window(range, now)))
    }

    /// Summaries for every location in `history`, in first-seen order.
    ///
    /// Each location is validated on its own; a location whose history is
    /// rejected is left out without affecting the others.
    pub fn summarize_all(
        &self,
        history: Vec<OccupancySnapshot>,
        range: TimeRange,
        now: OffsetDateTime,
    ) -> Vec<LocationSummary> {
        let groups = partition_by_location(history);
        debug!(
            locations = groups.len(),
            range = range.label(),
            "Summarizing location history"
        );

        let mut summaries = Vec::with_capacity(groups.len());
        for (location_id, snapshots) in groups {
            match LocationSeries::new(location_id.clone(), snapshots) {
                Ok(series) => summaries.push(LocationSummary {
                    location_id,
                    summary: self.aggregator.summarize(&series.window(range, now)),
                }),
                Err(err) => {
                    warn!(location_id = %location_id, error = %err, "Skipping location summary");
                }
            }
        }
        summaries
    }

    pub fn rank(
        &self,
        reference: &Coordinate,
        locations: &[MonitoredLocation],
    ) -> Result<Vec<RankedLocation>, ParkingError> {
        self.ranker.rank(reference, locations)
    }
}
