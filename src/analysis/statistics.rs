//! Summary metrics over the snapshot series of one location.

use crate::snapshot::LocationSeries;
use serde::Serialize;
use time::UtcOffset;
use tracing::{debug, warn};

/// Revenue attributed to each parked car, in the configured currency.
pub const RATE_PER_TRANSACTION: u32 = 20;

/// Raw (unrounded) statistics for one location and time window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailabilitySummary {
    pub average_occupancy_pct: f64,
    /// Hour of day (0-23) with the most cars parked.
    pub peak_hour: u8,
    pub payment_compliance_pct: f64,
    /// Negative when payment data exceeds cars parked.
    pub estimated_revenue_loss: i64,
    pub total_cars_parked: u64,
    pub total_paid: u64,
    pub total_unpaid: i64,
    pub sample_count: usize,
}

impl AvailabilitySummary {
    pub fn empty() -> Self {
        Self {
            average_occupancy_pct: 0.0,
            peak_hour: 0,
            payment_compliance_pct: 0.0,
            estimated_revenue_loss: 0,
            total_cars_parked: 0,
            total_paid: 0,
            total_unpaid: 0,
            sample_count: 0,
        }
    }

    pub fn average_occupancy_display(&self) -> f64 {
        round_one_decimal(self.average_occupancy_pct)
    }

    pub fn payment_compliance_display(&self) -> f64 {
        round_one_decimal(self.payment_compliance_pct)
    }
}

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatisticsAggregator {
    rate_per_transaction: u32,
    hour_offset: Option<UtcOffset>,
}

impl Default for StatisticsAggregator {
    fn default() -> Self {
        Self::new(RATE_PER_TRANSACTION)
    }
}

impl StatisticsAggregator {
    pub fn new(rate_per_transaction: u32) -> Self {
        Self {
            rate_per_transaction,
            hour_offset: None,
        }
    }

    /// Read peak hours in `offset` instead of each timestamp's own offset.
    pub fn with_hour_offset(mut self, offset: UtcOffset) -> Self {
        self.hour_offset = Some(offset);
        self
    }

    pub fn summarize(&self, series: &LocationSeries) -> AvailabilitySummary {
        let snapshots = series.snapshots();
        let Some(first) = snapshots.first() else {
            return AvailabilitySummary::empty();
        };

        let mut total_cars_parked = 0u64;
        let mut total_spaces = 0u64;
        let mut total_paid = 0u64;
        let mut peak = first;

        for snapshot in snapshots {
            total_cars_parked += u64::from(snapshot.cars_parked);
            total_spaces += u64::from(snapshot.total_spaces);
            total_paid += u64::from(snapshot.paid_transactions.unwrap_or(0));
            // Strictly greater: the earliest maximum wins.
            if snapshot.cars_parked > peak.cars_parked {
                peak = snapshot;
            }
        }

        let average_occupancy_pct = if total_spaces == 0 {
            0.0
        } else {
            100.0 * total_cars_parked as f64 / total_spaces as f64
        };
        let payment_compliance_pct = if total_cars_parked == 0 {
            0.0
        } else {
            100.0 * total_paid as f64 / total_cars_parked as f64
        };

        let peak_at = match self.hour_offset {
            Some(offset) => peak
                .timestamp
                .checked_to_offset(offset)
                .unwrap_or(peak.timestamp),
            None => peak.timestamp,
        };

        let total_unpaid = total_cars_parked as i64 - total_paid as i64;
        let estimated_revenue_loss = total_unpaid * i64::from(self.rate_per_transaction);
        if total_unpaid < 0 {
            warn!(
                location_id = %series.location_id(),
                total_cars_parked,
                total_paid,
                "Paid transactions exceed cars parked; unpaid total is negative"
            );
        }

        let summary = AvailabilitySummary {
            average_occupancy_pct,
            peak_hour: peak_at.hour(),
            payment_compliance_pct,
            estimated_revenue_loss,
            total_cars_parked,
            total_paid,
            total_unpaid,
            sample_count: snapshots.len(),
        };
        debug!(
            location_id = %series.location_id(),
            samples = summary.sample_count,
            average_occupancy_pct = summary.average_occupancy_pct,
            peak_hour = summary.peak_hour,
            "Summarized location series"
        );
        summary
    }
}
