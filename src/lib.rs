//! Parking availability analysis for a set of monitored streets.
//!
//! Snapshots of parked cars come in through a [`source::SnapshotSource`];
//! [`analysis::Analyzer`] turns them into per-street statistics and a
//! distance-ranked list of nearby streets, which [`report`] shapes for
//! display.

pub mod analysis;
pub mod config;
pub mod error;
pub mod geo;
pub mod locate;
pub mod report;
pub mod snapshot;
pub mod source;
