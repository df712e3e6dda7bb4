//! Core types, traits, and utilities for parkstat
//!
//! This crate provides the foundational types, error handling, timestamp
//! normalization, business timezone configuration, snapshot shape adapter and
//! the snapshot source trait used by all other parkstat crates.

pub mod error;
pub mod provider;
pub mod report_types;
pub mod snapshot;
pub mod timestamp;
pub mod timezone;
pub mod types;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use error::{ParkstatError, ParseError, Result};
pub use provider::{SnapshotSource, Snapshots};
pub use report_types::{AnalyticsReport, ReportSection};
pub use snapshot::{RecordCollection, SnapshotKind};
pub use timezone::TimezoneConfig;
pub use types::{
    HistogramFrame, LayoutCapacity, OccupancySlotState, Transaction, UserDirectory, VehicleType,
};
