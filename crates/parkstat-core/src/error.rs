//! Error types for parkstat
//!
//! Two classes of failure exist and they are deliberately kept apart:
//!
//! - [`ParkstatError`] is fatal for the operation that produced it. An
//!   [`ParkstatError::UpstreamFetch`] aborts the whole report; no partial
//!   figures are ever returned.
//! - [`ParseError`] is recoverable. The affected field or record is excluded
//!   from aggregation and the report still succeeds.
//!
//! # Example
//!
//! ```
//! use parkstat_core::error::{ParkstatError, Result};
//! use parkstat_core::snapshot::SnapshotKind;
//!
//! fn fetch() -> Result<()> {
//!     Err(ParkstatError::upstream(SnapshotKind::Transactions, "connection refused"))
//! }
//!
//! assert!(fetch().unwrap_err().is_upstream());
//! ```

use crate::snapshot::SnapshotKind;
use thiserror::Error;

/// Main error type for parkstat operations
#[derive(Error, Debug)]
pub enum ParkstatError {
    /// One of the input snapshots could not be fetched
    #[error("Failed to fetch {kind} snapshot: {reason}")]
    UpstreamFetch {
        /// The snapshot that failed
        kind: SnapshotKind,
        /// Human-readable cause
        reason: String,
    },

    /// Invalid timezone
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// Invalid date format
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ParkstatError {
    /// Build an upstream fetch error for the given snapshot
    pub fn upstream(kind: SnapshotKind, reason: impl Into<String>) -> Self {
        Self::UpstreamFetch {
            kind,
            reason: reason.into(),
        }
    }

    /// Whether this error belongs to the fatal upstream-fetch class
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::UpstreamFetch { .. })
    }
}

/// Recoverable parse failure for a single field or record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A timestamp value did not match any accepted encoding
    #[error("Unrecognized timestamp: {0}")]
    UnrecognizedTimestamp(String),

    /// A collection had a top-level shape outside the accepted set
    #[error("Unsupported collection shape: {0}")]
    UnsupportedShape(&'static str),

    /// A collection entry was not a record
    #[error("Malformed record at {key}")]
    MalformedRecord {
        /// Key or index of the offending entry
        key: String,
    },
}

/// Convenience type alias for Results in parkstat
pub type Result<T> = std::result::Result<T, ParkstatError>;
