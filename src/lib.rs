//! parkstat - Earnings, traffic and occupancy analytics for parking stores
//!
//! This library provides functionality to:
//! - Fetch transaction, occupancy, user and layout snapshots from a realtime
//!   document store or a JSON export
//! - Build trailing daily, weekly and monthly windows in a business timezone
//! - Fold transactions into per-window buckets in a single pass
//! - Assemble rounded, fully populated reports in table and JSON formats
//!
//! # Examples
//!
//! ```no_run
//! use chrono::Utc;
//! use parkstat::report::{ReportOptions, generate_report};
//! use parkstat_provider_file::FileSource;
//!
//! #[tokio::main]
//! async fn main() -> parkstat::Result<()> {
//!     let source = FileSource::new("export.json");
//!     let report = generate_report(&source, Utc::now(), &ReportOptions::default()).await?;
//!     println!("Earned today: {}", report.totals.today_earnings);
//!     Ok(())
//! }
//! ```

pub mod aggregation;
pub mod cli;
pub mod occupancy;
pub mod report;
pub mod windows;

// Re-export commonly used types
pub use parkstat_core::error::{ParkstatError, Result};
pub use parkstat_core::report_types::{AnalyticsReport, ReportSection};
pub use parkstat_core::timezone::TimezoneConfig;
pub use parkstat_core::types::HistogramFrame;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
