//! CLI interface for parkstat
//!
//! This module defines the command-line interface using clap, providing
//! a two-level subcommand structure: `parkstat [source] <report> [flags]`.
//!
//! When the source is omitted, it defaults to `rtdb`, and when the report is
//! omitted it defaults to `summary`. This means:
//! - `parkstat` is equivalent to `parkstat rtdb summary`
//! - `parkstat daily` is equivalent to `parkstat rtdb daily`
//! - `parkstat file occupancy` reads a JSON export instead
//!
//! # Example
//!
//! ```bash
//! # Full report from the live store
//! PARKSTAT_DB_URL=https://lot.example.com parkstat
//!
//! # Trailing months from an export, as JSON, for a fixed instant
//! parkstat file monthly --snapshot export.json --json --now 2024-03-13T12:00:00+08:00
//! ```

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use parkstat_core::error::{ParkstatError, Result};
use parkstat_core::report_types::ReportSection;
use parkstat_core::timestamp::normalize_timestamp;
use parkstat_core::types::HistogramFrame;
use parkstat_provider_file::SNAPSHOT_ENV;
use parkstat_provider_rtdb::{DB_AUTH_ENV, DB_URL_ENV};
use serde_json::Value;
use std::path::PathBuf;

/// Earnings, traffic and occupancy analytics for a parking store
#[derive(Parser, Debug, Clone)]
#[command(name = "parkstat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Show informational output (default is quiet mode with only warnings and errors)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Business timezone for day, week and month boundaries (e.g. "Asia/Manila", "UTC")
    /// If not specified, uses PARKSTAT_TIMEZONE or Asia/Manila
    #[arg(long, short = 'z', global = true)]
    pub timezone: Option<String>,

    /// Use UTC as the business timezone (overrides --timezone)
    #[arg(long, global = true)]
    pub utc: bool,

    /// Compute the report as of this instant instead of now (RFC 3339 or YYYY-MM-DD)
    #[arg(long, global = true)]
    pub now: Option<String>,

    /// Clock used for the hour-of-day histogram: utc or business
    #[arg(long, default_value = "utc", global = true)]
    pub histogram_frame: HistogramFrame,

    /// Aggregate transactions on all cores
    #[arg(long, global = true)]
    pub parallel: bool,

    /// Base URL of the realtime document store
    #[arg(long, env = DB_URL_ENV, global = true)]
    pub db_url: Option<String>,

    /// Auth token or database secret for the store
    #[arg(long, env = DB_AUTH_ENV, hide_env_values = true, global = true)]
    pub db_auth: Option<String>,

    /// Path of the JSON export read by the file source
    #[arg(long, env = SNAPSHOT_ENV, global = true)]
    pub snapshot: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// Supported snapshot sources
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Source {
    #[default]
    Rtdb,
    File,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Rtdb => write!(f, "rtdb"),
            Source::File => write!(f, "file"),
        }
    }
}

// ---------------------------------------------------------------------------
// Report subcommand (nested under each source)
// ---------------------------------------------------------------------------

/// Report sections available within a source
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    /// Show totals, occupancy, hourly entries and month over month
    Summary,
    /// Show earnings of the last 7 days
    Daily,
    /// Show earnings of the last 8 weeks
    Weekly,
    /// Show earnings of the last 6 months
    Monthly,
    /// Show current occupancy and free slots
    Occupancy,
}

impl From<Report> for ReportSection {
    fn from(report: Report) -> Self {
        match report {
            Report::Summary => ReportSection::Summary,
            Report::Daily => ReportSection::Daily,
            Report::Weekly => ReportSection::Weekly,
            Report::Monthly => ReportSection::Monthly,
            Report::Occupancy => ReportSection::Occupancy,
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level command (sources + report shortcuts)
// ---------------------------------------------------------------------------

/// Available commands
///
/// Source subcommands (`rtdb`, `file`) accept an optional nested report.
/// Report names used directly (`daily`, `monthly`, etc.) read from the
/// realtime store.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    // -- Source subcommands --------------------------------------------------
    /// Read snapshots from the realtime document store
    Rtdb {
        #[command(subcommand)]
        report: Option<Report>,
    },
    /// Read snapshots from a JSON export
    File {
        #[command(subcommand)]
        report: Option<Report>,
    },

    // -- Report shortcuts (implicit rtdb source) -----------------------------
    /// Show totals, occupancy, hourly entries and month over month (source: rtdb)
    Summary,
    /// Show earnings of the last 7 days (source: rtdb)
    Daily,
    /// Show earnings of the last 8 weeks (source: rtdb)
    Weekly,
    /// Show earnings of the last 6 months (source: rtdb)
    Monthly,
    /// Show current occupancy and free slots (source: rtdb)
    Occupancy,
}

/// Resolve the optional top-level command into a (Source, Report) pair
pub fn resolve_source_report(cmd: Option<&Command>) -> (Source, Report) {
    match cmd {
        None => (Source::Rtdb, Report::Summary),

        // Source subcommands
        Some(Command::Rtdb { report }) => (Source::Rtdb, report.unwrap_or(Report::Summary)),
        Some(Command::File { report }) => (Source::File, report.unwrap_or(Report::Summary)),

        // Report shortcuts → rtdb
        Some(Command::Summary) => (Source::Rtdb, Report::Summary),
        Some(Command::Daily) => (Source::Rtdb, Report::Daily),
        Some(Command::Weekly) => (Source::Rtdb, Report::Weekly),
        Some(Command::Monthly) => (Source::Rtdb, Report::Monthly),
        Some(Command::Occupancy) => (Source::Rtdb, Report::Occupancy),
    }
}

/// Parse the `--now` reference instant
///
/// Accepts every timestamp form the store itself uses: RFC 3339, naive
/// ISO-8601 (read as UTC), a bare date, or epoch milliseconds.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use parkstat::cli::parse_reference_time;
///
/// let now = parse_reference_time("2024-03-13T12:00:00+08:00").unwrap();
/// assert_eq!(now, Utc.with_ymd_and_hms(2024, 3, 13, 4, 0, 0).unwrap());
///
/// assert!(parse_reference_time("yesterday").is_err());
/// ```
pub fn parse_reference_time(input: &str) -> Result<DateTime<Utc>> {
    let trimmed = input.trim();
    let value = match trimmed.parse::<i64>() {
        Ok(millis) => Value::from(millis),
        Err(_) => Value::from(trimmed),
    };
    normalize_timestamp(&value).map_err(|_| {
        ParkstatError::InvalidDate(format!(
            "'{input}', expected RFC 3339 (e.g. 2024-03-13T12:00:00+08:00) or YYYY-MM-DD"
        ))
    })
}

/// Process exit code for a failed report
///
/// 2 for bad configuration or arguments, 3 when a snapshot could not be
/// fetched.
pub fn exit_code(error: &ParkstatError) -> u8 {
    match error {
        ParkstatError::UpstreamFetch { .. } => 3,
        ParkstatError::Config(_)
        | ParkstatError::InvalidTimezone(_)
        | ParkstatError::InvalidDate(_) => 2,
    }
}
