//! Business timezone handling
//!
//! Every "today / this week / this month" boundary is computed in one fixed
//! business timezone, independent of where a report is requested from. The
//! default is `Asia/Manila` (UTC+8, no daylight saving).

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use std::str::FromStr;
use tracing::debug;

/// Default business timezone
pub const DEFAULT_BUSINESS_TZ: Tz = chrono_tz::Asia::Manila;

/// Environment variable overriding the business timezone
pub const TIMEZONE_ENV: &str = "PARKSTAT_TIMEZONE";

/// Configuration for the business timezone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimezoneConfig {
    /// The timezone used for all local-time boundaries
    pub tz: Tz,
    /// Whether the timezone is UTC
    pub is_utc: bool,
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BUSINESS_TZ)
    }
}

impl TimezoneConfig {
    /// Create a configuration for an explicit timezone
    pub fn new(tz: Tz) -> Self {
        Self {
            is_utc: tz == Tz::UTC,
            tz,
        }
    }

    /// Create a timezone configuration from CLI arguments
    ///
    /// `--utc` wins over `--timezone`, which wins over `PARKSTAT_TIMEZONE`.
    pub fn from_cli(timezone_str: Option<&str>, use_utc: bool) -> crate::error::Result<Self> {
        if use_utc {
            return Ok(Self::new(Tz::UTC));
        }

        if let Some(tz_str) = timezone_str {
            return Self::parse(tz_str).map(Self::new);
        }

        match std::env::var(TIMEZONE_ENV) {
            Ok(tz_str) if !tz_str.trim().is_empty() => {
                debug!("Using business timezone from {}: {}", TIMEZONE_ENV, tz_str);
                Self::parse(tz_str.trim()).map(Self::new)
            }
            _ => Ok(Self::default()),
        }
    }

    fn parse(tz_str: &str) -> crate::error::Result<Tz> {
        Tz::from_str(tz_str).map_err(|_| {
            crate::error::ParkstatError::InvalidTimezone(format!(
                "'{}'. Use format like 'Asia/Manila', 'Asia/Singapore', or 'UTC'",
                tz_str
            ))
        })
    }

    /// Get the display name for the configured timezone
    pub fn display_name(&self) -> &str {
        if self.is_utc { "UTC" } else { self.tz.name() }
    }

    /// Local calendar date of an instant
    pub fn local_date(&self, instant: &DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }

    /// Absolute instant of local midnight on `date`
    ///
    /// Midnights skipped by a DST transition resolve to the first valid local
    /// time of that day.
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        let mut naive = date.and_time(chrono::NaiveTime::MIN);
        for _ in 0..24 {
            if let Some(local) = self.tz.from_local_datetime(&naive).earliest() {
                return local.with_timezone(&Utc);
            }
            naive += chrono::Duration::hours(1);
        }
        Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
    }
}
