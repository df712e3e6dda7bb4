//! Trailing window construction
//!
//! [`WindowIndexer`] fixes every calendar boundary of one report: today,
//! yesterday, the current ISO week, and the trailing daily, weekly and
//! monthly series. All boundaries are local midnights in the business
//! timezone, converted to absolute instants, and every window is half-open
//! `[start, end)`.
//!
//! Bucket lookup goes through hash indices keyed by local calendar
//! coordinates, so assigning an instant to its window is constant time no
//! matter how many windows exist.
//!
//! # Examples
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use parkstat::windows::WindowIndexer;
//! use parkstat_core::timezone::TimezoneConfig;
//!
//! // 2024-03-13 12:00 in Manila (a Wednesday)
//! let now = Utc.with_ymd_and_hms(2024, 3, 13, 4, 0, 0).unwrap();
//! let windows = WindowIndexer::new(now, TimezoneConfig::default());
//!
//! assert_eq!(windows.daily().len(), 7);
//! assert_eq!(windows.daily()[6].label, "Mar 13");
//! assert_eq!(windows.weekly()[7].label, "Week of Mar 11 – Mar 17");
//! assert_eq!(windows.monthly()[5].label, "Mar 2024");
//! ```

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use parkstat_core::timezone::TimezoneConfig;
use serde::Serialize;
use std::collections::HashMap;

/// Number of trailing daily windows, including today
pub const DAILY_WINDOWS: usize = 7;
/// Number of trailing ISO-week windows, including the current week
pub const WEEKLY_WINDOWS: usize = 8;
/// Number of trailing calendar-month windows, including the current month
pub const MONTHLY_WINDOWS: usize = 6;

/// Length of a trailing window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Granularity {
    Day,
    Week,
    Month,
}

/// One trailing window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowDefinition {
    pub label: String,
    /// Inclusive start
    pub start: DateTime<Utc>,
    /// Exclusive end
    pub end: DateTime<Utc>,
    pub granularity: Granularity,
}

impl WindowDefinition {
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        self.start <= *instant && *instant < self.end
    }
}

/// Calendar boundaries and window series for one reference instant
#[derive(Debug, Clone)]
pub struct WindowIndexer {
    timezone: TimezoneConfig,
    now: DateTime<Utc>,
    start_of_today: DateTime<Utc>,
    start_of_tomorrow: DateTime<Utc>,
    start_of_yesterday: DateTime<Utc>,
    week_start: DateTime<Utc>,
    week_end: DateTime<Utc>,
    daily: Vec<WindowDefinition>,
    weekly: Vec<WindowDefinition>,
    monthly: Vec<WindowDefinition>,
    daily_index: HashMap<(i32, u32, u32), usize>,
    weekly_index: HashMap<(i32, u32), usize>,
    monthly_index: HashMap<(i32, u32), usize>,
}

impl WindowIndexer {
    /// Build all windows relative to `now`
    pub fn new(now: DateTime<Utc>, timezone: TimezoneConfig) -> Self {
        let today = timezone.local_date(&now);
        let monday = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
        let month_start = first_of_month(today.year(), today.month());

        let mut daily = Vec::with_capacity(DAILY_WINDOWS);
        let mut daily_index = HashMap::with_capacity(DAILY_WINDOWS);
        for (position, back) in (0..DAILY_WINDOWS as i64).rev().enumerate() {
            let date = today - Duration::days(back);
            daily_index.insert((date.year(), date.month(), date.day()), position);
            daily.push(WindowDefinition {
                label: date.format("%b %d").to_string(),
                start: timezone.start_of_day(date),
                end: timezone.start_of_day(date + Duration::days(1)),
                granularity: Granularity::Day,
            });
        }

        let mut weekly = Vec::with_capacity(WEEKLY_WINDOWS);
        let mut weekly_index = HashMap::with_capacity(WEEKLY_WINDOWS);
        for (position, back) in (0..WEEKLY_WINDOWS as i64).rev().enumerate() {
            let start = monday - Duration::weeks(back);
            let sunday = start + Duration::days(6);
            let week = start.iso_week();
            weekly_index.insert((week.year(), week.week()), position);
            weekly.push(WindowDefinition {
                label: format!(
                    "Week of {} – {}",
                    start.format("%b %d"),
                    sunday.format("%b %d")
                ),
                start: timezone.start_of_day(start),
                end: timezone.start_of_day(start + Duration::weeks(1)),
                granularity: Granularity::Week,
            });
        }

        let mut monthly = Vec::with_capacity(MONTHLY_WINDOWS);
        let mut monthly_index = HashMap::with_capacity(MONTHLY_WINDOWS);
        for (position, back) in (0..MONTHLY_WINDOWS as i32).rev().enumerate() {
            let start = shift_months(month_start, -back);
            let next = shift_months(start, 1);
            monthly_index.insert((start.year(), start.month()), position);
            monthly.push(WindowDefinition {
                label: start.format("%b %Y").to_string(),
                start: timezone.start_of_day(start),
                end: timezone.start_of_day(next),
                granularity: Granularity::Month,
            });
        }

        Self {
            timezone,
            now,
            start_of_today: timezone.start_of_day(today),
            start_of_tomorrow: timezone.start_of_day(today + Duration::days(1)),
            start_of_yesterday: timezone.start_of_day(today - Duration::days(1)),
            week_start: timezone.start_of_day(monday),
            week_end: timezone.start_of_day(monday + Duration::weeks(1)),
            daily,
            weekly,
            monthly,
            daily_index,
            weekly_index,
            monthly_index,
        }
    }

    pub fn timezone(&self) -> &TimezoneConfig {
        &self.timezone
    }

    /// Reference instant the windows were built for
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn start_of_today(&self) -> DateTime<Utc> {
        self.start_of_today
    }

    pub fn start_of_yesterday(&self) -> DateTime<Utc> {
        self.start_of_yesterday
    }

    /// Monday local midnight of the current ISO week
    pub fn week_start(&self) -> DateTime<Utc> {
        self.week_start
    }

    pub fn daily(&self) -> &[WindowDefinition] {
        &self.daily
    }

    pub fn weekly(&self) -> &[WindowDefinition] {
        &self.weekly
    }

    pub fn monthly(&self) -> &[WindowDefinition] {
        &self.monthly
    }

    pub fn is_today(&self, instant: &DateTime<Utc>) -> bool {
        self.start_of_today <= *instant && *instant < self.start_of_tomorrow
    }

    pub fn is_yesterday(&self, instant: &DateTime<Utc>) -> bool {
        self.start_of_yesterday <= *instant && *instant < self.start_of_today
    }

    pub fn is_current_week(&self, instant: &DateTime<Utc>) -> bool {
        self.week_start <= *instant && *instant < self.week_end
    }

    /// Weekday of an instant in the current week, Monday = 0
    pub fn current_week_day(&self, instant: &DateTime<Utc>) -> Option<usize> {
        self.is_current_week(instant).then(|| {
            self.local_date(instant).weekday().num_days_from_monday() as usize
        })
    }

    /// Position of the daily window containing `instant`
    pub fn daily_position(&self, instant: &DateTime<Utc>) -> Option<usize> {
        let date = self.local_date(instant);
        self.daily_index
            .get(&(date.year(), date.month(), date.day()))
            .copied()
    }

    /// Position of the weekly window containing `instant`
    pub fn weekly_position(&self, instant: &DateTime<Utc>) -> Option<usize> {
        let week = self.local_date(instant).iso_week();
        self.weekly_index.get(&(week.year(), week.week())).copied()
    }

    /// Position of the monthly window containing `instant`
    pub fn monthly_position(&self, instant: &DateTime<Utc>) -> Option<usize> {
        let date = self.local_date(instant);
        self.monthly_index
            .get(&(date.year(), date.month()))
            .copied()
    }

    fn local_date(&self, instant: &DateTime<Utc>) -> NaiveDate {
        self.timezone.local_date(instant)
    }
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

/// First day of the month `months` away from the month of `date`
fn shift_months(date: NaiveDate, months: i32) -> NaiveDate {
    let index = date.year() * 12 + date.month0() as i32 + months;
    first_of_month(index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}
