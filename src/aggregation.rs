//! Aggregation module for transaction rollups
//!
//! This module folds a transaction snapshot into per-window
//! [`AggregationBucket`]s and the scalar metrics of the report in a single
//! pass. Each transaction is classified twice:
//!
//! - by `time_in` for traffic (entries today and yesterday, the hourly
//!   histogram)
//! - by `time_out` for revenue (earnings, completions, window buckets)
//!
//! A field that failed to parse only removes the transaction from the
//! classification that needs it.
//!
//! [`AggregationState`] is a commutative monoid under [`AggregationState::merge`],
//! so the fold can be split across threads with rayon and recombined in any
//! order.
//!
//! # Examples
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use parkstat::aggregation::Aggregator;
//! use parkstat::windows::WindowIndexer;
//! use parkstat_core::timezone::TimezoneConfig;
//! use parkstat_core::types::{Transaction, VehicleType};
//!
//! let now = Utc.with_ymd_and_hms(2024, 3, 13, 4, 0, 0).unwrap();
//! let windows = WindowIndexer::new(now, TimezoneConfig::default());
//!
//! let tx = Transaction {
//!     id: "t1".into(),
//!     time_in: Some(Utc.with_ymd_and_hms(2024, 3, 13, 1, 0, 0).unwrap()),
//!     time_out: Some(Utc.with_ymd_and_hms(2024, 3, 13, 1, 45, 0).unwrap()),
//!     status: None,
//!     amount_paid: 50.0,
//!     vehicle_type: VehicleType::Car,
//!     uid: None,
//! };
//!
//! let state = Aggregator::new(&windows).aggregate(&[tx]);
//! assert_eq!(state.today_earnings, 50.0);
//! assert_eq!(state.daily[6].transaction_count, 1);
//! ```

use crate::windows::{DAILY_WINDOWS, MONTHLY_WINDOWS, WEEKLY_WINDOWS, WindowIndexer};
use chrono::{DateTime, Timelike, Utc};
use parkstat_core::types::{HistogramFrame, Transaction, VehicleType};
use rayon::prelude::*;
use serde::Serialize;
use std::ops::{Add, AddAssign};
use tracing::debug;

/// Running sum and count of stay durations in minutes
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StayAccumulator {
    pub sum: f64,
    pub count: u64,
}

impl StayAccumulator {
    pub fn record(&mut self, minutes: f64) {
        self.sum += minutes;
        self.count += 1;
    }

    /// Mean stay, 0 when nothing was recorded
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

impl AddAssign for StayAccumulator {
    fn add_assign(&mut self, other: Self) {
        self.sum += other.sum;
        self.count += other.count;
    }
}

/// Revenue and stay totals of one window
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AggregationBucket {
    pub total_earnings: f64,
    pub car_earnings: f64,
    pub motorcycle_earnings: f64,
    pub transaction_count: u64,
    pub stay_minutes_sum: f64,
    pub stay_minutes_count: u64,
}

impl AggregationBucket {
    /// Add one completed transaction
    pub fn add_transaction(&mut self, amount: f64, vehicle_type: VehicleType, stay: Option<f64>) {
        self.total_earnings += amount;
        if vehicle_type.is_motorcycle() {
            self.motorcycle_earnings += amount;
        } else {
            self.car_earnings += amount;
        }
        self.transaction_count += 1;
        if let Some(minutes) = stay {
            self.stay_minutes_sum += minutes;
            self.stay_minutes_count += 1;
        }
    }

    /// Mean stay of the bucket, 0 when no stay was recorded
    pub fn avg_stay(&self) -> f64 {
        if self.stay_minutes_count == 0 {
            0.0
        } else {
            self.stay_minutes_sum / self.stay_minutes_count as f64
        }
    }
}

impl Add for AggregationBucket {
    type Output = Self;

    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

impl AddAssign for AggregationBucket {
    fn add_assign(&mut self, other: Self) {
        self.total_earnings += other.total_earnings;
        self.car_earnings += other.car_earnings;
        self.motorcycle_earnings += other.motorcycle_earnings;
        self.transaction_count += other.transaction_count;
        self.stay_minutes_sum += other.stay_minutes_sum;
        self.stay_minutes_count += other.stay_minutes_count;
    }
}

/// Everything the fold produces for one report
///
/// Request scoped: a fresh zero state is created per report and never
/// shared between reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregationState {
    pub daily: [AggregationBucket; DAILY_WINDOWS],
    pub weekly: [AggregationBucket; WEEKLY_WINDOWS],
    pub monthly: [AggregationBucket; MONTHLY_WINDOWS],
    pub today_earnings: f64,
    pub week_earnings: f64,
    pub today_entries: u64,
    pub yesterday_entries: u64,
    pub started_today: u64,
    pub completed_today: u64,
    /// Stays completed in the current week
    pub week_stay: StayAccumulator,
    /// Stays completed in the current week, by weekday (Monday = 0)
    pub stay_by_weekday: [StayAccumulator; 7],
    pub histogram_today: [u64; 24],
}

impl AggregationState {
    /// Field-wise sum of two partial states
    pub fn merge(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

impl AddAssign for AggregationState {
    fn add_assign(&mut self, other: Self) {
        for (bucket, other) in self.daily.iter_mut().zip(other.daily) {
            *bucket += other;
        }
        for (bucket, other) in self.weekly.iter_mut().zip(other.weekly) {
            *bucket += other;
        }
        for (bucket, other) in self.monthly.iter_mut().zip(other.monthly) {
            *bucket += other;
        }
        self.today_earnings += other.today_earnings;
        self.week_earnings += other.week_earnings;
        self.today_entries += other.today_entries;
        self.yesterday_entries += other.yesterday_entries;
        self.started_today += other.started_today;
        self.completed_today += other.completed_today;
        self.week_stay += other.week_stay;
        for (stay, other) in self.stay_by_weekday.iter_mut().zip(other.stay_by_weekday) {
            *stay += other;
        }
        for (count, other) in self.histogram_today.iter_mut().zip(other.histogram_today) {
            *count += other;
        }
    }
}

/// Main aggregation engine
pub struct Aggregator<'a> {
    windows: &'a WindowIndexer,
    histogram_frame: HistogramFrame,
}

impl<'a> Aggregator<'a> {
    /// Create an aggregator over prebuilt windows
    pub fn new(windows: &'a WindowIndexer) -> Self {
        Self {
            windows,
            histogram_frame: HistogramFrame::default(),
        }
    }

    /// Select the clock the hourly histogram reads
    pub fn with_histogram_frame(mut self, histogram_frame: HistogramFrame) -> Self {
        self.histogram_frame = histogram_frame;
        self
    }

    /// Fold transactions sequentially
    pub fn aggregate<'t>(
        &self,
        transactions: impl IntoIterator<Item = &'t Transaction>,
    ) -> AggregationState {
        let mut state = AggregationState::default();
        let mut count = 0usize;
        for tx in transactions {
            self.accumulate(&mut state, tx);
            count += 1;
        }
        debug!("Aggregated {} transactions", count);
        state
    }

    /// Fold transactions on the rayon pool
    ///
    /// Produces the same state as [`Aggregator::aggregate`] up to float
    /// summation order.
    pub fn aggregate_parallel(&self, transactions: &[Transaction]) -> AggregationState {
        let state = transactions
            .par_iter()
            .fold(AggregationState::default, |mut state, tx| {
                self.accumulate(&mut state, tx);
                state
            })
            .reduce(AggregationState::default, AggregationState::merge);
        debug!("Aggregated {} transactions in parallel", transactions.len());
        state
    }

    /// Fold one transaction into `state`
    pub fn accumulate(&self, state: &mut AggregationState, tx: &Transaction) {
        if let Some(time_in) = &tx.time_in {
            if self.windows.is_today(time_in) {
                state.today_entries += 1;
                state.started_today += 1;
                state.histogram_today[self.histogram_hour(time_in)] += 1;
            } else if self.windows.is_yesterday(time_in) {
                state.yesterday_entries += 1;
            }
        }

        let Some(time_out) = &tx.time_out else {
            return;
        };
        let stay = tx.stay_minutes();
        let amount = tx.amount_paid;

        if self.windows.is_today(time_out) {
            state.today_earnings += amount;
            state.completed_today += 1;
        }

        if let Some(weekday) = self.windows.current_week_day(time_out) {
            state.week_earnings += amount;
            // The week average covers only stays that ended this week, the
            // same set as the per-weekday averages.
            if let Some(minutes) = stay {
                state.week_stay.record(minutes);
                state.stay_by_weekday[weekday].record(minutes);
            }
        }

        if let Some(i) = self.windows.daily_position(time_out) {
            state.daily[i].add_transaction(amount, tx.vehicle_type, stay);
        }
        if let Some(i) = self.windows.weekly_position(time_out) {
            state.weekly[i].add_transaction(amount, tx.vehicle_type, stay);
        }
        if let Some(i) = self.windows.monthly_position(time_out) {
            state.monthly[i].add_transaction(amount, tx.vehicle_type, stay);
        }
    }

    fn histogram_hour(&self, instant: &DateTime<Utc>) -> usize {
        let hour = match self.histogram_frame {
            HistogramFrame::Utc => instant.hour(),
            HistogramFrame::Business => instant.with_timezone(&self.windows.timezone().tz).hour(),
        };
        hour as usize
    }
}
