//! Report assembly
//!
//! [`ReportAssembler`] turns a frozen [`AggregationState`] and an
//! [`OccupancySummary`] into the rounded, ordered [`AnalyticsReport`].
//! [`build_report`] is the whole engine as a pure function of the four
//! snapshots and a reference instant; [`generate_report`] fetches the
//! snapshots from a source first. A fetch failure aborts the report.

use crate::aggregation::{AggregationBucket, AggregationState, Aggregator};
use crate::occupancy::{OccupancySummarizer, OccupancySummary};
use crate::windows::{WindowDefinition, WindowIndexer};
use chrono::{DateTime, Utc};
use parkstat_core::error::Result;
use parkstat_core::provider::{SnapshotSource, Snapshots};
use parkstat_core::report_types::{
    AnalyticsReport, ChartsReport, EarningsSeries, MonthlyComparison, ReportTotals,
};
use parkstat_core::timezone::TimezoneConfig;
use parkstat_core::types::HistogramFrame;
use tracing::info;

/// Settings for one report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOptions {
    pub timezone: TimezoneConfig,
    pub histogram_frame: HistogramFrame,
    /// Fold transactions on the rayon pool
    pub parallel: bool,
}

/// Round half away from zero to `decimals` places
///
/// Always finite: values too large to scale are returned unrounded, and
/// non-finite input saturates to `f64::MAX` or 0.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    if value.is_infinite() {
        return f64::MAX.copysign(value);
    }
    let factor = 10f64.powi(decimals);
    let scaled = value * factor;
    if scaled.is_finite() {
        scaled.round() / factor
    } else {
        value
    }
}

/// Round a monetary amount to centavos
pub fn round_money(value: f64) -> f64 {
    round_to(value, 2)
}

/// Round minutes or a percentage to one decimal
pub fn round_tenth(value: f64) -> f64 {
    round_to(value, 1)
}

/// Merges window labels and aggregated values into the final report
pub struct ReportAssembler<'a> {
    windows: &'a WindowIndexer,
}

impl<'a> ReportAssembler<'a> {
    pub fn new(windows: &'a WindowIndexer) -> Self {
        Self { windows }
    }

    pub fn assemble(
        &self,
        state: &AggregationState,
        occupancy: &OccupancySummary,
    ) -> AnalyticsReport {
        let conversion = state.completed_today as f64 / state.started_today.max(1) as f64 * 100.0;

        let totals = ReportTotals {
            today_earnings: round_money(state.today_earnings),
            week_earnings: round_money(state.week_earnings),
            today_entries: state.today_entries,
            yesterday_entries: state.yesterday_entries,
            conversion_today_pct: round_tenth(conversion),
            avg_stay_mins_week: round_tenth(state.week_stay.mean()),
            currently_occupied: occupancy.currently_occupied(),
        };

        let charts = ChartsReport {
            daily_earnings: Self::series(self.windows.daily(), &state.daily),
            weekly_earnings: Self::series(self.windows.weekly(), &state.weekly),
            monthly_earnings: Self::series(self.windows.monthly(), &state.monthly),
            monthly_comparison: self.monthly_comparison(state),
            avg_stay_mins_by_day: state.stay_by_weekday.map(|stay| round_tenth(stay.mean())),
        };

        AnalyticsReport {
            generated_at: self.windows.now(),
            timezone: self.windows.timezone().display_name().to_string(),
            totals,
            occupancy: occupancy.to_report(),
            histogram_today: state.histogram_today,
            charts,
        }
    }

    fn series(windows: &[WindowDefinition], buckets: &[AggregationBucket]) -> EarningsSeries {
        EarningsSeries {
            labels: windows.iter().map(|w| w.label.clone()).collect(),
            total: buckets.iter().map(|b| round_money(b.total_earnings)).collect(),
            car: buckets.iter().map(|b| round_money(b.car_earnings)).collect(),
            motorcycle: buckets
                .iter()
                .map(|b| round_money(b.motorcycle_earnings))
                .collect(),
            transactions: buckets.iter().map(|b| b.transaction_count).collect(),
            avg_stay: buckets.iter().map(|b| round_tenth(b.avg_stay())).collect(),
        }
    }

    /// Latest month against the one before it
    fn monthly_comparison(&self, state: &AggregationState) -> MonthlyComparison {
        let label = |i: usize| {
            self.windows
                .monthly()
                .get(i)
                .map(|w| w.label.clone())
                .unwrap_or_default()
        };
        let total = |i: usize| {
            state
                .monthly
                .get(i)
                .map(|b| round_money(b.total_earnings))
                .unwrap_or_default()
        };

        let (current, previous) = match state.monthly.len() {
            0 | 1 => (0, 0),
            n => (n - 1, n - 2),
        };
        let current_total = total(current);
        let previous_total = total(previous);

        MonthlyComparison {
            current_label: label(current),
            previous_label: label(previous),
            current_total,
            previous_total,
            difference: round_money(current_total - previous_total),
        }
    }
}

/// Compute a report from already fetched snapshots
pub fn build_report(
    snapshots: &Snapshots,
    now: DateTime<Utc>,
    options: &ReportOptions,
) -> AnalyticsReport {
    let windows = WindowIndexer::new(now, options.timezone);

    let aggregator = Aggregator::new(&windows).with_histogram_frame(options.histogram_frame);
    let state = if options.parallel {
        aggregator.aggregate_parallel(&snapshots.transactions)
    } else {
        aggregator.aggregate(&snapshots.transactions)
    };

    let occupancy = OccupancySummarizer::new(&snapshots.directory, &snapshots.layout)
        .summarize(&snapshots.occupancy);

    ReportAssembler::new(&windows).assemble(&state, &occupancy)
}

/// Fetch all snapshots from `source` and compute a report
pub async fn generate_report<S>(
    source: &S,
    now: DateTime<Utc>,
    options: &ReportOptions,
) -> Result<AnalyticsReport>
where
    S: SnapshotSource + ?Sized,
{
    let snapshots = source.fetch_all().await?;
    info!(
        "Computing report for {} in {} from {} transactions",
        now,
        options.timezone.display_name(),
        snapshots.transactions.len()
    );
    Ok(build_report(&snapshots, now, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use parkstat_core::types::{Transaction, VehicleType};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 13, 4, 0, 0).unwrap()
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round_money(12.345), 12.35);
        assert_eq!(round_money(0.125), 0.13);
        assert_eq!(round_money(-2.5), -2.5);
        assert_eq!(round_tenth(66.666), 66.7);
        assert_eq!(round_tenth(0.05), 0.1);
        assert_eq!(round_tenth(45.0), 45.0);
    }

    #[test]
    fn test_rounding_stays_finite() {
        assert_eq!(round_money(1e307), 1e307);
        assert_eq!(round_money(f64::MAX), f64::MAX);
        assert_eq!(round_money(f64::INFINITY), f64::MAX);
        assert_eq!(round_money(f64::NEG_INFINITY), -f64::MAX);
        assert_eq!(round_tenth(f64::NAN), 0.0);
    }

    #[test]
    fn test_empty_report_is_fully_populated() {
        let report = build_report(&Snapshots::default(), now(), &ReportOptions::default());
        assert_eq!(report.totals, ReportTotals::default());
        assert_eq!(report.histogram_today, [0; 24]);
        assert_eq!(report.charts.daily_earnings.len(), 7);
        assert_eq!(report.charts.weekly_earnings.total, vec![0.0; 8]);
        assert_eq!(report.charts.monthly_earnings.avg_stay, vec![0.0; 6]);
        assert_eq!(report.charts.monthly_comparison.current_label, "Mar 2024");
        assert_eq!(report.charts.monthly_comparison.previous_label, "Feb 2024");
        assert_eq!(report.charts.avg_stay_mins_by_day, [0.0; 7]);
        assert_eq!(report.timezone, "Asia/Manila");
        assert_eq!(report.generated_at, now());
    }

    #[test]
    fn test_conversion_and_comparison() {
        let manila = |month: u32, day: u32, hour: u32, minute: u32| {
            chrono_tz::Asia::Manila
                .with_ymd_and_hms(2024, month, day, hour, minute, 0)
                .unwrap()
                .with_timezone(&Utc)
        };
        let tx = |time_in, time_out, amount: f64| Transaction {
            id: "tx".into(),
            time_in,
            time_out,
            status: None,
            amount_paid: amount,
            vehicle_type: VehicleType::Car,
            uid: None,
        };

        let snapshots = Snapshots {
            transactions: vec![
                tx(Some(manila(3, 13, 8, 0)), Some(manila(3, 13, 8, 20)), 10.005),
                tx(Some(manila(3, 13, 9, 0)), None, 0.0),
                tx(Some(manila(3, 13, 10, 0)), None, 0.0),
                tx(Some(manila(2, 20, 10, 0)), Some(manila(2, 20, 12, 0)), 100.0),
            ],
            ..Default::default()
        };

        let report = build_report(&snapshots, now(), &ReportOptions::default());
        assert_eq!(report.totals.today_entries, 3);
        assert_eq!(report.totals.conversion_today_pct, 33.3);
        assert_eq!(report.totals.avg_stay_mins_week, 20.0);

        let comparison = &report.charts.monthly_comparison;
        assert_eq!(comparison.current_total, 10.01);
        assert_eq!(comparison.previous_total, 100.0);
        assert_eq!(comparison.difference, -89.99);
        assert_eq!(report.charts.monthly_earnings.avg_stay[4], 120.0);
        assert_eq!(report.charts.avg_stay_mins_by_day[2], 20.0);
    }

    #[test]
    fn test_parallel_option_matches_sequential() {
        let snapshots = Snapshots {
            transactions: (0..200)
                .map(|i| Transaction {
                    id: format!("tx-{i}"),
                    time_in: Some(now() - chrono::Duration::hours(i)),
                    time_out: Some(now() - chrono::Duration::hours(i) + chrono::Duration::minutes(30)),
                    status: None,
                    amount_paid: 25.0,
                    vehicle_type: if i % 3 == 0 {
                        VehicleType::Motorcycle
                    } else {
                        VehicleType::Car
                    },
                    uid: None,
                })
                .collect(),
            ..Default::default()
        };

        let sequential = build_report(&snapshots, now(), &ReportOptions::default());
        let parallel = build_report(
            &snapshots,
            now(),
            &ReportOptions {
                parallel: true,
                ..Default::default()
            },
        );
        assert_eq!(sequential, parallel);
    }
}
