//! Property-based tests for parkstat using proptest
//!
//! Amounts are whole quarters and stays are whole minutes, so every float
//! sum in the fold is exact and states can be compared with `==`.

mod common;

use chrono::{DateTime, Duration, Utc};
use common::reference_now;
use parkstat::aggregation::{AggregationState, Aggregator};
use parkstat::report::{ReportOptions, build_report};
use parkstat::windows::WindowIndexer;
use parkstat_core::provider::Snapshots;
use parkstat_core::timezone::TimezoneConfig;
use parkstat_core::types::{HistogramFrame, Transaction, VehicleType};
use proptest::prelude::*;

fn arb_vehicle_type() -> impl Strategy<Value = VehicleType> {
    prop_oneof![
        Just(VehicleType::Car),
        Just(VehicleType::Motorcycle),
        Just(VehicleType::Pwd),
        Just(VehicleType::Other),
    ]
}

/// Minutes relative to the reference instant, spanning about eight months back
fn arb_instant() -> impl Strategy<Value = DateTime<Utc>> {
    (-350_000i64..1_440).prop_map(|minutes| reference_now() + Duration::minutes(minutes))
}

prop_compose! {
    fn arb_transaction()(
        id in 0u32..1_000_000,
        time_in in prop::option::of(arb_instant()),
        stay in prop::option::of(0i64..600),
        orphan_exit in prop::option::of(arb_instant()),
        quarters in 0u32..40_000,
        vehicle_type in arb_vehicle_type(),
    ) -> Transaction {
        let time_out = match (time_in, stay) {
            (Some(time_in), Some(stay)) => Some(time_in + Duration::minutes(stay)),
            _ => orphan_exit,
        };
        Transaction {
            id: format!("tx-{id}"),
            time_in,
            time_out,
            status: None,
            amount_paid: f64::from(quarters) * 0.25,
            vehicle_type,
            uid: None,
        }
    }
}

fn windows() -> WindowIndexer {
    WindowIndexer::new(reference_now(), TimezoneConfig::default())
}

proptest! {
    #[test]
    fn test_partition_merge_equals_single_pass(
        transactions in prop::collection::vec(arb_transaction(), 0..120),
        split in 0usize..120,
    ) {
        let windows = windows();
        let aggregator = Aggregator::new(&windows);
        let split = split.min(transactions.len());
        let (left, right) = transactions.split_at(split);

        let whole = aggregator.aggregate(&transactions);
        let merged = aggregator.aggregate(left).merge(aggregator.aggregate(right));
        prop_assert_eq!(whole, merged);
    }

    #[test]
    fn test_merge_with_zero_is_identity(
        transactions in prop::collection::vec(arb_transaction(), 0..60),
    ) {
        let windows = windows();
        let state = Aggregator::new(&windows).aggregate(&transactions);
        prop_assert_eq!(state.clone().merge(AggregationState::default()), state.clone());
        prop_assert_eq!(AggregationState::default().merge(state.clone()), state);
    }

    #[test]
    fn test_order_independence(
        transactions in prop::collection::vec(arb_transaction(), 0..80),
    ) {
        let windows = windows();
        let aggregator = Aggregator::new(&windows);
        let forward = aggregator.aggregate(&transactions);
        let backward = aggregator.aggregate(transactions.iter().rev());
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn test_report_is_deterministic(
        transactions in prop::collection::vec(arb_transaction(), 0..60),
    ) {
        let snapshots = Snapshots { transactions, ..Default::default() };
        let options = ReportOptions::default();
        let first = build_report(&snapshots, reference_now(), &options);
        let second = build_report(&snapshots, reference_now(), &options);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_parallel_equals_sequential(
        transactions in prop::collection::vec(arb_transaction(), 0..200),
    ) {
        let windows = windows();
        let aggregator = Aggregator::new(&windows);
        prop_assert_eq!(
            aggregator.aggregate(&transactions),
            aggregator.aggregate_parallel(&transactions)
        );
    }

    #[test]
    fn test_histogram_counts_todays_entries(
        transactions in prop::collection::vec(arb_transaction(), 0..100),
        business in any::<bool>(),
    ) {
        let windows = windows();
        let frame = if business { HistogramFrame::Business } else { HistogramFrame::Utc };
        let state = Aggregator::new(&windows)
            .with_histogram_frame(frame)
            .aggregate(&transactions);
        prop_assert_eq!(state.histogram_today.iter().sum::<u64>(), state.today_entries);
        prop_assert_eq!(state.started_today, state.today_entries);
    }

    #[test]
    fn test_series_shapes_and_vehicle_split(
        transactions in prop::collection::vec(arb_transaction(), 0..100),
    ) {
        let snapshots = Snapshots { transactions, ..Default::default() };
        let report = build_report(&snapshots, reference_now(), &ReportOptions::default());
        let charts = &report.charts;

        prop_assert_eq!(charts.daily_earnings.len(), 7);
        prop_assert_eq!(charts.weekly_earnings.len(), 8);
        prop_assert_eq!(charts.monthly_earnings.len(), 6);

        for series in [&charts.daily_earnings, &charts.weekly_earnings, &charts.monthly_earnings] {
            prop_assert_eq!(series.labels.len(), series.total.len());
            prop_assert_eq!(series.avg_stay.len(), series.total.len());
            for i in 0..series.total.len() {
                prop_assert_eq!(series.car[i] + series.motorcycle[i], series.total[i]);
                prop_assert!(series.total[i] >= 0.0);
            }
        }

        prop_assert_eq!(report.totals.today_earnings, charts.daily_earnings.total[6]);
    }
}
