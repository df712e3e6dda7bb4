//! Report data types for parkstat
//!
//! Pure data structures for the assembled analytics report. Field names
//! serialize in camelCase, which is the shape dashboard clients consume.
//! A successful report is always fully populated: empty windows hold zeros,
//! never `null`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Headline figures
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTotals {
    pub today_earnings: f64,
    pub week_earnings: f64,
    pub today_entries: u64,
    pub yesterday_entries: u64,
    /// Completed today / started today, as a percentage (1 dp)
    pub conversion_today_pct: f64,
    /// Mean stay of the current week in minutes (1 dp)
    pub avg_stay_mins_week: f64,
    pub currently_occupied: u64,
}

/// Layout capacity totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityReport {
    pub car_slots: u64,
    pub motorcycle_slots: u64,
    pub pwd_slots: u64,
    pub total_slots: u64,
}

/// Occupied slots split by rider category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTypeReport {
    pub pwd: u64,
    pub regular: u64,
}

/// Free slots per category, floored at zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityReport {
    pub car: u64,
    pub motorcycle: u64,
    pub pwd: u64,
}

/// Current occupancy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupancyReport {
    pub car: u64,
    pub motorcycle: u64,
    pub pwd: u64,
    pub capacity: CapacityReport,
    pub by_user_type: UserTypeReport,
    pub available: AvailabilityReport,
}

/// One trailing window series, ordered oldest to newest
///
/// All vectors have the same length as `labels`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsSeries {
    pub labels: Vec<String>,
    pub total: Vec<f64>,
    pub car: Vec<f64>,
    pub motorcycle: Vec<f64>,
    pub transactions: Vec<u64>,
    pub avg_stay: Vec<f64>,
}

impl EarningsSeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Latest month against the month before it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyComparison {
    pub current_label: String,
    pub previous_label: String,
    pub current_total: f64,
    pub previous_total: f64,
    pub difference: f64,
}

/// Chart series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartsReport {
    pub daily_earnings: EarningsSeries,
    pub weekly_earnings: EarningsSeries,
    pub monthly_earnings: EarningsSeries,
    pub monthly_comparison: MonthlyComparison,
    /// Mean stay per weekday of the current week, Monday first (1 dp)
    pub avg_stay_mins_by_day: [f64; 7],
}

/// The assembled analytics report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    /// Reference instant the report was computed for
    pub generated_at: DateTime<Utc>,
    /// Business timezone all local boundaries use
    pub timezone: String,
    pub totals: ReportTotals,
    pub occupancy: OccupancyReport,
    /// Entries started today, by hour of day
    pub histogram_today: [u64; 24],
    pub charts: ChartsReport,
}

/// Part of the report to display
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportSection {
    #[default]
    Summary,
    Daily,
    Weekly,
    Monthly,
    Occupancy,
}

impl fmt::Display for ReportSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Summary => write!(f, "summary"),
            Self::Daily => write!(f, "daily"),
            Self::Weekly => write!(f, "weekly"),
            Self::Monthly => write!(f, "monthly"),
            Self::Occupancy => write!(f, "occupancy"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_keys() {
        let report = AnalyticsReport::default();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["totals"].get("todayEarnings").is_some());
        assert!(json["totals"].get("conversionTodayPct").is_some());
        assert!(json["occupancy"]["capacity"].get("totalSlots").is_some());
        assert!(json["occupancy"].get("byUserType").is_some());
        assert!(json["charts"].get("monthlyComparison").is_some());
        assert!(json["charts"].get("avgStayMinsByDay").is_some());
        assert!(json["charts"]["dailyEarnings"].get("avgStay").is_some());
        assert_eq!(json["histogramToday"].as_array().unwrap().len(), 24);
    }

    #[test]
    fn test_report_roundtrips_through_json() {
        let mut report = AnalyticsReport::default();
        report.totals.today_earnings = 50.0;
        report.histogram_today[9] = 1;
        let json = serde_json::to_string(&report).unwrap();
        let back: AnalyticsReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
