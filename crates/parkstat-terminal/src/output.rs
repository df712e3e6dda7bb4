//! Output formatting module for parkstat
//!
//! This module provides formatters for displaying analytics reports in
//! different formats:
//! - Table format for human-readable terminal output
//! - JSON format for dashboards and other tools
//!
//! # Examples
//!
//! ```
//! use parkstat_core::report_types::{AnalyticsReport, ReportSection};
//! use parkstat_terminal::output::get_formatter;
//!
//! let report = AnalyticsReport::default();
//!
//! // Human-readable output
//! let formatter = get_formatter(false);
//! println!("{}", formatter.format_report(&report));
//!
//! // Machine-readable output for a single section
//! let json_formatter = get_formatter(true);
//! println!("{}", json_formatter.format_section(&report, ReportSection::Daily));
//! ```

use chrono_tz::Tz;
use colored::*;
use parkstat_core::report_types::{AnalyticsReport, EarningsSeries, ReportSection};
use parkstat_core::types::SlotCounts;
use prettytable::{Cell, Row, Table, format, row};
use serde::Serialize;
use serde_json::json;

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format the whole report
    fn format_report(&self, report: &AnalyticsReport) -> String;

    /// Format one section of the report
    fn format_section(&self, report: &AnalyticsReport, section: ReportSection) -> String;

    /// Format a failed report; no analytics payload is included
    fn format_error(&self, message: &str) -> String;
}

/// Table formatter for human-readable output
///
/// Amounts are shown in pesos with thousands separators.
pub struct TableFormatter {
    /// Whether to use colored output (respects NO_COLOR environment variable)
    colored_output: bool,
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            colored_output: std::env::var("NO_COLOR").is_err(),
        }
    }

    /// A formatter that never emits color codes
    pub fn plain() -> Self {
        Self {
            colored_output: false,
        }
    }

    /// Format a number with thousands separators
    fn format_number(n: u64) -> String {
        let s = n.to_string();
        let mut result = String::new();

        for (count, ch) in s.chars().rev().enumerate() {
            if count > 0 && count % 3 == 0 {
                result.push(',');
            }
            result.push(ch);
        }

        result.chars().rev().collect()
    }

    /// Format an amount in pesos
    fn format_currency(amount: f64) -> String {
        let cents = (amount.abs() * 100.0).round() as u64;
        let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
        format!(
            "{sign}₱{}.{:02}",
            Self::format_number(cents / 100),
            cents % 100
        )
    }

    fn format_minutes(minutes: f64) -> String {
        format!("{minutes:.1} min")
    }

    /// Signed, colored month-over-month difference
    fn format_difference(&self, difference: f64) -> String {
        let text = if difference > 0.0 {
            format!("+{}", Self::format_currency(difference))
        } else {
            Self::format_currency(difference)
        };

        if !self.colored_output {
            return text;
        }

        if difference > 0.0 {
            text.green().to_string()
        } else if difference < 0.0 {
            text.red().to_string()
        } else {
            text
        }
    }

    fn header(report: &AnalyticsReport) -> String {
        let tz: Tz = report.timezone.parse().unwrap_or(Tz::UTC);
        format!(
            "Parking report as of {}\n",
            report
                .generated_at
                .with_timezone(&tz)
                .format("%Y-%m-%d %H:%M %Z")
        )
    }

    fn format_totals(report: &AnalyticsReport) -> String {
        let totals = &report.totals;
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![b -> "Metric", b -> "Value"]);
        table.add_row(row!["Today's earnings", r -> Self::format_currency(totals.today_earnings)]);
        table.add_row(row!["This week's earnings", r -> Self::format_currency(totals.week_earnings)]);
        table.add_row(row!["Entries today", r -> Self::format_number(totals.today_entries)]);
        table.add_row(row!["Entries yesterday", r -> Self::format_number(totals.yesterday_entries)]);
        table.add_row(row!["Conversion today", r -> format!("{:.1}%", totals.conversion_today_pct)]);
        table.add_row(row!["Avg stay this week", r -> Self::format_minutes(totals.avg_stay_mins_week)]);
        table.add_row(row!["Currently occupied", r -> Self::format_number(totals.currently_occupied)]);
        table.to_string()
    }

    fn format_occupancy(report: &AnalyticsReport) -> String {
        let occupancy = &report.occupancy;
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![b -> "Category", b -> "Occupied", b -> "Capacity", b -> "Available"]);
        table.add_row(row![
            "Car",
            r -> occupancy.car,
            r -> occupancy.capacity.car_slots,
            r -> occupancy.available.car
        ]);
        table.add_row(row![
            "Motorcycle",
            r -> occupancy.motorcycle,
            r -> occupancy.capacity.motorcycle_slots,
            r -> occupancy.available.motorcycle
        ]);
        table.add_row(row![
            "PWD",
            r -> occupancy.pwd,
            r -> occupancy.capacity.pwd_slots,
            r -> occupancy.available.pwd
        ]);
        let occupied = SlotCounts::new(occupancy.car, occupancy.motorcycle, occupancy.pwd);
        let available = SlotCounts::new(
            occupancy.available.car,
            occupancy.available.motorcycle,
            occupancy.available.pwd,
        );
        table.add_row(Row::new(vec![Cell::new(""); 4]));
        table.add_row(row![
            b -> "TOTAL",
            rb -> occupied.total(),
            rb -> occupancy.capacity.total_slots,
            rb -> available.total()
        ]);

        format!(
            "{}Riders: {} PWD, {} regular\n",
            table, occupancy.by_user_type.pwd, occupancy.by_user_type.regular
        )
    }

    fn format_histogram(report: &AnalyticsReport) -> String {
        if report.histogram_today.iter().all(|&n| n == 0) {
            return "No entries today\n".to_string();
        }

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![b -> "Hour", b -> "Entries"]);
        for (hour, &count) in report.histogram_today.iter().enumerate() {
            if count > 0 {
                table.add_row(row![format!("{hour:02}:00"), r -> count]);
            }
        }
        table.to_string()
    }

    fn format_series(title: &str, series: &EarningsSeries) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![
            b -> title,
            b -> "Total",
            b -> "Car",
            b -> "Motorcycle",
            b -> "Transactions",
            b -> "Avg Stay"
        ]);

        for i in 0..series.len() {
            table.add_row(row![
                series.labels[i],
                r -> Self::format_currency(series.total[i]),
                r -> Self::format_currency(series.car[i]),
                r -> Self::format_currency(series.motorcycle[i]),
                r -> Self::format_number(series.transactions[i]),
                r -> Self::format_minutes(series.avg_stay[i])
            ]);
        }

        table.add_row(Row::new(vec![Cell::new(""); 6]));
        table.add_row(row![
            b -> "TOTAL",
            rb -> Self::format_currency(series.total.iter().sum()),
            rb -> Self::format_currency(series.car.iter().sum()),
            rb -> Self::format_currency(series.motorcycle.iter().sum()),
            rb -> Self::format_number(series.transactions.iter().sum()),
            ""
        ]);
        table.to_string()
    }

    fn format_comparison(&self, report: &AnalyticsReport) -> String {
        let comparison = &report.charts.monthly_comparison;
        format!(
            "{}: {}  vs  {}: {}  ({})\n",
            comparison.current_label,
            Self::format_currency(comparison.current_total),
            comparison.previous_label,
            Self::format_currency(comparison.previous_total),
            self.format_difference(comparison.difference)
        )
    }

    fn format_stay_by_day(report: &AnalyticsReport) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(Row::new(
            WEEKDAYS.iter().map(|d| Cell::new(d).style_spec("b")).collect(),
        ));
        table.add_row(Row::new(
            report
                .charts
                .avg_stay_mins_by_day
                .iter()
                .map(|m| Cell::new(&format!("{m:.1}")).style_spec("r"))
                .collect(),
        ));
        table.to_string()
    }
}

impl OutputFormatter for TableFormatter {
    fn format_report(&self, report: &AnalyticsReport) -> String {
        let mut output = Self::header(report);

        output.push_str("\n=== Totals ===\n");
        output.push_str(&Self::format_totals(report));
        output.push_str("\n=== Occupancy ===\n");
        output.push_str(&Self::format_occupancy(report));
        output.push_str("\n=== Entries by hour ===\n");
        output.push_str(&Self::format_histogram(report));
        output.push_str("\n=== Month over month ===\n");
        output.push_str(&self.format_comparison(report));
        output.push_str("\n=== Avg stay this week (min) ===\n");
        output.push_str(&Self::format_stay_by_day(report));
        output
    }

    fn format_section(&self, report: &AnalyticsReport, section: ReportSection) -> String {
        if section == ReportSection::Summary {
            return self.format_report(report);
        }

        let mut output = Self::header(report);
        match section {
            ReportSection::Summary => {}
            ReportSection::Daily => {
                output.push_str(&Self::format_series("Day", &report.charts.daily_earnings));
            }
            ReportSection::Weekly => {
                output.push_str(&Self::format_series("Week", &report.charts.weekly_earnings));
            }
            ReportSection::Monthly => {
                output.push_str(&Self::format_series(
                    "Month",
                    &report.charts.monthly_earnings,
                ));
                output.push('\n');
                output.push_str(&self.format_comparison(report));
            }
            ReportSection::Occupancy => {
                output.push_str(&Self::format_occupancy(report));
            }
        }
        output
    }

    fn format_error(&self, message: &str) -> String {
        if self.colored_output {
            format!("{} {}", "Error:".red().bold(), message)
        } else {
            format!("Error: {message}")
        }
    }
}

/// JSON formatter for machine-readable output
///
/// Keys are camelCase, matching the report structure dashboards consume.
pub struct JsonFormatter;

impl JsonFormatter {
    fn to_pretty<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value)
            .unwrap_or_else(|e| json!({"ok": false, "error": e.to_string()}).to_string())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &AnalyticsReport) -> String {
        Self::to_pretty(report)
    }

    fn format_section(&self, report: &AnalyticsReport, section: ReportSection) -> String {
        let charts = &report.charts;
        match section {
            ReportSection::Summary => self.format_report(report),
            ReportSection::Daily => Self::to_pretty(&json!({
                "generatedAt": report.generated_at,
                "dailyEarnings": charts.daily_earnings,
            })),
            ReportSection::Weekly => Self::to_pretty(&json!({
                "generatedAt": report.generated_at,
                "weeklyEarnings": charts.weekly_earnings,
            })),
            ReportSection::Monthly => Self::to_pretty(&json!({
                "generatedAt": report.generated_at,
                "monthlyEarnings": charts.monthly_earnings,
                "monthlyComparison": charts.monthly_comparison,
            })),
            ReportSection::Occupancy => Self::to_pretty(&json!({
                "generatedAt": report.generated_at,
                "currentlyOccupied": report.totals.currently_occupied,
                "occupancy": report.occupancy,
            })),
        }
    }

    fn format_error(&self, message: &str) -> String {
        Self::to_pretty(&json!({"ok": false, "error": message}))
    }
}

/// Get appropriate formatter based on JSON flag
pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(TableFormatter::new())
    }
}
