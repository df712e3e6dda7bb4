//! Timestamp normalization
//!
//! Records in the data store carry timestamps in whatever encoding the writer
//! happened to use: epoch milliseconds from mobile clients, RFC 3339 strings
//! from the web dashboard, and the occasional naive ISO string. Everything is
//! folded into a single `DateTime<Utc>` here.
//!
//! # Examples
//!
//! ```
//! use parkstat_core::timestamp::normalize_timestamp;
//! use serde_json::json;
//!
//! let a = normalize_timestamp(&json!(1_700_000_000_000i64)).unwrap();
//! let b = normalize_timestamp(&json!("2023-11-14T22:13:20Z")).unwrap();
//! assert_eq!(a, b);
//!
//! assert!(normalize_timestamp(&json!("yesterday-ish")).is_err());
//! ```

use crate::error::ParseError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

/// Naive datetime layouts accepted after RFC 3339 fails, interpreted as UTC
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Normalize a raw timestamp value into an absolute UTC instant
///
/// Numbers are epoch milliseconds. Strings are ISO-8601; a trailing `Z` or an
/// explicit offset is honoured and offset-less strings are read as UTC.
pub fn normalize_timestamp(value: &Value) -> Result<DateTime<Utc>, ParseError> {
    match value {
        Value::Number(n) => {
            let millis = n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64));
            millis
                .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
                .ok_or_else(|| ParseError::UnrecognizedTimestamp(n.to_string()))
        }
        Value::String(s) => parse_iso(s),
        other => Err(ParseError::UnrecognizedTimestamp(shape_name(other).into())),
    }
}

/// Normalize an optional field, treating parse failures as absence
///
/// The failure is logged at debug level so a malformed field never takes the
/// rest of its record down with it.
pub fn normalize_optional(value: Option<&Value>, field: &str) -> Option<DateTime<Utc>> {
    let value = value?;
    if value.is_null() {
        return None;
    }
    match normalize_timestamp(value) {
        Ok(ts) => Some(ts),
        Err(e) => {
            tracing::debug!("Ignoring unparseable {}: {}", field, e);
            None
        }
    }
}

fn parse_iso(raw: &str) -> Result<DateTime<Utc>, ParseError> {
    let s = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        && let Some(midnight) = date.and_hms_opt(0, 0, 0)
    {
        return Ok(Utc.from_utc_datetime(&midnight));
    }

    Err(ParseError::UnrecognizedTimestamp(raw.to_string()))
}

fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
