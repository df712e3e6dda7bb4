//! Core domain types for parkstat
//!
//! These are read-only views materialized from a store snapshot for a single
//! report. Construction from raw records is tolerant: a field that cannot be
//! understood falls back to its documented default instead of rejecting the
//! record.

use crate::snapshot::Record;
use crate::timestamp::normalize_optional;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::ops::{Add, AddAssign};
use tracing::debug;

/// Vehicle classification of a transaction or occupied slot
///
/// # Examples
/// ```
/// use parkstat_core::types::VehicleType;
///
/// assert_eq!(VehicleType::classify(Some("motorcycle")), VehicleType::Motorcycle);
/// assert_eq!(VehicleType::classify(Some("Truck")), VehicleType::Other);
/// assert_eq!(VehicleType::classify(None), VehicleType::Other);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VehicleType {
    #[default]
    Car,
    Motorcycle,
    Pwd,
    Other,
}

impl VehicleType {
    /// Classify a raw label case-insensitively
    pub fn classify(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::Other;
        };
        match raw.trim().to_ascii_uppercase().as_str() {
            "CAR" => Self::Car,
            "MOTORCYCLE" | "MOTOR" | "BIKE" => Self::Motorcycle,
            "PWD" => Self::Pwd,
            _ => Self::Other,
        }
    }

    /// Whether earnings go to the motorcycle bucket; everything else is "car"
    pub fn is_motorcycle(&self) -> bool {
        matches!(self, Self::Motorcycle)
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Car => write!(f, "CAR"),
            Self::Motorcycle => write!(f, "MOTORCYCLE"),
            Self::Pwd => write!(f, "PWD"),
            Self::Other => write!(f, "OTHER"),
        }
    }
}

/// Reference frame for the hour-of-day histogram
///
/// Which entries count as "today" is always decided in the business
/// timezone; this only selects the clock their hour is read from.
///
/// # Examples
/// ```
/// use parkstat_core::types::HistogramFrame;
///
/// assert_eq!("business".parse::<HistogramFrame>().unwrap(), HistogramFrame::Business);
/// assert_eq!(HistogramFrame::default().to_string(), "utc");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistogramFrame {
    /// Hour of the entry instant in UTC
    #[default]
    Utc,
    /// Hour of the entry instant in the business timezone
    Business,
}

impl fmt::Display for HistogramFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utc => write!(f, "utc"),
            Self::Business => write!(f, "business"),
        }
    }
}

impl std::str::FromStr for HistogramFrame {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "utc" => Ok(Self::Utc),
            "business" | "local" => Ok(Self::Business),
            _ => Err(format!("Invalid histogram frame: {s}")),
        }
    }
}

/// Slot category used for occupancy and capacity counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotCategory {
    Car,
    Motorcycle,
    Pwd,
}

impl SlotCategory {
    /// Category of an occupied slot; unrecognized vehicles count as cars
    pub fn from_vehicle_type(vehicle_type: VehicleType) -> Self {
        match vehicle_type {
            VehicleType::Motorcycle => Self::Motorcycle,
            VehicleType::Pwd => Self::Pwd,
            VehicleType::Car | VehicleType::Other => Self::Car,
        }
    }

    /// Category of a layout slot label; unknown labels are not slots
    pub fn from_slot_type(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "car" | "regular" => Some(Self::Car),
            "motorcycle" | "motor" | "bike" => Some(Self::Motorcycle),
            "pwd" => Some(Self::Pwd),
            _ => None,
        }
    }
}

/// Per-category slot counts
///
/// # Examples
/// ```
/// use parkstat_core::types::{SlotCategory, SlotCounts};
///
/// let mut counts = SlotCounts::new(10, 5, 2);
/// counts.increment(SlotCategory::Pwd);
/// assert_eq!(counts.total(), 18);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotCounts {
    pub car: u64,
    pub motorcycle: u64,
    pub pwd: u64,
}

impl SlotCounts {
    pub fn new(car: u64, motorcycle: u64, pwd: u64) -> Self {
        Self {
            car,
            motorcycle,
            pwd,
        }
    }

    pub fn increment(&mut self, category: SlotCategory) {
        match category {
            SlotCategory::Car => self.car = self.car.saturating_add(1),
            SlotCategory::Motorcycle => self.motorcycle = self.motorcycle.saturating_add(1),
            SlotCategory::Pwd => self.pwd = self.pwd.saturating_add(1),
        }
    }

    /// Sum over all categories, saturating at `u64::MAX`
    pub fn total(&self) -> u64 {
        self.car
            .saturating_add(self.motorcycle)
            .saturating_add(self.pwd)
    }

    /// Per-category `self - other`, floored at zero
    pub fn saturating_sub(&self, other: &Self) -> Self {
        Self {
            car: self.car.saturating_sub(other.car),
            motorcycle: self.motorcycle.saturating_sub(other.motorcycle),
            pwd: self.pwd.saturating_sub(other.pwd),
        }
    }
}

impl Add for SlotCounts {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            car: self.car.saturating_add(other.car),
            motorcycle: self.motorcycle.saturating_add(other.motorcycle),
            pwd: self.pwd.saturating_add(other.pwd),
        }
    }
}

impl AddAssign for SlotCounts {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

/// A parking transaction
///
/// Revenue is realized at `time_out`; traffic is measured at `time_in`. Either
/// timestamp may be missing or unparseable, in which case it is `None` and the
/// rest of the record is still usable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub id: String,
    pub time_in: Option<DateTime<Utc>>,
    pub time_out: Option<DateTime<Utc>>,
    /// Free-text status label, kept verbatim
    pub status: Option<String>,
    pub amount_paid: f64,
    pub vehicle_type: VehicleType,
    pub uid: Option<String>,
}

impl Transaction {
    /// Build a transaction from a raw store record
    pub fn from_record(id: &str, record: &Record) -> Self {
        Self {
            id: id.to_string(),
            time_in: normalize_optional(record.get("timeIn"), "timeIn"),
            time_out: normalize_optional(record.get("timeOut"), "timeOut"),
            status: str_field(record, "status").map(str::to_string),
            amount_paid: parse_amount(record.get("amountPaid")),
            vehicle_type: VehicleType::classify(str_field(record, "vehicleType")),
            uid: non_empty_str(record, "uid"),
        }
    }

    /// Stay duration in minutes, only when both ends parse and it is positive
    pub fn stay_minutes(&self) -> Option<f64> {
        let (time_in, time_out) = (self.time_in?, self.time_out?);
        let millis = (time_out - time_in).num_milliseconds();
        (millis > 0).then(|| millis as f64 / 60_000.0)
    }
}

/// Live state of one slot in the occupancy snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccupancySlotState {
    pub slot_name: String,
    pub status: String,
    pub vehicle_type: VehicleType,
    pub uid: Option<String>,
    pub tx_id: Option<String>,
    pub time_in: Option<DateTime<Utc>>,
}

impl OccupancySlotState {
    /// Build a slot state from a raw record; `key` names the slot when the
    /// record carries no `slotName`
    pub fn from_record(key: &str, record: &Record) -> Self {
        Self {
            slot_name: non_empty_str(record, "slotName").unwrap_or_else(|| key.to_string()),
            status: str_field(record, "status").unwrap_or_default().to_string(),
            vehicle_type: VehicleType::classify(str_field(record, "vehicleType")),
            uid: non_empty_str(record, "uid"),
            tx_id: non_empty_str(record, "txId"),
            time_in: normalize_optional(record.get("timeIn"), "timeIn"),
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case("OCCUPIED")
    }
}

/// Directory flags for one user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDirectoryEntry {
    #[serde(rename = "isPWD")]
    pub is_pwd: bool,
}

/// Mapping of uid to directory flags
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserDirectory {
    entries: HashMap<String, UserDirectoryEntry>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, uid: impl Into<String>, entry: UserDirectoryEntry) {
        self.entries.insert(uid.into(), entry);
    }

    pub fn get(&self, uid: &str) -> Option<&UserDirectoryEntry> {
        self.entries.get(uid)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, UserDirectoryEntry)> for UserDirectory {
    fn from_iter<I: IntoIterator<Item = (String, UserDirectoryEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Slot capacity of one floor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FloorCapacity {
    pub name: String,
    pub slots: SlotCounts,
}

/// Slot capacity of the whole layout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LayoutCapacity {
    pub floors: Vec<FloorCapacity>,
}

impl LayoutCapacity {
    /// Build a layout from per-floor `(car, motorcycle, pwd)` counts
    pub fn from_counts(counts: &[(u64, u64, u64)]) -> Self {
        Self {
            floors: counts
                .iter()
                .enumerate()
                .map(|(i, &(car, motorcycle, pwd))| FloorCapacity {
                    name: format!("floor-{}", i + 1),
                    slots: SlotCounts::new(car, motorcycle, pwd),
                })
                .collect(),
        }
    }

    /// Capacity summed over all floors
    pub fn totals(&self) -> SlotCounts {
        self.floors
            .iter()
            .fold(SlotCounts::default(), |acc, floor| acc + floor.slots)
    }
}

pub(crate) fn str_field<'a>(record: &'a Record, key: &str) -> Option<&'a str> {
    record.get(key).and_then(Value::as_str)
}

fn non_empty_str(record: &Record, key: &str) -> Option<String> {
    str_field(record, key)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Largest amount accepted for a single transaction
///
/// Keeps every earnings sum far from `f64` overflow.
pub const MAX_AMOUNT: f64 = 1e12;

/// Parse a monetary amount; anything absent, negative, above [`MAX_AMOUNT`]
/// or unparseable is 0
pub(crate) fn parse_amount(value: Option<&Value>) -> f64 {
    let amount = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match amount {
        Some(a) if (0.0..=MAX_AMOUNT).contains(&a) => a,
        Some(a) => {
            debug!("Ignoring invalid amount {}", a);
            0.0
        }
        None => 0.0,
    }
}
