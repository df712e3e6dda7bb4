//! Snapshot shapes and normalization
//!
//! The document store returns the same logical collection in different
//! physical shapes depending on how its keys were written: a sparse keyed
//! object, a dense array (with `null` holes for deleted indices), or `null`
//! when the path is empty. [`RecordCollection`] accepts exactly that closed set
//! and produces one canonical `(key, record)` list. Anything else becomes an
//! empty collection; a non-record entry inside a collection is skipped.
//!
//! # Examples
//!
//! ```
//! use parkstat_core::snapshot::RecordCollection;
//! use serde_json::json;
//!
//! let sparse = RecordCollection::from_value(json!({"a": {"x": 1}, "b": "junk"}));
//! assert_eq!(sparse.len(), 1);
//! assert_eq!(sparse.skipped(), 1);
//!
//! let dense = RecordCollection::from_value(json!([null, {"x": 1}, {"x": 2}]));
//! assert_eq!(dense.keys(), vec!["1", "2"]);
//!
//! assert!(RecordCollection::from_value(json!(null)).is_empty());
//! ```

use crate::error::ParseError;
use crate::types::{
    FloorCapacity, LayoutCapacity, OccupancySlotState, SlotCategory, SlotCounts, Transaction,
    UserDirectory, UserDirectoryEntry, str_field,
};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tracing::debug;

static NULL: Value = Value::Null;

/// A raw record from the document store
pub type Record = serde_json::Map<String, Value>;

/// The four independent snapshots a report is computed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SnapshotKind {
    Transactions,
    Occupancy,
    UserDirectory,
    Layout,
}

impl SnapshotKind {
    pub const ALL: [SnapshotKind; 4] = [
        Self::Transactions,
        Self::Occupancy,
        Self::UserDirectory,
        Self::Layout,
    ];

    /// Document path of this snapshot, relative to the store root
    pub fn path(&self) -> &'static str {
        match self {
            Self::Transactions => "transactions",
            Self::Occupancy => "configurations/layout/occupied",
            Self::UserDirectory => "users",
            Self::Layout => "configurations/layout/floors",
        }
    }
}

impl fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transactions => write!(f, "transactions"),
            Self::Occupancy => write!(f, "occupancy"),
            Self::UserDirectory => write!(f, "user directory"),
            Self::Layout => write!(f, "layout"),
        }
    }
}

/// Canonical list of keyed records
#[derive(Debug, Clone, Default)]
pub struct RecordCollection {
    entries: Vec<(String, Record)>,
    skipped: usize,
}

impl RecordCollection {
    /// Normalize any collection shape into keyed records
    pub fn from_value(value: Value) -> Self {
        let raw = match raw_entries(value) {
            Ok(raw) => raw,
            Err(e) => {
                debug!("Treating collection as empty: {}", e);
                return Self::default();
            }
        };

        let mut collection = Self::default();
        for (key, value) in raw {
            match value {
                Value::Object(record) => collection.entries.push((key, record)),
                _ => {
                    debug!("{}", ParseError::MalformedRecord { key });
                    collection.skipped += 1;
                }
            }
        }
        collection
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries dropped because they were not records
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Record)> {
        self.entries.iter().map(|(k, r)| (k.as_str(), r))
    }
}

/// Split a collection value into `(key, value)` pairs, dropping `null` holes
fn raw_entries(value: Value) -> Result<Vec<(String, Value)>, ParseError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Object(map) => Ok(map.into_iter().filter(|(_, v)| !v.is_null()).collect()),
        Value::Array(items) => Ok(items
            .into_iter()
            .enumerate()
            .filter(|(_, v)| !v.is_null())
            .map(|(i, v)| (i.to_string(), v))
            .collect()),
        Value::Bool(_) => Err(ParseError::UnsupportedShape("bool")),
        Value::Number(_) => Err(ParseError::UnsupportedShape("number")),
        Value::String(_) => Err(ParseError::UnsupportedShape("string")),
    }
}

/// Walk a `/`-separated path from the store root; missing segments yield `null`
pub fn navigate<'a>(root: &'a Value, path: &str) -> &'a Value {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .try_fold(root, |node, segment| match node {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
        .unwrap_or(&NULL)
}

/// Transactions from a raw snapshot
pub fn parse_transactions(value: Value) -> Vec<Transaction> {
    let collection = RecordCollection::from_value(value);
    if collection.skipped() > 0 {
        debug!("Skipped {} malformed transactions", collection.skipped());
    }
    collection
        .iter()
        .map(|(id, record)| Transaction::from_record(id, record))
        .collect()
}

/// Occupancy slot states from a raw snapshot
pub fn parse_occupancy(value: Value) -> Vec<OccupancySlotState> {
    RecordCollection::from_value(value)
        .iter()
        .map(|(key, record)| OccupancySlotState::from_record(key, record))
        .collect()
}

/// User directory from a raw snapshot
pub fn parse_user_directory(value: Value) -> UserDirectory {
    RecordCollection::from_value(value)
        .iter()
        .map(|(uid, record)| {
            let is_pwd = record.get("isPWD").and_then(Value::as_bool).unwrap_or(false);
            (uid.to_string(), UserDirectoryEntry { is_pwd })
        })
        .collect()
}

/// Layout capacity from a raw per-floor snapshot
///
/// A floor either lists its `slots` (each a type label or a record with
/// `type`/`slotType`) or carries `carSlots`/`motorcycleSlots`/`pwdSlots`
/// counts directly.
pub fn parse_layout(value: Value) -> LayoutCapacity {
    let floors = RecordCollection::from_value(value)
        .iter()
        .map(|(name, record)| FloorCapacity {
            name: str_field(record, "name").unwrap_or(name).to_string(),
            slots: floor_slots(record),
        })
        .collect();
    LayoutCapacity { floors }
}

fn floor_slots(record: &Record) -> SlotCounts {
    let Some(slots) = record.get("slots") else {
        let count = |key: &str| record.get(key).and_then(Value::as_u64).unwrap_or(0);
        return SlotCounts::new(
            count("carSlots"),
            count("motorcycleSlots"),
            count("pwdSlots"),
        );
    };

    let mut counts = SlotCounts::default();
    let entries = raw_entries(slots.clone()).unwrap_or_default();
    for (_, slot) in entries {
        let label = match &slot {
            Value::String(s) => Some(s.as_str()),
            Value::Object(map) => str_field(map, "type").or_else(|| str_field(map, "slotType")),
            _ => None,
        };
        if let Some(category) = label.and_then(SlotCategory::from_slot_type) {
            counts.increment(category);
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sparse_collection() {
        let collection = RecordCollection::from_value(json!({
            "tx-a": {"amountPaid": 10},
            "tx-b": {"amountPaid": 20},
        }));
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.keys(), vec!["tx-a", "tx-b"]);
    }

    #[test]
    fn test_dense_collection_with_holes() {
        let collection =
            RecordCollection::from_value(json!([null, {"amountPaid": 10}, null, {"amountPaid": 5}]));
        assert_eq!(collection.keys(), vec!["1", "3"]);
        assert_eq!(collection.skipped(), 0);
    }

    #[test]
    fn test_garbage_entries_skipped() {
        let collection = RecordCollection::from_value(json!([{"ok": true}, 42, "junk", [1]]));
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.skipped(), 3);
    }

    #[test]
    fn test_unsupported_shapes_are_empty() {
        for value in [json!(null), json!(true), json!(12), json!("transactions")] {
            let collection = RecordCollection::from_value(value);
            assert!(collection.is_empty());
            assert_eq!(collection.skipped(), 0);
        }
    }

    #[test]
    fn test_snapshot_paths() {
        assert_eq!(SnapshotKind::Transactions.path(), "transactions");
        assert_eq!(
            SnapshotKind::Occupancy.path(),
            "configurations/layout/occupied"
        );
        assert_eq!(SnapshotKind::UserDirectory.to_string(), "user directory");
    }

    #[test]
    fn test_navigate() {
        let root = json!({
            "configurations": {"layout": {"occupied": {"A1": {"status": "OCCUPIED"}}}},
            "list": [{"x": 1}]
        });
        assert_eq!(
            navigate(&root, "configurations/layout/occupied/A1/status"),
            &json!("OCCUPIED")
        );
        assert_eq!(navigate(&root, "list/0/x"), &json!(1));
        assert!(navigate(&root, "configurations/layout/floors").is_null());
        assert!(navigate(&root, "list/x").is_null());
        assert_eq!(navigate(&root, ""), &root);
    }

    #[test]
    fn test_parse_transactions_skips_garbage() {
        let transactions = parse_transactions(json!({
            "t1": {"amountPaid": 50, "vehicleType": "CAR"},
            "t2": "corrupted",
            "t3": null,
        }));
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].id, "t1");
    }

    #[test]
    fn test_parse_user_directory() {
        let directory = parse_user_directory(json!({
            "u1": {"isPWD": true, "displayName": "A"},
            "u2": {"isPWD": "yes"},
            "u3": {},
        }));
        assert_eq!(directory.len(), 3);
        assert!(directory.get("u1").unwrap().is_pwd);
        assert!(!directory.get("u2").unwrap().is_pwd);
        assert!(!directory.get("u3").unwrap().is_pwd);
    }

    #[test]
    fn test_parse_layout_from_slot_lists() {
        let layout = parse_layout(json!({
            "ground": {
                "slots": {
                    "A1": {"type": "Car"},
                    "A2": {"type": "Car"},
                    "B1": {"slotType": "Motorcycle"},
                    "P1": "PWD",
                    "X1": {"type": "Loading"}
                }
            },
            "upper": {"slots": ["Car", "car", null, "Bike"]}
        }));
        assert_eq!(layout.floors.len(), 2);
        assert_eq!(layout.totals(), SlotCounts::new(4, 2, 1));
    }

    #[test]
    fn test_parse_layout_from_counts() {
        let layout = parse_layout(json!([
            {"name": "Level 1", "carSlots": 10, "motorcycleSlots": 5, "pwdSlots": 2}
        ]));
        assert_eq!(layout.floors[0].name, "Level 1");
        assert_eq!(layout.totals().total(), 17);
    }

    #[test]
    fn test_parse_layout_huge_counts_saturate() {
        let layout = parse_layout(json!([
            {"carSlots": u64::MAX, "motorcycleSlots": 1},
            {"carSlots": 3}
        ]));
        let totals = layout.totals();
        assert_eq!(totals.car, u64::MAX);
        assert_eq!(totals.total(), u64::MAX);
    }
}
