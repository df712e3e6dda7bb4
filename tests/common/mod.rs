//! Common test utilities and helpers for parkstat tests
//!
//! Reports are always computed against the fixed reference instant
//! [`reference_now`] so window boundaries are stable.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use parkstat_core::provider::Snapshots;
use parkstat_core::types::{
    LayoutCapacity, OccupancySlotState, Transaction, UserDirectory, UserDirectoryEntry,
    VehicleType,
};

/// Wednesday 2024-03-13 12:00 in Manila (04:00 UTC)
pub fn reference_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 13, 4, 0, 0).unwrap()
}

/// A Manila wall-clock time in March 2024, as UTC
pub fn manila(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    manila_date(3, day, hour, minute)
}

/// A Manila wall-clock time in 2024, as UTC
pub fn manila_date(month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    chrono_tz::Asia::Manila
        .with_ymd_and_hms(2024, month, day, hour, minute, 0)
        .unwrap()
        .with_timezone(&Utc)
}

/// Builder for creating test transactions
pub struct TransactionBuilder {
    id: String,
    time_in: Option<DateTime<Utc>>,
    time_out: Option<DateTime<Utc>>,
    amount_paid: f64,
    vehicle_type: VehicleType,
    uid: Option<String>,
}

impl TransactionBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            time_in: None,
            time_out: None,
            amount_paid: 0.0,
            vehicle_type: VehicleType::Car,
            uid: None,
        }
    }

    pub fn entered(mut self, time_in: DateTime<Utc>) -> Self {
        self.time_in = Some(time_in);
        self
    }

    pub fn exited(mut self, time_out: DateTime<Utc>) -> Self {
        self.time_out = Some(time_out);
        self
    }

    /// Entered at `time_in` and left `minutes` later
    pub fn stayed(self, time_in: DateTime<Utc>, minutes: i64) -> Self {
        self.entered(time_in).exited(time_in + Duration::minutes(minutes))
    }

    pub fn paid(mut self, amount: f64) -> Self {
        self.amount_paid = amount;
        self
    }

    pub fn vehicle(mut self, vehicle_type: VehicleType) -> Self {
        self.vehicle_type = vehicle_type;
        self
    }

    pub fn uid(mut self, uid: &str) -> Self {
        self.uid = Some(uid.to_string());
        self
    }

    pub fn build(self) -> Transaction {
        Transaction {
            id: self.id,
            time_in: self.time_in,
            time_out: self.time_out,
            status: None,
            amount_paid: self.amount_paid,
            vehicle_type: self.vehicle_type,
            uid: self.uid,
        }
    }
}

/// An occupied slot
pub fn occupied(slot: &str, vehicle_type: VehicleType, uid: Option<&str>) -> OccupancySlotState {
    OccupancySlotState {
        slot_name: slot.to_string(),
        status: "OCCUPIED".to_string(),
        vehicle_type,
        uid: uid.map(str::to_string),
        tx_id: None,
        time_in: None,
    }
}

/// A directory with one PWD user and one regular user
pub fn sample_directory() -> UserDirectory {
    let mut directory = UserDirectory::new();
    directory.insert("pwd-user", UserDirectoryEntry { is_pwd: true });
    directory.insert("regular-user", UserDirectoryEntry { is_pwd: false });
    directory
}

/// Snapshots holding only transactions
pub fn with_transactions(transactions: Vec<Transaction>) -> Snapshots {
    Snapshots {
        transactions,
        occupancy: Vec::new(),
        directory: UserDirectory::new(),
        layout: LayoutCapacity::default(),
    }
}
