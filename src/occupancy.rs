//! Occupancy summary
//!
//! Reduces the live occupancy snapshot, the user directory and the layout
//! into category counts. Only slots whose status is `OCCUPIED` count. Rider
//! category is known only for slots whose `uid` is in the directory; other
//! occupied slots appear in the vehicle counts but in neither rider count.

use parkstat_core::report_types::{
    AvailabilityReport, CapacityReport, OccupancyReport, UserTypeReport,
};
use parkstat_core::types::{
    LayoutCapacity, OccupancySlotState, SlotCategory, SlotCounts, UserDirectory,
};
use serde::Serialize;
use tracing::debug;

/// Occupancy counts of one snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OccupancySummary {
    /// Occupied slots per vehicle category
    pub occupied: SlotCounts,
    pub pwd_riders: u64,
    pub regular_riders: u64,
    /// Layout capacity, independent of occupancy
    pub capacity: SlotCounts,
}

impl OccupancySummary {
    pub fn currently_occupied(&self) -> u64 {
        self.occupied.total()
    }

    /// Free slots per category, floored at zero
    pub fn available(&self) -> SlotCounts {
        self.capacity.saturating_sub(&self.occupied)
    }

    pub fn to_report(&self) -> OccupancyReport {
        let available = self.available();
        OccupancyReport {
            car: self.occupied.car,
            motorcycle: self.occupied.motorcycle,
            pwd: self.occupied.pwd,
            capacity: CapacityReport {
                car_slots: self.capacity.car,
                motorcycle_slots: self.capacity.motorcycle,
                pwd_slots: self.capacity.pwd,
                total_slots: self.capacity.total(),
            },
            by_user_type: UserTypeReport {
                pwd: self.pwd_riders,
                regular: self.regular_riders,
            },
            available: AvailabilityReport {
                car: available.car,
                motorcycle: available.motorcycle,
                pwd: available.pwd,
            },
        }
    }
}

/// Summarizes occupancy against a directory and layout
pub struct OccupancySummarizer<'a> {
    directory: &'a UserDirectory,
    layout: &'a LayoutCapacity,
}

impl<'a> OccupancySummarizer<'a> {
    pub fn new(directory: &'a UserDirectory, layout: &'a LayoutCapacity) -> Self {
        Self { directory, layout }
    }

    pub fn summarize(&self, slots: &[OccupancySlotState]) -> OccupancySummary {
        let mut summary = OccupancySummary {
            capacity: self.layout.totals(),
            ..Default::default()
        };

        for slot in slots.iter().filter(|s| s.is_occupied()) {
            summary
                .occupied
                .increment(SlotCategory::from_vehicle_type(slot.vehicle_type));

            match slot.uid.as_deref().and_then(|uid| self.directory.get(uid)) {
                Some(entry) if entry.is_pwd => summary.pwd_riders += 1,
                Some(_) => summary.regular_riders += 1,
                None => debug!("No rider category for slot {}", slot.slot_name),
            }
        }

        summary
    }
}
