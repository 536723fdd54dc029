use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{Months, NaiveDate};

use crate::domain::assignment::assignment_store::{AssignmentFilter, AssignmentRepository};
use crate::domain::booking::booking_store::BookingRepository;
use crate::domain::capacity::capacity_validator::ANALYTICS_TARGET;
use crate::domain::occupancy::occupancy_record::{OccupancyRecord, SlotKey};
use crate::error::{Error, Result};

/// Calendar status of a slot by its fill ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatusTier {
    /// At most half full.
    Free,
    Partial,
    /// Full or over capacity.
    Full,
}

impl StatusTier {
    pub fn from_occupancy(occupancy: u32, capacity: u32) -> Self {
        if capacity == 0 {
            return StatusTier::Full;
        }

        let ratio = occupancy as f64 / capacity as f64;
        if ratio <= 0.5 {
            StatusTier::Free
        } else if ratio < 1.0 {
            StatusTier::Partial
        } else {
            StatusTier::Full
        }
    }
}

impl fmt::Display for StatusTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusTier::Free => write!(f, "free"),
            StatusTier::Partial => write!(f, "partial"),
            StatusTier::Full => write!(f, "full"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotOccupancy {
    pub key: SlotKey,
    pub occupancy: u32,

    /// Group size of the first record seen for this slot.
    pub capacity: u32,
    pub status: StatusTier,

    /// Every record in the slot, each tagged with its origin.
    pub records: Vec<OccupancyRecord>,
}

impl SlotOccupancy {
    pub fn is_over_capacity(&self) -> bool {
        self.occupancy > self.capacity
    }
}

/// Merged per-slot view over `[from, to]`, ordered by date, time, trainer and room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancySummary {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub slots: Vec<SlotOccupancy>,
}

impl OccupancySummary {
    /// Slots holding more members than their group size.
    pub fn over_capacity(&self) -> Vec<&SlotOccupancy> {
        self.slots.iter().filter(|s| s.is_over_capacity()).collect()
    }

    pub fn slots_on(&self, date: NaiveDate) -> Vec<&SlotOccupancy> {
        self.slots.iter().filter(|s| s.key.date == date).collect()
    }

    pub fn get(&self, key: &SlotKey) -> Option<&SlotOccupancy> {
        self.slots.iter().find(|s| &s.key == key)
    }
}

/// Read-only merge of staff assignments and self-service bookings.
#[derive(Debug, Clone)]
pub struct OccupancyAggregator {
    assignments: Arc<dyn AssignmentRepository>,
    bookings: Arc<dyn BookingRepository>,
}

impl OccupancyAggregator {
    pub fn new(assignments: Arc<dyn AssignmentRepository>, bookings: Arc<dyn BookingRepository>) -> Self {
        OccupancyAggregator { assignments, bookings }
    }

    /// Summary of every slot in one calendar month.
    pub fn aggregate_month(&self, year: i32, month: u32) -> Result<OccupancySummary> {
        let from = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| Error::InvalidDate(format!("{}-{:02} is not a calendar month", year, month)))?;
        let to = from
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or_else(|| Error::InvalidDate(format!("{}-{:02} has no last day", year, month)))?;

        self.aggregate_range(from, to)
    }

    pub fn aggregate_range(&self, from: NaiveDate, to: NaiveDate) -> Result<OccupancySummary> {
        if from > to {
            return Err(Error::InvalidDate(format!("range {} to {} is empty", from, to)));
        }

        let assignments = self.assignments.find_active(&AssignmentFilter::new().between(from, to))?;
        let bookings = self.bookings.find_active(from, to)?;

        let records = assignments
            .into_iter()
            .map(OccupancyRecord::Assignment)
            .chain(bookings.iter().flat_map(OccupancyRecord::from_booking))
            .filter(|record| {
                let date = record.occurrence().date;
                date >= from && date <= to
            });

        let summary = OccupancySummary { from, to, slots: aggregate_records(records) };

        tracing::info!(
            target: ANALYTICS_TARGET,
            From = %from,
            To = %to,
            Slots = summary.slots.len(),
            OverCapacity = summary.over_capacity().len(),
        );

        Ok(summary)
    }
}

/// Groups records by slot key in one pass.
pub fn aggregate_records(records: impl IntoIterator<Item = OccupancyRecord>) -> Vec<SlotOccupancy> {
    let mut slots: BTreeMap<SlotKey, SlotOccupancy> = BTreeMap::new();

    for record in records {
        let key = record.slot_key();
        let group_type = record.occurrence().group_type.capacity();

        let slot = slots.entry(key.clone()).or_insert_with(|| SlotOccupancy {
            key,
            occupancy: 0,
            capacity: group_type,
            status: StatusTier::Free,
            records: Vec::new(),
        });

        if slot.capacity != group_type {
            log::warn!(
                "Slot {} mixes group sizes {} and {}, keeping {}.",
                slot.key,
                slot.capacity,
                group_type,
                slot.capacity
            );
        }

        slot.occupancy += 1;
        slot.records.push(record);
    }

    slots
        .into_values()
        .map(|mut slot| {
            slot.status = StatusTier::from_occupancy(slot.occupancy, slot.capacity);
            if slot.is_over_capacity() {
                tracing::warn!(
                    target: ANALYTICS_TARGET,
                    Slot = %slot.key,
                    Occupancy = slot.occupancy,
                    Capacity = slot.capacity,
                    "over capacity"
                );
            }
            slot
        })
        .collect()
}
