use std::fmt;

use chrono::{NaiveDate, NaiveTime};

use crate::domain::assignment::assignment::Assignment;
use crate::domain::booking::booking::Booking;
use crate::domain::slot::occurrence::Occurrence;
use crate::domain::utils::id::UserId;

/// Where an occupancy record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordOrigin {
    StaffAssigned,
    SelfBooked,
}

impl fmt::Display for RecordOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordOrigin::StaffAssigned => write!(f, "staff-assigned"),
            RecordOrigin::SelfBooked => write!(f, "self-booked"),
        }
    }
}

/// One seat taken in a physical slot, either by an assignment or by one
/// participant of a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OccupancyRecord {
    Assignment(Assignment),
    Booking { booking: Booking, participant: UserId },
}

impl OccupancyRecord {
    /// One record per participant; a booking without participants yields none.
    pub fn from_booking(booking: &Booking) -> Vec<OccupancyRecord> {
        booking
            .participants
            .iter()
            .map(|participant| OccupancyRecord::Booking { booking: booking.clone(), participant: participant.clone() })
            .collect()
    }

    pub fn origin(&self) -> RecordOrigin {
        match self {
            OccupancyRecord::Assignment(_) => RecordOrigin::StaffAssigned,
            OccupancyRecord::Booking { .. } => RecordOrigin::SelfBooked,
        }
    }

    pub fn occurrence(&self) -> &Occurrence {
        match self {
            OccupancyRecord::Assignment(assignment) => &assignment.occurrence,
            OccupancyRecord::Booking { booking, .. } => &booking.occurrence,
        }
    }

    pub fn user_id(&self) -> &UserId {
        match self {
            OccupancyRecord::Assignment(assignment) => &assignment.user_id,
            OccupancyRecord::Booking { participant, .. } => participant,
        }
    }

    pub fn slot_key(&self) -> SlotKey {
        let occurrence = self.occurrence();
        SlotKey {
            date: occurrence.date,
            start: occurrence.time.start(),
            end: occurrence.time.end(),
            trainer: occurrence.trainer.clone(),
            room: occurrence.room.clone(),
        }
    }
}

/// Identity of one physical slot in the calendar view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotKey {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub trainer: String,
    pub room: String,
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}-{} {} ({})",
            self.date,
            self.start.format("%H:%M"),
            self.end.format("%H:%M"),
            self.room,
            self.trainer
        )
    }
}
