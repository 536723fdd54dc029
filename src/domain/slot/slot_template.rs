use std::fmt;

use chrono::{NaiveDate, NaiveTime, Weekday};

use crate::domain::slot::occurrence::Occurrence;
use crate::domain::utils::id::GroupIdentifier;
use crate::error::{Error, Result};

/// Number of members a group session is sized for. Doubles as the
/// capacity of the physical slot unless a template overrides it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupType(u32);

impl GroupType {
    pub fn new(size: u32) -> Result<Self> {
        if size == 0 {
            return Err(Error::InvalidSlot("group type must hold at least one member".to_string()));
        }

        Ok(GroupType(size))
    }

    pub fn capacity(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for GroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Half-open time-of-day interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeRange {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeRange {
    /// Returns `None` unless `start < end`.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Option<Self> {
        (start < end).then_some(TimeRange { start, end })
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

/// Recurring weekly definition of a group session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotTemplate {
    pub group_identifier: GroupIdentifier,
    pub day_of_week: Weekday,
    pub time: TimeRange,
    pub trainer: String,
    pub room: String,
    pub group_type: GroupType,

    /// Overrides the capacity derived from `group_type` when set.
    pub max_capacity: Option<u32>,
}

impl SlotTemplate {
    pub fn max_capacity(&self) -> u32 {
        self.max_capacity.unwrap_or(self.group_type.capacity())
    }

    /// The concrete occurrence of this template on `date`.
    ///
    /// The weekday of `date` is not checked here; callers that build
    /// assignments from templates log a mismatch instead of rejecting it.
    pub fn occurrence_on(&self, date: NaiveDate) -> Occurrence {
        Occurrence {
            date,
            time: self.time,
            trainer: self.trainer.clone(),
            room: self.room.clone(),
            group_type: self.group_type,
        }
    }
}

/// Day of week as stored by the console: `0 = Sunday` up to `6 = Saturday`.
pub fn weekday_from_index(index: u8) -> Result<Weekday> {
    match index {
        0 => Ok(Weekday::Sun),
        1 => Ok(Weekday::Mon),
        2 => Ok(Weekday::Tue),
        3 => Ok(Weekday::Wed),
        4 => Ok(Weekday::Thu),
        5 => Ok(Weekday::Fri),
        6 => Ok(Weekday::Sat),
        other => Err(Error::InvalidSlot(format!("day of week {} is outside 0..=6", other))),
    }
}
