use chrono::{NaiveDate, NaiveTime};

use crate::domain::capacity::validation::ValidationError;
use crate::domain::slot::slot_template::{GroupType, TimeRange};

/// The occupancy-relevant description of one concrete session:
/// where, when, with whom and for how many members.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Occurrence {
    pub date: NaiveDate,
    pub time: TimeRange,
    pub trainer: String,
    pub room: String,
    pub group_type: GroupType,
}

/// A single editable field of an assignment or draft, carrying its new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OccurrenceField {
    Date(NaiveDate),
    StartTime(NaiveTime),
    EndTime(NaiveTime),
    Room(String),
    GroupType(GroupType),
    Trainer(String),
    Notes(String),
}

impl OccurrenceField {
    /// Fields whose change can move a member into a different physical slot
    /// or change how many members that slot admits.
    pub fn is_capacity_affecting(&self) -> bool {
        matches!(
            self,
            OccurrenceField::Date(_)
                | OccurrenceField::StartTime(_)
                | OccurrenceField::EndTime(_)
                | OccurrenceField::Room(_)
                | OccurrenceField::GroupType(_)
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            OccurrenceField::Date(_) => "date",
            OccurrenceField::StartTime(_) => "startTime",
            OccurrenceField::EndTime(_) => "endTime",
            OccurrenceField::Room(_) => "room",
            OccurrenceField::GroupType(_) => "groupType",
            OccurrenceField::Trainer(_) => "trainer",
            OccurrenceField::Notes(_) => "notes",
        }
    }
}

impl Occurrence {
    /// Returns a copy of this occurrence with `field` applied.
    ///
    /// `Notes` is not part of the occurrence and leaves it unchanged.
    /// A time edit that would leave `start >= end` is rejected.
    pub fn edited(&self, field: &OccurrenceField) -> Result<Occurrence, ValidationError> {
        let mut edited = self.clone();

        match field {
            OccurrenceField::Date(date) => edited.date = *date,
            OccurrenceField::StartTime(start) => {
                edited.time = TimeRange::new(*start, self.time.end())
                    .ok_or(ValidationError::InvalidTimeRange { start: *start, end: self.time.end() })?;
            }
            OccurrenceField::EndTime(end) => {
                edited.time = TimeRange::new(self.time.start(), *end)
                    .ok_or(ValidationError::InvalidTimeRange { start: self.time.start(), end: *end })?;
            }
            OccurrenceField::Room(room) => edited.room = room.clone(),
            OccurrenceField::GroupType(group_type) => edited.group_type = *group_type,
            OccurrenceField::Trainer(trainer) => edited.trainer = trainer.clone(),
            OccurrenceField::Notes(_) => {}
        }

        Ok(edited)
    }
}
