use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};

use crate::domain::slot::occurrence::Occurrence;
use crate::domain::slot::slot_template::SlotTemplate;
use crate::domain::utils::id::{AssignmentId, GroupIdentifier, ProgramId, UserId};

/// What an assignment was created from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SlotRef {
    /// One occurrence of a recurring slot template.
    Template(GroupIdentifier),

    /// A free-standing occurrence with no template behind it.
    AdHoc,
}

impl SlotRef {
    pub fn group_identifier(&self) -> Option<&GroupIdentifier> {
        match self {
            SlotRef::Template(group_identifier) => Some(group_identifier),
            SlotRef::AdHoc => None,
        }
    }
}

/// A member bound to one concrete date-occurrence of a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub id: AssignmentId,
    pub program_id: ProgramId,
    pub user_id: UserId,
    pub slot_ref: SlotRef,
    pub occurrence: Occurrence,

    /// Target number of sessions per week of the member's program.
    pub weekly_frequency: u32,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_by: Option<UserId>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Assignment {
    pub fn day_of_week(&self) -> Weekday {
        self.occurrence.date.weekday()
    }

    pub fn assignment_date(&self) -> NaiveDate {
        self.occurrence.date
    }
}

/// Everything needed to create an assignment; validated before anything is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentRequest {
    pub user_id: UserId,
    pub program_id: ProgramId,
    pub slot_ref: SlotRef,
    pub occurrence: Occurrence,
    pub weekly_frequency: u32,
    pub notes: Option<String>,
    pub created_by: Option<UserId>,
}

impl AssignmentRequest {
    /// Request for the occurrence of `template` on `date`, taking time,
    /// trainer, room and group size from the template.
    pub fn for_template(template: &SlotTemplate, date: NaiveDate, user_id: UserId, program_id: ProgramId, weekly_frequency: u32) -> Self {
        AssignmentRequest {
            user_id,
            program_id,
            slot_ref: SlotRef::Template(template.group_identifier.clone()),
            occurrence: template.occurrence_on(date),
            weekly_frequency,
            notes: None,
            created_by: None,
        }
    }

    pub fn ad_hoc(occurrence: Occurrence, user_id: UserId, program_id: ProgramId, weekly_frequency: u32) -> Self {
        AssignmentRequest {
            user_id,
            program_id,
            slot_ref: SlotRef::AdHoc,
            occurrence,
            weekly_frequency,
            notes: None,
            created_by: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn created_by(mut self, staff: UserId) -> Self {
        self.created_by = Some(staff);
        self
    }

    pub(crate) fn into_assignment(self, id: AssignmentId, now: NaiveDateTime) -> Assignment {
        Assignment {
            id,
            program_id: self.program_id,
            user_id: self.user_id,
            slot_ref: self.slot_ref,
            occurrence: self.occurrence,
            weekly_frequency: self.weekly_frequency,
            notes: self.notes,
            is_active: true,
            created_by: self.created_by,
            created_at: now,
            updated_at: now,
        }
    }
}
