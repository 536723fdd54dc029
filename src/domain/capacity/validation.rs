use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use crate::domain::slot::slot_template::TimeRange;
use crate::domain::utils::id::{AssignmentId, GroupIdentifier, ProgramId, UserId};

/// Why a capacity-affecting request was turned down.
///
/// These are expected, recoverable outcomes returned inside
/// [`ValidationResult`] and [`AssignmentResult`], not `Err` values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Room {room} is full on {date} {time}: occupancy {occupancy}/{capacity}")]
    CapacityExceeded { room: String, date: NaiveDate, time: TimeRange, occupancy: u32, capacity: u32 },

    #[error("Member {user_id} already holds an active assignment in slot {group_identifier}")]
    DuplicateEnrollment { user_id: UserId, group_identifier: GroupIdentifier },

    #[error("Program {program_id} already has {current} of {required} required assignments")]
    QuotaAlreadyMet { program_id: ProgramId, current: u32, required: u32 },

    #[error("Start time {} must be before end time {}", .start.format("%H:%M"), .end.format("%H:%M"))]
    InvalidTimeRange { start: NaiveTime, end: NaiveTime },

    #[error("Group size {0} is not one of the supported capacity tiers")]
    UnsupportedGroupType(u32),

    #[error("Member {user_id} already has the maximum of {limit} sessions for this month")]
    DraftLimitReached { user_id: UserId, limit: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub error: Option<ValidationError>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        ValidationResult { is_valid: true, error: None }
    }

    pub fn rejected(error: ValidationError) -> Self {
        ValidationResult { is_valid: false, error: Some(error) }
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }
}

impl From<Result<(), ValidationError>> for ValidationResult {
    fn from(value: Result<(), ValidationError>) -> Self {
        match value {
            Ok(()) => ValidationResult::valid(),
            Err(error) => ValidationResult::rejected(error),
        }
    }
}

/// Outcome of an assignment creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentResult {
    pub success: bool,
    pub assignment_id: Option<AssignmentId>,
    pub message: String,
    pub error: Option<ValidationError>,
}

impl AssignmentResult {
    pub fn created(assignment_id: AssignmentId) -> Self {
        AssignmentResult {
            message: format!("Assignment {} created", assignment_id),
            success: true,
            assignment_id: Some(assignment_id),
            error: None,
        }
    }

    pub fn rejected(error: ValidationError) -> Self {
        AssignmentResult { success: false, assignment_id: None, message: error.to_string(), error: Some(error) }
    }
}
