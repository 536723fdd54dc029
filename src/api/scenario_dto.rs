use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A recorded set of assignments and bookings, used to seed the in-memory
/// stores (e.g. for the command line or for replaying a month).
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ScenarioDto {
    pub assignments: Vec<AssignmentDto>,
    pub bookings: Vec<BookingDto>,
}

fn active_by_default() -> bool {
    true
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentDto {
    pub id: Option<String>,
    pub program_id: String,
    pub user_id: String,

    /// Absent for ad-hoc occurrences.
    pub group_identifier: Option<String>,
    pub assignment_date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub trainer: String,
    pub room: String,
    pub group_type: u32,
    pub weekly_frequency: u32,
    pub notes: Option<String>,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
    pub created_by: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BookingDto {
    pub id: String,
    pub session_date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub trainer: String,
    pub room: String,
    pub group_type: u32,
    pub participants: Vec<String>,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}
