use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::domain::assignment::assignment_store::{AssignmentFilter, AssignmentRepository};
use crate::domain::quota::completion_notifier::{CompletionNotifier, QuotaCompletionEvent};
use crate::domain::utils::id::{ProgramId, UserId};
use crate::error::{Error, Result};

/// Period a quota is measured over. A month is approximated as four weeks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuotaHorizon {
    Week,
    Month,
}

impl QuotaHorizon {
    pub fn weeks(&self) -> u32 {
        match self {
            QuotaHorizon::Week => 1,
            QuotaHorizon::Month => 4,
        }
    }
}

/// Progress of one program towards its required number of sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaStatus {
    pub current: u32,
    pub required: u32,
}

impl QuotaStatus {
    pub fn is_complete(&self) -> bool {
        self.current >= self.required
    }

    pub fn remaining(&self) -> u32 {
        self.required.saturating_sub(self.current)
    }

    pub fn message(&self) -> String {
        if self.current == 0 {
            format!("No assignments yet, {} required.", self.required)
        } else if !self.is_complete() {
            format!("{} of {} required assignments made, {} remaining.", self.current, self.required, self.remaining())
        } else {
            "All required assignments made, the member can be notified.".to_string()
        }
    }
}

/// Counts a program's active assignments against its weekly frequency and
/// raises the completion signal once per program.
#[derive(Debug, Clone)]
pub struct WeeklyQuotaTracker {
    assignments: Arc<dyn AssignmentRepository>,
    notifier: Arc<dyn CompletionNotifier>,

    /// Last completion state seen per program. Once `true` it is never reset,
    /// which keeps the signal from being raised a second time.
    completion_state: Arc<RwLock<HashMap<ProgramId, bool>>>,
}

impl WeeklyQuotaTracker {
    pub fn new(assignments: Arc<dyn AssignmentRepository>, notifier: Arc<dyn CompletionNotifier>) -> Self {
        WeeklyQuotaTracker { assignments, notifier, completion_state: Arc::new(RwLock::new(HashMap::new())) }
    }

    pub fn get_current_count(&self, user_id: &UserId, program_id: &ProgramId) -> Result<u32> {
        let filter = AssignmentFilter::new().for_user(user_id.clone()).for_program(program_id.clone());
        Ok(self.assignments.find_active(&filter)?.len() as u32)
    }

    pub fn get_required(weekly_frequency: u32, horizon: QuotaHorizon) -> u32 {
        weekly_frequency * horizon.weeks()
    }

    pub fn status(&self, user_id: &UserId, program_id: &ProgramId, weekly_frequency: u32, horizon: QuotaHorizon) -> Result<QuotaStatus> {
        Ok(QuotaStatus {
            current: self.get_current_count(user_id, program_id)?,
            required: Self::get_required(weekly_frequency, horizon),
        })
    }

    pub fn is_complete(&self, user_id: &UserId, program_id: &ProgramId, weekly_frequency: u32, horizon: QuotaHorizon) -> Result<bool> {
        Ok(self.status(user_id, program_id, weekly_frequency, horizon)?.is_complete())
    }

    /// Re-evaluates the program after a successful creation.
    ///
    /// # Returns
    /// `true` if this call observed the transition to complete and raised
    /// the completion signal; `false` otherwise, including every later call
    /// for an already completed program.
    pub fn on_assignment_created(
        &self,
        user_id: &UserId,
        program_id: &ProgramId,
        weekly_frequency: u32,
        horizon: QuotaHorizon,
    ) -> Result<bool> {
        let filter = AssignmentFilter::new().for_user(user_id.clone()).for_program(program_id.clone());

        // The lock is held across the read so two concurrent creations
        // cannot both see the transition.
        let mut state = self
            .completion_state
            .write()
            .map_err(|_| Error::PersistenceFailure("quota state lock poisoned".to_string()))?;

        if state.get(program_id).copied().unwrap_or(false) {
            return Ok(false);
        }

        let completed_assignments = self.assignments.find_active(&filter)?;
        let status =
            QuotaStatus { current: completed_assignments.len() as u32, required: Self::get_required(weekly_frequency, horizon) };

        state.insert(program_id.clone(), status.is_complete());

        if !status.is_complete() {
            log::debug!("Program {}: {}", program_id, status.message());
            return Ok(false);
        }

        tracing::info!(
            program_id = %program_id,
            user_id = %user_id,
            current = status.current,
            required = status.required,
            "quota complete"
        );

        let event = QuotaCompletionEvent { program_id: program_id.clone(), user_id: user_id.clone(), completed_assignments };
        self.notifier.on_quota_complete(&event);

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::assignment::assignment::{Assignment, SlotRef};
    use crate::domain::assignment::assignment_store::InMemoryAssignmentStore;
    use crate::domain::quota::completion_notifier::RecordingNotifier;
    use crate::domain::slot::occurrence::Occurrence;
    use crate::domain::slot::slot_template::{GroupType, TimeRange};
    use crate::domain::utils::id::AssignmentId;
    use chrono::{NaiveDate, NaiveTime};
    use tracing_test::traced_test;

    fn insert_session(store: &InMemoryAssignmentStore, day: u32) {
        let date = NaiveDate::from_ymd_opt(2025, 9, day).unwrap();
        let now = date.and_hms_opt(8, 0, 0).unwrap();

        store
            .insert(Assignment {
                id: AssignmentId::generate(),
                program_id: ProgramId::new("program-1"),
                user_id: UserId::new("member-1"),
                slot_ref: SlotRef::AdHoc,
                occurrence: Occurrence {
                    date,
                    time: TimeRange::new(NaiveTime::from_hms_opt(18, 0, 0).unwrap(), NaiveTime::from_hms_opt(19, 0, 0).unwrap())
                        .unwrap(),
                    trainer: "Mike".to_string(),
                    room: "Room A".to_string(),
                    group_type: GroupType::new(3).unwrap(),
                },
                weekly_frequency: 2,
                notes: None,
                is_active: true,
                created_by: None,
                created_at: now,
                updated_at: now,
            })
            .unwrap();
    }

    #[test]
    fn required_scales_with_horizon() {
        assert_eq!(WeeklyQuotaTracker::get_required(2, QuotaHorizon::Week), 2);
        assert_eq!(WeeklyQuotaTracker::get_required(2, QuotaHorizon::Month), 8);
    }

    #[test]
    fn status_messages_follow_progress() {
        assert_eq!(QuotaStatus { current: 0, required: 8 }.message(), "No assignments yet, 8 required.");
        assert_eq!(QuotaStatus { current: 3, required: 8 }.message(), "3 of 8 required assignments made, 5 remaining.");
        assert!(QuotaStatus { current: 9, required: 8 }.is_complete());
        assert_eq!(QuotaStatus { current: 9, required: 8 }.remaining(), 0);
    }

    #[test]
    #[traced_test]
    fn completion_fires_once_on_the_seven_to_eight_transition() {
        let store = InMemoryAssignmentStore::new();
        let notifier = RecordingNotifier::new();
        let tracker = WeeklyQuotaTracker::new(Arc::new(store.clone()), Arc::new(notifier.clone()));
        let user = UserId::new("member-1");
        let program = ProgramId::new("program-1");

        let mut fired_at = Vec::new();
        for day in 1..=10 {
            insert_session(&store, day);
            if tracker.on_assignment_created(&user, &program, 2, QuotaHorizon::Month).unwrap() {
                fired_at.push(day);
            }
        }

        assert_eq!(fired_at, vec![8]);
        let events = notifier.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].completed_assignments.len(), 8);
        assert!(logs_contain("quota complete"));
    }

    #[test]
    fn retrying_the_same_notification_is_a_no_op() {
        let store = InMemoryAssignmentStore::new();
        let notifier = RecordingNotifier::new();
        let tracker = WeeklyQuotaTracker::new(Arc::new(store.clone()), Arc::new(notifier.clone()));
        let user = UserId::new("member-1");
        let program = ProgramId::new("program-1");

        insert_session(&store, 1);
        insert_session(&store, 2);

        assert!(tracker.on_assignment_created(&user, &program, 2, QuotaHorizon::Week).unwrap());
        assert!(!tracker.on_assignment_created(&user, &program, 2, QuotaHorizon::Week).unwrap());
        assert_eq!(notifier.events().len(), 1);
    }
}
