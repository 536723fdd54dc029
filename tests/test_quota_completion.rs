mod common;

use common::{date, evening, setup_scheduler};
use group_slot_scheduler::domain::assignment::assignment::AssignmentRequest;
use group_slot_scheduler::domain::capacity::validation::ValidationError;
use group_slot_scheduler::domain::quota::quota_tracker::QuotaHorizon;
use group_slot_scheduler::domain::utils::id::{AssignmentId, ProgramId, UserId};

const SEPTEMBER_SESSIONS: [u32; 9] = [1, 3, 8, 10, 15, 17, 22, 24, 29];

fn request(day: u32) -> AssignmentRequest {
    AssignmentRequest::ad_hoc(evening(date(2025, 9, day)), UserId::new("ana"), ProgramId::new("prog-ana"), 2)
}

#[test]
fn test_completion_fires_once_on_the_eighth_of_eight() {
    let setup = setup_scheduler();
    let manager = &setup.scheduler.manager;

    for (count, day) in SEPTEMBER_SESSIONS[..8].iter().enumerate() {
        assert!(manager.create_assignment(request(*day)).unwrap().success);

        let expected_events = if count + 1 < 8 { 0 } else { 1 };
        assert_eq!(setup.notifier.events().len(), expected_events, "after {} assignments", count + 1);
    }

    let events = setup.notifier.events();
    assert_eq!(events[0].program_id, ProgramId::new("prog-ana"));
    assert_eq!(events[0].user_id, UserId::new("ana"));
    assert_eq!(events[0].completed_assignments.len(), 8);
}

#[test]
fn test_ninth_assignment_is_refused_and_nothing_refires() {
    let setup = setup_scheduler();
    let manager = &setup.scheduler.manager;

    for day in &SEPTEMBER_SESSIONS[..8] {
        assert!(manager.create_assignment(request(*day)).unwrap().success);
    }

    let result = manager.create_assignment(request(SEPTEMBER_SESSIONS[8])).unwrap();

    assert!(matches!(result.error, Some(ValidationError::QuotaAlreadyMet { current: 8, required: 8, .. })));
    assert_eq!(setup.notifier.events().len(), 1);
}

#[test]
fn test_refilling_after_removal_does_not_refire() {
    let setup = setup_scheduler();
    let manager = &setup.scheduler.manager;

    let mut ids: Vec<AssignmentId> = Vec::new();
    for day in &SEPTEMBER_SESSIONS[..8] {
        ids.push(manager.create_assignment(request(*day)).unwrap().assignment_id.unwrap());
    }
    assert!(manager.remove_assignment(&ids[0]).unwrap());

    let status = manager.quota_status(&UserId::new("ana"), &ProgramId::new("prog-ana"), 2).unwrap();
    assert_eq!((status.current, status.required), (7, 8));
    assert_eq!(status.message(), "7 of 8 required assignments made, 1 remaining.");

    assert!(manager.create_assignment(request(SEPTEMBER_SESSIONS[8])).unwrap().success);
    assert_eq!(setup.notifier.events().len(), 1);
}

#[test]
fn test_programs_are_tracked_independently() {
    let setup = setup_scheduler();
    let manager = &setup.scheduler.manager;
    let tracker = manager.quota_tracker();

    for day in &SEPTEMBER_SESSIONS[..8] {
        assert!(manager.create_assignment(request(*day)).unwrap().success);
    }

    let other = AssignmentRequest::ad_hoc(evening(date(2025, 9, 1)), UserId::new("ana"), ProgramId::new("prog-ana-rehab"), 1);
    assert!(manager.create_assignment(other).unwrap().success);

    let rehab = ProgramId::new("prog-ana-rehab");
    assert_eq!(tracker.get_current_count(&UserId::new("ana"), &rehab).unwrap(), 1);
    assert!(tracker.is_complete(&UserId::new("ana"), &rehab, 1, QuotaHorizon::Week).unwrap());
    assert!(!tracker.is_complete(&UserId::new("ana"), &rehab, 1, QuotaHorizon::Month).unwrap());
    assert_eq!(setup.notifier.events().len(), 1);
}
