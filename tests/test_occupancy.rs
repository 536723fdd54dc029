mod common;

use common::{booking, date, evening, hm, occurrence, setup_scheduler, wednesday};
use group_slot_scheduler::domain::assignment::assignment::AssignmentRequest;
use group_slot_scheduler::domain::occupancy::occupancy_aggregator::{aggregate_records, StatusTier};
use group_slot_scheduler::domain::occupancy::occupancy_record::{OccupancyRecord, RecordOrigin, SlotKey};
use group_slot_scheduler::domain::scheduler::Scheduler;
use group_slot_scheduler::domain::slot::occurrence::Occurrence;
use group_slot_scheduler::domain::slot::slot_template::GroupType;
use group_slot_scheduler::domain::utils::id::{BookingId, ProgramId, UserId};
use group_slot_scheduler::error::Error;

fn assign(scheduler: &Scheduler, user: &str, occurrence: Occurrence) {
    let request = AssignmentRequest::ad_hoc(occurrence, UserId::new(user), ProgramId::new(format!("prog-{}", user)), 2);
    assert!(scheduler.manager.create_assignment(request).unwrap().success);
}

fn evening_key() -> SlotKey {
    SlotKey { date: wednesday(), start: hm(18, 0), end: hm(19, 0), trainer: "Mike".to_string(), room: "Room A".to_string() }
}

#[test]
fn test_assignment_and_booking_merge_into_one_partial_slot() {
    let setup = setup_scheduler();
    let scheduler = &setup.scheduler;

    assign(scheduler, "ana", evening(wednesday()));
    scheduler.booking_store().add(booking("b-1", evening(wednesday()), &["cleo"])).unwrap();

    let summary = scheduler.aggregator.aggregate_month(2025, 9).unwrap();

    assert_eq!(summary.slots.len(), 1);
    let slot = summary.get(&evening_key()).unwrap();
    assert_eq!((slot.occupancy, slot.capacity, slot.status), (2, 3, StatusTier::Partial));

    let origins: Vec<(String, RecordOrigin)> = slot.records.iter().map(|r| (r.user_id().to_string(), r.origin())).collect();
    assert!(origins.contains(&("ana".to_string(), RecordOrigin::StaffAssigned)));
    assert!(origins.contains(&("cleo".to_string(), RecordOrigin::SelfBooked)));
}

#[test]
fn test_exactly_full_and_over_full_both_show_full() {
    let setup = setup_scheduler();
    let scheduler = &setup.scheduler;

    for user in ["ana", "ben", "cleo"] {
        assign(scheduler, user, evening(wednesday()));
    }
    let full = scheduler.aggregator.aggregate_month(2025, 9).unwrap();
    let slot = full.get(&evening_key()).unwrap();
    assert_eq!((slot.occupancy, slot.status, slot.is_over_capacity()), (3, StatusTier::Full, false));
    assert!(full.over_capacity().is_empty());

    // a self-service booking that slipped through the race window
    scheduler.booking_store().add(booking("b-late", evening(wednesday()), &["dan"])).unwrap();

    let over = scheduler.aggregator.aggregate_month(2025, 9).unwrap();
    let slot = over.get(&evening_key()).unwrap();
    assert_eq!((slot.occupancy, slot.status, slot.is_over_capacity()), (4, StatusTier::Full, true));
    assert_eq!(over.over_capacity().len(), 1);
}

#[test]
fn test_each_booking_participant_takes_a_seat() {
    let setup = setup_scheduler();
    let scheduler = &setup.scheduler;
    let pairs = occurrence(wednesday(), hm(7, 0), hm(8, 0), "Room Jordan", 6);

    scheduler.booking_store().add(booking("b-1", pairs.clone(), &["dan", "eve"])).unwrap();
    scheduler.booking_store().add(booking("b-2", pairs.clone(), &["fay"])).unwrap();
    scheduler.booking_store().add(booking("b-none", pairs, &[])).unwrap();

    let summary = scheduler.aggregator.aggregate_month(2025, 9).unwrap();

    assert_eq!(summary.slots.len(), 1);
    assert_eq!((summary.slots[0].occupancy, summary.slots[0].status), (3, StatusTier::Free));
}

#[test]
fn test_slots_differ_by_time_trainer_and_room() {
    let setup = setup_scheduler();
    let scheduler = &setup.scheduler;

    assign(scheduler, "ana", evening(wednesday()));
    assign(scheduler, "ben", occurrence(wednesday(), hm(18, 0), hm(19, 0), "Room B", 3));
    let mut with_jordan = evening(wednesday());
    with_jordan.trainer = "Jordan".to_string();
    scheduler.booking_store().add(booking("b-1", with_jordan, &["cleo"])).unwrap();

    let summary = scheduler.aggregator.aggregate_month(2025, 9).unwrap();

    assert_eq!(summary.slots_on(wednesday()).len(), 3);
    assert!(summary.slots.iter().all(|s| s.occupancy == 1 && s.status == StatusTier::Free));
}

#[test]
fn test_month_boundaries_do_not_leak() {
    let setup = setup_scheduler();
    let scheduler = &setup.scheduler;

    assign(scheduler, "ana", evening(date(2025, 8, 31)));
    assign(scheduler, "ana", evening(date(2025, 9, 1)));
    assign(scheduler, "ana", evening(date(2025, 9, 30)));
    assign(scheduler, "ana", evening(date(2025, 10, 1)));
    scheduler.booking_store().add(booking("b-oct", evening(date(2025, 10, 1)), &["cleo"])).unwrap();

    let september = scheduler.aggregator.aggregate_month(2025, 9).unwrap();
    let dates: Vec<_> = september.slots.iter().map(|s| s.key.date).collect();
    assert_eq!(dates, vec![date(2025, 9, 1), date(2025, 9, 30)]);
    assert_eq!((september.from, september.to), (date(2025, 9, 1), date(2025, 9, 30)));

    let october = scheduler.aggregator.aggregate_month(2025, 10).unwrap();
    assert_eq!(october.slots.len(), 1);
    assert_eq!(october.slots[0].occupancy, 2);
}

#[test]
fn test_removed_assignments_and_cancelled_bookings_are_ignored() {
    let setup = setup_scheduler();
    let scheduler = &setup.scheduler;

    let request = AssignmentRequest::ad_hoc(evening(wednesday()), UserId::new("ana"), ProgramId::new("prog-ana"), 2);
    let id = scheduler.manager.create_assignment(request).unwrap().assignment_id.unwrap();
    scheduler.manager.remove_assignment(&id).unwrap();
    scheduler.booking_store().add(booking("b-1", evening(wednesday()), &["cleo"])).unwrap();
    scheduler.booking_store().cancel(&BookingId::new("b-1")).unwrap();

    assert!(scheduler.aggregator.aggregate_month(2025, 9).unwrap().slots.is_empty());
}

#[test]
fn test_invalid_month_is_an_error() {
    let setup = setup_scheduler();
    assert!(matches!(setup.scheduler.aggregator.aggregate_month(2025, 13), Err(Error::InvalidDate(_))));
    assert!(matches!(
        setup.scheduler.aggregator.aggregate_range(date(2025, 9, 30), date(2025, 9, 1)),
        Err(Error::InvalidDate(_))
    ));
}

#[test]
fn test_mixed_group_sizes_keep_the_first_seen() {
    let mut small = evening(wednesday());
    small.group_type = GroupType::new(2).unwrap();

    let records = vec![
        OccupancyRecord::from_booking(&booking("b-1", small, &["ana"])),
        OccupancyRecord::from_booking(&booking("b-2", evening(wednesday()), &["ben"])),
    ]
    .into_iter()
    .flatten();

    let slots = aggregate_records(records);

    assert_eq!(slots.len(), 1);
    assert_eq!((slots[0].occupancy, slots[0].capacity, slots[0].status), (2, 2, StatusTier::Full));
}
