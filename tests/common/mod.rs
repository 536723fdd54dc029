#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use group_slot_scheduler::domain::assignment::assignment::Assignment;
use group_slot_scheduler::domain::assignment::assignment_store::{AssignmentFilter, AssignmentRepository, InMemoryAssignmentStore};
use group_slot_scheduler::domain::booking::booking::Booking;
use group_slot_scheduler::domain::booking::booking_store::BookingRepository;
use group_slot_scheduler::domain::clock::FixedClock;
use group_slot_scheduler::domain::config::SchedulerConfig;
use group_slot_scheduler::domain::quota::completion_notifier::RecordingNotifier;
use group_slot_scheduler::domain::scheduler::Scheduler;
use group_slot_scheduler::domain::slot::occurrence::Occurrence;
use group_slot_scheduler::domain::slot::slot_template::{GroupType, SlotTemplate, TimeRange};
use group_slot_scheduler::domain::utils::id::{AssignmentId, BookingId, GroupIdentifier, UserId};
use group_slot_scheduler::error::{Error, Result};

pub const WEDNESDAY_TEMPLATE: &str = "wed-evening-mike";

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

/// Wednesday 2025-09-24, the date most scenarios play on.
pub fn wednesday() -> NaiveDate {
    date(2025, 9, 24)
}

pub fn occurrence(on: NaiveDate, start: NaiveTime, end: NaiveTime, room: &str, group_type: u32) -> Occurrence {
    Occurrence {
        date: on,
        time: TimeRange::new(start, end).unwrap(),
        trainer: "Mike".to_string(),
        room: room.to_string(),
        group_type: GroupType::new(group_type).unwrap(),
    }
}

pub fn evening(on: NaiveDate) -> Occurrence {
    occurrence(on, hm(18, 0), hm(19, 0), "Room A", 3)
}

pub fn booking(id: &str, occurrence: Occurrence, participants: &[&str]) -> Booking {
    Booking {
        id: BookingId::new(id),
        occurrence,
        participants: participants.iter().map(|p| UserId::new(*p)).collect(),
        is_active: true,
    }
}

/// Default configuration plus one Wednesday evening template in Room A.
pub fn test_config() -> SchedulerConfig {
    let mut config = SchedulerConfig::default();
    config.slot_templates.push(SlotTemplate {
        group_identifier: GroupIdentifier::new(WEDNESDAY_TEMPLATE),
        day_of_week: Weekday::Wed,
        time: TimeRange::new(hm(18, 0), hm(19, 0)).unwrap(),
        trainer: "Mike".to_string(),
        room: "Room A".to_string(),
        group_type: GroupType::new(3).unwrap(),
        max_capacity: None,
    });
    config
}

pub struct TestScheduler {
    pub scheduler: Scheduler,
    pub clock: FixedClock,
    pub notifier: RecordingNotifier,
}

pub fn setup_scheduler() -> TestScheduler {
    let clock = FixedClock::at_date(date(2025, 9, 1));
    let notifier = RecordingNotifier::new();
    let scheduler = Scheduler::in_memory(test_config(), Arc::new(clock.clone()), Arc::new(notifier.clone())).unwrap();

    TestScheduler { scheduler, clock, notifier }
}

/// Assignment store whose every call fails, as an unreachable database would.
#[derive(Debug, Default)]
pub struct FailingAssignmentStore;

fn unreachable_store() -> Error {
    Error::PersistenceFailure("assignment store unreachable".to_string())
}

impl AssignmentRepository for FailingAssignmentStore {
    fn find_active(&self, _filter: &AssignmentFilter) -> Result<Vec<Assignment>> {
        Err(unreachable_store())
    }

    fn get(&self, _id: &AssignmentId) -> Result<Option<Assignment>> {
        Err(unreachable_store())
    }

    fn insert(&self, _assignment: Assignment) -> Result<AssignmentId> {
        Err(unreachable_store())
    }

    fn update(&self, _assignment: &Assignment) -> Result<()> {
        Err(unreachable_store())
    }

    fn deactivate(&self, _id: &AssignmentId, _at: NaiveDateTime) -> Result<bool> {
        Err(unreachable_store())
    }
}

/// Accepts the first insert, then fails every read.
#[derive(Debug, Default)]
pub struct ReadFailsAfterInsertStore {
    pub inner: InMemoryAssignmentStore,
    inserted: AtomicBool,
}

impl ReadFailsAfterInsertStore {
    fn guard_read(&self) -> Result<()> {
        if self.inserted.load(Ordering::SeqCst) {
            return Err(unreachable_store());
        }
        Ok(())
    }
}

impl AssignmentRepository for ReadFailsAfterInsertStore {
    fn find_active(&self, filter: &AssignmentFilter) -> Result<Vec<Assignment>> {
        self.guard_read()?;
        self.inner.find_active(filter)
    }

    fn get(&self, id: &AssignmentId) -> Result<Option<Assignment>> {
        self.guard_read()?;
        self.inner.get(id)
    }

    fn insert(&self, assignment: Assignment) -> Result<AssignmentId> {
        let id = self.inner.insert(assignment)?;
        self.inserted.store(true, Ordering::SeqCst);
        Ok(id)
    }

    fn update(&self, assignment: &Assignment) -> Result<()> {
        self.inner.update(assignment)
    }

    fn deactivate(&self, id: &AssignmentId, at: NaiveDateTime) -> Result<bool> {
        self.inner.deactivate(id, at)
    }
}

#[derive(Debug, Default)]
pub struct FailingBookingStore;

impl BookingRepository for FailingBookingStore {
    fn find_active(&self, _from: NaiveDate, _to: NaiveDate) -> Result<Vec<Booking>> {
        Err(Error::PersistenceFailure("booking store unreachable".to_string()))
    }
}
