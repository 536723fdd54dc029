use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::api::scenario_dto::{AssignmentDto, BookingDto, ScenarioDto};
use crate::domain::assignment::assignment::{Assignment, SlotRef};
use crate::domain::assignment::assignment_manager::AssignmentManager;
use crate::domain::assignment::assignment_store::{AssignmentRepository, InMemoryAssignmentStore};
use crate::domain::booking::booking::Booking;
use crate::domain::booking::booking_store::{BookingRepository, InMemoryBookingStore};
use crate::domain::bulk::bulk_orchestrator::BulkAssignmentOrchestrator;
use crate::domain::capacity::capacity_validator::CapacityValidator;
use crate::domain::clock::Clock;
use crate::domain::config::SchedulerConfig;
use crate::domain::occupancy::occupancy_aggregator::OccupancyAggregator;
use crate::domain::quota::completion_notifier::CompletionNotifier;
use crate::domain::quota::quota_tracker::WeeklyQuotaTracker;
use crate::domain::slot::occurrence::Occurrence;
use crate::domain::slot::slot_template::{GroupType, TimeRange};
use crate::domain::utils::id::{AssignmentId, BookingId, GroupIdentifier, ProgramId, UserId};
use crate::error::{Error, Result};
use crate::loader::parser::{parse_json_file, parse_time_of_day};

/// All components wired over one pair of stores.
#[derive(Debug, Clone)]
pub struct Scheduler {
    pub config: Arc<SchedulerConfig>,
    pub manager: AssignmentManager,
    pub aggregator: OccupancyAggregator,
    clock: Arc<dyn Clock>,
    assignment_store: InMemoryAssignmentStore,
    booking_store: InMemoryBookingStore,
}

impl Scheduler {
    /// Scheduler over fresh in-memory stores.
    pub fn in_memory(config: SchedulerConfig, clock: Arc<dyn Clock>, notifier: Arc<dyn CompletionNotifier>) -> Result<Self> {
        let registry = Arc::new(config.build_registry()?);
        let config = Arc::new(config);

        let assignment_store = InMemoryAssignmentStore::new();
        let booking_store = InMemoryBookingStore::new();
        let assignments: Arc<dyn AssignmentRepository> = Arc::new(assignment_store.clone());
        let bookings: Arc<dyn BookingRepository> = Arc::new(booking_store.clone());

        let validator = CapacityValidator::new(assignments.clone(), bookings.clone());
        let quota_tracker = WeeklyQuotaTracker::new(assignments.clone(), notifier);
        let manager =
            AssignmentManager::new(assignments.clone(), validator, registry.clone(), quota_tracker, config.clone(), clock.clone());
        let aggregator = OccupancyAggregator::new(assignments, bookings);

        log::info!("Scheduler ready with {} slot templates.", registry.len());

        Ok(Scheduler { config, manager, aggregator, clock, assignment_store, booking_store })
    }

    pub fn assignment_store(&self) -> &InMemoryAssignmentStore {
        &self.assignment_store
    }

    pub fn booking_store(&self) -> &InMemoryBookingStore {
        &self.booking_store
    }

    /// A new bulk batch sharing this scheduler's stores and configuration.
    pub fn bulk_orchestrator(&self) -> BulkAssignmentOrchestrator {
        BulkAssignmentOrchestrator::new(self.manager.validator().clone(), self.config.clone(), self.clock.clone())
    }

    pub fn import_scenario_file(&self, file_path: impl AsRef<Path>) -> Result<()> {
        let dto: ScenarioDto = parse_json_file(file_path)?;
        self.import_scenario(dto)
    }

    /// Loads recorded assignments and bookings as they are.
    ///
    /// Nothing is validated against capacity, so an over-full month shows up
    /// in the occupancy view exactly as recorded.
    pub fn import_scenario(&self, scenario: ScenarioDto) -> Result<()> {
        let assignment_count = scenario.assignments.len();
        let booking_count = scenario.bookings.len();

        for dto in scenario.assignments {
            let assignment = self.assignment_from_dto(dto)?;
            self.assignment_store.insert(assignment)?;
        }

        for dto in scenario.bookings {
            self.booking_store.add(Booking::try_from(dto)?)?;
        }

        log::info!("Scenario imported: {} assignments, {} bookings.", assignment_count, booking_count);

        Ok(())
    }

    fn assignment_from_dto(&self, dto: AssignmentDto) -> Result<Assignment> {
        let occurrence =
            occurrence_from_parts(dto.assignment_date, &dto.start_time, &dto.end_time, dto.trainer, dto.room, dto.group_type)?;
        let created_at = dto.created_at.unwrap_or_else(|| self.clock.now());

        Ok(Assignment {
            id: dto.id.map(AssignmentId::new).unwrap_or_else(AssignmentId::generate),
            program_id: ProgramId::new(dto.program_id),
            user_id: UserId::new(dto.user_id),
            slot_ref: dto.group_identifier.map(|g| SlotRef::Template(GroupIdentifier::new(g))).unwrap_or(SlotRef::AdHoc),
            occurrence,
            weekly_frequency: dto.weekly_frequency,
            notes: dto.notes,
            is_active: dto.is_active,
            created_by: dto.created_by.map(UserId::new),
            created_at,
            updated_at: created_at,
        })
    }
}

impl TryFrom<BookingDto> for Booking {
    type Error = Error;

    fn try_from(dto: BookingDto) -> Result<Self> {
        Ok(Booking {
            id: BookingId::new(dto.id),
            occurrence: occurrence_from_parts(dto.session_date, &dto.start_time, &dto.end_time, dto.trainer, dto.room, dto.group_type)?,
            participants: dto.participants.into_iter().map(UserId::new).collect(),
            is_active: dto.is_active,
        })
    }
}

fn occurrence_from_parts(
    date: NaiveDate,
    start_time: &str,
    end_time: &str,
    trainer: String,
    room: String,
    group_type: u32,
) -> Result<Occurrence> {
    let time = TimeRange::new(parse_time_of_day(start_time)?, parse_time_of_day(end_time)?)
        .ok_or_else(|| Error::InvalidSlot(format!("session on {} starts at {} but ends at {}", date, start_time, end_time)))?;

    Ok(Occurrence { date, time, trainer, room, group_type: GroupType::new(group_type)? })
}
