use std::sync::Arc;

use crate::domain::assignment::assignment_store::{AssignmentFilter, AssignmentRepository};
use crate::domain::booking::booking_store::BookingRepository;
use crate::domain::capacity::validation::ValidationError;
use crate::domain::slot::occurrence::Occurrence;
use crate::domain::utils::id::AssignmentId;
use crate::error::Result;

pub const ANALYTICS_TARGET: &str = "schedule_analytics";

/// Result of a capacity check for one candidate occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityCheck {
    pub is_available: bool,

    /// Seats already taken by overlapping assignments and bookings in the same room.
    pub current_occupancy: u32,

    /// The candidate's own group size.
    pub max_capacity: u32,
}

impl CapacityCheck {
    /// Rejection reporting the occupancy as observed.
    pub fn rejection(&self, occurrence: &Occurrence) -> ValidationError {
        self.rejection_with_occupancy(occurrence, self.current_occupancy)
    }

    /// Rejection reporting the occupancy the slot would have with the candidate
    /// added (`current + 1`).
    pub fn rejection_including_candidate(&self, occurrence: &Occurrence) -> ValidationError {
        self.rejection_with_occupancy(occurrence, self.current_occupancy + 1)
    }

    fn rejection_with_occupancy(&self, occurrence: &Occurrence, occupancy: u32) -> ValidationError {
        ValidationError::CapacityExceeded {
            room: occurrence.room.clone(),
            date: occurrence.date,
            time: occurrence.time,
            occupancy,
            capacity: self.max_capacity,
        }
    }
}

/// A persisted seat that must not count against the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Exclusion<'a> {
    #[default]
    Nothing,

    /// The assignment being edited. Discounted only when it is one of the
    /// overlapping rows.
    Assignment(&'a AssignmentId),
}

/// What to do when the stores cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Hand the persistence error back to the caller.
    #[default]
    Propagate,

    /// Report the slot as unavailable. Only for callers that explicitly
    /// prefer refusing a write over surfacing the failure.
    TreatAsUnavailable,
}

/// Decides whether one more member fits into a concrete occurrence.
///
/// Occupancy is re-read from both stores on every call and never cached,
/// since the true occupancy is owned by the stores. Between this check and
/// the caller's write another writer may take the last seat; overshoot of
/// that kind shows up afterwards as an over-capacity slot in the occupancy
/// view.
#[derive(Debug, Clone)]
pub struct CapacityValidator {
    assignments: Arc<dyn AssignmentRepository>,
    bookings: Arc<dyn BookingRepository>,
}

impl CapacityValidator {
    pub fn new(assignments: Arc<dyn AssignmentRepository>, bookings: Arc<dyn BookingRepository>) -> Self {
        CapacityValidator { assignments, bookings }
    }

    /// Counts active assignments and booked seats in the same room on the
    /// same date whose time range overlaps the candidate's.
    ///
    /// An excluded assignment that is among the overlapping rows is not
    /// counted, so editing an assignment in place does not compete with
    /// itself. Other seats of the same member still count. Capacity is the
    /// candidate's own group type, not that of whatever is already in the room.
    pub fn check_capacity(&self, candidate: &Occurrence, exclusion: Exclusion<'_>) -> Result<CapacityCheck> {
        let filter = AssignmentFilter::new().on_date(candidate.date).in_room(candidate.room.clone());
        let assignments = self.assignments.find_active(&filter)?;
        let overlapping: Vec<_> = assignments.iter().filter(|a| a.occurrence.time.overlaps(&candidate.time)).collect();

        let booked_seats: u32 = self
            .bookings
            .find_active(candidate.date, candidate.date)?
            .iter()
            .filter(|b| b.occurrence.room == candidate.room && b.occurrence.time.overlaps(&candidate.time))
            .map(|b| b.seats())
            .sum();

        let counted = match exclusion {
            Exclusion::Nothing => overlapping.len(),
            Exclusion::Assignment(excluded) => overlapping.iter().filter(|a| &a.id != excluded).count(),
        };
        let current_occupancy = counted as u32 + booked_seats;

        let max_capacity = candidate.group_type.capacity();
        let is_available = current_occupancy < max_capacity;

        tracing::debug!(
            target: ANALYTICS_TARGET,
            Room = %candidate.room,
            Date = %candidate.date,
            Time = %candidate.time,
            Occupancy = current_occupancy,
            Capacity = max_capacity,
            Available = is_available,
            Exclusion = ?exclusion,
            "capacity check"
        );

        Ok(CapacityCheck { is_available, current_occupancy, max_capacity })
    }

    /// Like [`check_capacity`](Self::check_capacity) but lets the caller pick
    /// how a persistence failure is reported.
    pub fn check_capacity_with_policy(
        &self,
        candidate: &Occurrence,
        exclusion: Exclusion<'_>,
        policy: FailurePolicy,
    ) -> Result<CapacityCheck> {
        match self.check_capacity(candidate, exclusion) {
            Ok(check) => Ok(check),
            Err(err) if policy == FailurePolicy::TreatAsUnavailable => {
                log::error!(
                    "Capacity of {} on {} {} could not be read ({}), treating slot as unavailable.",
                    candidate.room,
                    candidate.date,
                    candidate.time,
                    err
                );

                let max_capacity = candidate.group_type.capacity();
                Ok(CapacityCheck { is_available: false, current_occupancy: max_capacity, max_capacity })
            }
            Err(err) => Err(err),
        }
    }
}
