use std::sync::Arc;

use chrono::{Datelike, NaiveDate};

use crate::domain::assignment::assignment::{Assignment, AssignmentRequest, SlotRef};
use crate::domain::assignment::assignment_store::{AssignmentFilter, AssignmentRepository};
use crate::domain::capacity::capacity_validator::{CapacityValidator, Exclusion};
use crate::domain::capacity::validation::{AssignmentResult, ValidationError, ValidationResult};
use crate::domain::clock::Clock;
use crate::domain::config::SchedulerConfig;
use crate::domain::quota::quota_tracker::{QuotaStatus, WeeklyQuotaTracker};
use crate::domain::slot::occurrence::OccurrenceField;
use crate::domain::slot::slot_template::SlotTemplate;
use crate::domain::slot::slot_template_registry::SlotTemplateRegistry;
use crate::domain::utils::id::{AssignmentId, GroupIdentifier, ProgramId, UserId};
use crate::error::{Error, Result};

/// A template's standing on one concrete date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotAvailability {
    pub template: SlotTemplate,
    pub date: NaiveDate,
    pub current_assignments: u32,
    pub max_capacity: u32,
    pub available_spots: u32,
    pub is_full: bool,
}

/// Creates, edits and removes member assignments.
///
/// Every capacity-affecting write is preceded by a fresh capacity check.
/// Removal needs none, it only frees capacity.
#[derive(Debug, Clone)]
pub struct AssignmentManager {
    assignments: Arc<dyn AssignmentRepository>,
    validator: CapacityValidator,
    registry: Arc<SlotTemplateRegistry>,
    quota_tracker: WeeklyQuotaTracker,
    config: Arc<SchedulerConfig>,
    clock: Arc<dyn Clock>,
}

impl AssignmentManager {
    pub fn new(
        assignments: Arc<dyn AssignmentRepository>,
        validator: CapacityValidator,
        registry: Arc<SlotTemplateRegistry>,
        quota_tracker: WeeklyQuotaTracker,
        config: Arc<SchedulerConfig>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        AssignmentManager { assignments, validator, registry, quota_tracker, config, clock }
    }

    pub fn registry(&self) -> &SlotTemplateRegistry {
        &self.registry
    }

    pub fn quota_tracker(&self) -> &WeeklyQuotaTracker {
        &self.quota_tracker
    }

    pub fn validator(&self) -> &CapacityValidator {
        &self.validator
    }

    /// Checks, in order: group size tier, capacity of the occurrence,
    /// duplicate enrollment in the same recurring slot and the program quota.
    ///
    /// Rejections come back as `Ok` with `is_valid == false`; only a store
    /// failure is an `Err`.
    pub fn validate_assignment(&self, request: &AssignmentRequest) -> Result<ValidationResult> {
        let occurrence = &request.occurrence;

        if !self.config.is_supported(occurrence.group_type) {
            return Ok(ValidationResult::rejected(ValidationError::UnsupportedGroupType(occurrence.group_type.capacity())));
        }

        if let SlotRef::Template(group_identifier) = &request.slot_ref {
            match self.registry.get(group_identifier) {
                Some(template) if template.day_of_week != occurrence.date.weekday() => {
                    log::warn!(
                        "Assignment for {} on {} ({}) does not fall on the template's weekday {}.",
                        group_identifier,
                        occurrence.date,
                        occurrence.date.weekday(),
                        template.day_of_week
                    );
                }
                Some(_) => {}
                None => log::warn!("Assignment references unknown slot template {}.", group_identifier),
            }
        }

        let check = self.validator.check_capacity(occurrence, Exclusion::Nothing)?;
        if !check.is_available {
            return Ok(ValidationResult::rejected(check.rejection(occurrence)));
        }

        if let SlotRef::Template(group_identifier) = &request.slot_ref {
            let filter = AssignmentFilter::new().for_user(request.user_id.clone()).for_slot(request.slot_ref.clone());
            if !self.assignments.find_active(&filter)?.is_empty() {
                return Ok(ValidationResult::rejected(ValidationError::DuplicateEnrollment {
                    user_id: request.user_id.clone(),
                    group_identifier: group_identifier.clone(),
                }));
            }
        }

        let quota = self.quota_tracker.status(
            &request.user_id,
            &request.program_id,
            request.weekly_frequency,
            self.config.quota_horizon,
        )?;
        if quota.is_complete() {
            return Ok(ValidationResult::rejected(ValidationError::QuotaAlreadyMet {
                program_id: request.program_id.clone(),
                current: quota.current,
                required: quota.required,
            }));
        }

        Ok(ValidationResult::valid())
    }

    /// Validates and, if admissible, persists a new assignment, then lets
    /// the quota tracker look at the program.
    ///
    /// Once the insert succeeded the result always carries the new id; a
    /// failing quota re-evaluation is only logged.
    pub fn create_assignment(&self, request: AssignmentRequest) -> Result<AssignmentResult> {
        let validation = self.validate_assignment(&request)?;

        if let Some(error) = validation.error {
            log::info!("Assignment of member {} refused: {}", request.user_id, error);
            return Ok(AssignmentResult::rejected(error));
        }

        let user_id = request.user_id.clone();
        let program_id = request.program_id.clone();
        let weekly_frequency = request.weekly_frequency;

        let assignment = request.into_assignment(AssignmentId::generate(), self.clock.now());
        log::info!(
            "Assigning member {} to {} {} in {} ({:?}).",
            assignment.user_id,
            assignment.occurrence.date,
            assignment.occurrence.time,
            assignment.occurrence.room,
            assignment.slot_ref
        );
        let assignment_id = self.assignments.insert(assignment)?;

        // The row is persisted at this point; a tracker failure must not hide its id.
        if let Err(err) =
            self.quota_tracker.on_assignment_created(&user_id, &program_id, weekly_frequency, self.config.quota_horizon)
        {
            log::error!("Assignment {} stored, but quota of program {} could not be re-evaluated: {}", assignment_id, program_id, err);
        }

        Ok(AssignmentResult::created(assignment_id))
    }

    /// Applies one field edit to an existing assignment.
    ///
    /// Capacity-affecting edits are checked against the edited occurrence
    /// with only this assignment's own seat discounted. On rejection the stored
    /// assignment is left untouched.
    pub fn update_assignment_field(&self, assignment_id: &AssignmentId, field: OccurrenceField) -> Result<ValidationResult> {
        let mut assignment =
            self.assignments.get(assignment_id)?.ok_or_else(|| Error::NotFound(format!("assignment {}", assignment_id)))?;

        if !assignment.is_active {
            return Err(Error::NotFound(format!("assignment {} was removed", assignment_id)));
        }

        let edited = match assignment.occurrence.edited(&field) {
            Ok(edited) => edited,
            Err(error) => return Ok(ValidationResult::rejected(error)),
        };

        if field.is_capacity_affecting() {
            if !self.config.is_supported(edited.group_type) {
                return Ok(ValidationResult::rejected(ValidationError::UnsupportedGroupType(edited.group_type.capacity())));
            }

            let check = self.validator.check_capacity(&edited, Exclusion::Assignment(&assignment.id))?;
            if !check.is_available {
                log::info!("Edit of {} on assignment {} refused, slot is full.", field.name(), assignment_id);
                return Ok(ValidationResult::rejected(check.rejection(&edited)));
            }
        }

        if let OccurrenceField::Notes(notes) = &field {
            assignment.notes = Some(notes.clone());
        }
        assignment.occurrence = edited;
        assignment.updated_at = self.clock.now();

        self.assignments.update(&assignment)?;
        log::debug!("Assignment {} field {} updated.", assignment_id, field.name());

        Ok(ValidationResult::valid())
    }

    /// Soft-deletes an assignment. Returns `false` if the id is unknown.
    pub fn remove_assignment(&self, assignment_id: &AssignmentId) -> Result<bool> {
        let removed = self.assignments.deactivate(assignment_id, self.clock.now())?;

        if removed {
            log::info!("Assignment {} removed.", assignment_id);
        } else {
            log::warn!("Removal of unknown assignment {} requested.", assignment_id);
        }

        Ok(removed)
    }

    /// Active assignments of a member, optionally for one program only,
    /// ordered by weekday (Sunday first) and start time.
    pub fn user_assignments(&self, user_id: &UserId, program_id: Option<&ProgramId>) -> Result<Vec<Assignment>> {
        let mut filter = AssignmentFilter::new().for_user(user_id.clone());
        if let Some(program_id) = program_id {
            filter = filter.for_program(program_id.clone());
        }

        let mut assignments = self.assignments.find_active(&filter)?;
        assignments.sort_by_key(|a| (a.day_of_week().num_days_from_sunday(), a.occurrence.time.start(), a.occurrence.date));

        Ok(assignments)
    }

    /// Active assignments of one recurring slot, oldest first.
    pub fn slot_assignments(&self, group_identifier: &GroupIdentifier) -> Result<Vec<Assignment>> {
        let filter = AssignmentFilter::new().for_slot(SlotRef::Template(group_identifier.clone()));
        self.assignments.find_active(&filter)
    }

    pub fn quota_status(&self, user_id: &UserId, program_id: &ProgramId, weekly_frequency: u32) -> Result<QuotaStatus> {
        self.quota_tracker.status(user_id, program_id, weekly_frequency, self.config.quota_horizon)
    }

    /// Every template held on the weekday of `date`, with its occupancy on that date.
    pub fn slot_availability(&self, date: NaiveDate) -> Result<Vec<SlotAvailability>> {
        let mut availability = Vec::new();

        for template in self.registry.templates_for_day(date.weekday()) {
            let check = self.validator.check_capacity(&template.occurrence_on(date), Exclusion::Nothing)?;
            let max_capacity = template.max_capacity();

            availability.push(SlotAvailability {
                template: template.clone(),
                date,
                current_assignments: check.current_occupancy,
                max_capacity,
                available_spots: max_capacity.saturating_sub(check.current_occupancy),
                is_full: check.current_occupancy >= max_capacity,
            });
        }

        Ok(availability)
    }
}
