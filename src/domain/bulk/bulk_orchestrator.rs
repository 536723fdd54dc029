use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use crate::domain::assignment::assignment::AssignmentRequest;
use crate::domain::assignment::assignment_manager::AssignmentManager;
use crate::domain::bulk::draft::{BulkKey, Draft};
use crate::domain::capacity::capacity_validator::{CapacityValidator, Exclusion};
use crate::domain::capacity::validation::{AssignmentResult, ValidationError, ValidationResult};
use crate::domain::clock::Clock;
use crate::domain::config::SchedulerConfig;
use crate::domain::quota::quota_tracker::{QuotaHorizon, WeeklyQuotaTracker};
use crate::domain::slot::occurrence::OccurrenceField;
use crate::domain::slot::slot_template::GroupType;
use crate::domain::utils::id::{DraftId, ProgramId, UserId};
use crate::error::{Error, Result};

/// Outcome of committing one draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftCommit {
    pub user_id: UserId,
    pub draft_id: DraftId,
    pub result: AssignmentResult,
}

/// Prepares a month of sessions for several members at once.
///
/// Drafts are validated against persisted occupancy only; other drafts of
/// the same batch do not count until they are committed.
#[derive(Debug)]
pub struct BulkAssignmentOrchestrator {
    validator: CapacityValidator,
    config: Arc<SchedulerConfig>,
    clock: Arc<dyn Clock>,
    key: Option<BulkKey>,
    drafts: BTreeMap<UserId, Vec<Draft>>,
}

impl BulkAssignmentOrchestrator {
    pub fn new(validator: CapacityValidator, config: Arc<SchedulerConfig>, clock: Arc<dyn Clock>) -> Self {
        BulkAssignmentOrchestrator { validator, config, clock, key: None, drafts: BTreeMap::new() }
    }

    /// Generates `weekly_frequency * 4` drafts per member on today's date with
    /// the configured default trainer, room and time. No capacity is checked.
    ///
    /// Calling it again with the same members, frequency and group size
    /// leaves the current drafts, including edits, untouched.
    pub fn initialize(
        &mut self,
        user_ids: impl IntoIterator<Item = UserId>,
        weekly_frequency: u32,
        default_group_type: GroupType,
    ) -> &BTreeMap<UserId, Vec<Draft>> {
        let key = BulkKey::new(user_ids, weekly_frequency, default_group_type);

        if self.key.as_ref() == Some(&key) {
            log::debug!("Bulk batch for {} members unchanged, keeping drafts.", key.user_ids.len());
            return &self.drafts;
        }

        let today = self.clock.today();
        let target = WeeklyQuotaTracker::get_required(weekly_frequency, QuotaHorizon::Month) as usize;

        self.drafts = key
            .user_ids
            .iter()
            .map(|user_id| {
                let drafts =
                    (0..target).map(|_| Draft::new(self.config.default_occurrence(today, default_group_type))).collect();
                (user_id.clone(), drafts)
            })
            .collect();

        log::info!("Bulk batch initialized: {} members with {} drafts each.", key.user_ids.len(), target);
        self.key = Some(key);

        &self.drafts
    }

    /// Sessions every member of the batch needs, zero before initialization.
    pub fn monthly_target(&self) -> usize {
        self.key
            .as_ref()
            .map(|key| WeeklyQuotaTracker::get_required(key.weekly_frequency, QuotaHorizon::Month) as usize)
            .unwrap_or(0)
    }

    pub fn drafts(&self) -> &BTreeMap<UserId, Vec<Draft>> {
        &self.drafts
    }

    pub fn drafts_for(&self, user_id: &UserId) -> Option<&[Draft]> {
        self.drafts.get(user_id).map(Vec::as_slice)
    }

    /// Edits one field of a draft. A capacity-affecting edit is dropped if
    /// the slot is full. A draft holds no persisted seat, so nothing is
    /// discounted, and seats the member already holds elsewhere still count.
    pub fn update_draft_field(&mut self, user_id: &UserId, draft_id: &DraftId, field: OccurrenceField) -> Result<ValidationResult> {
        let draft = self
            .drafts
            .get(user_id)
            .and_then(|drafts| drafts.iter().find(|d| &d.id == draft_id))
            .ok_or_else(|| Error::NotFound(format!("draft {} of member {}", draft_id, user_id)))?;

        let edited = match draft.occurrence.edited(&field) {
            Ok(edited) => edited,
            Err(error) => return Ok(ValidationResult::rejected(error)),
        };

        if field.is_capacity_affecting() {
            if !self.config.is_supported(edited.group_type) {
                return Ok(ValidationResult::rejected(ValidationError::UnsupportedGroupType(edited.group_type.capacity())));
            }

            let check = self.validator.check_capacity(&edited, Exclusion::Nothing)?;
            if !check.is_available {
                log::info!("Draft {} of member {}: {} edit refused.", draft_id, user_id, field.name());
                return Ok(ValidationResult::rejected(check.rejection_including_candidate(&edited)));
            }
        }

        if let Some(draft) = self.draft_mut(user_id, draft_id) {
            if let OccurrenceField::Notes(notes) = &field {
                draft.notes = notes.clone();
            }
            draft.occurrence = edited;
        }

        Ok(ValidationResult::valid())
    }

    /// Appends a draft with the batch defaults, unless the member already has
    /// a full month or the default slot is full.
    pub fn add_draft(&mut self, user_id: &UserId) -> Result<ValidationResult> {
        let target = self.monthly_target();
        let key = self.key.as_ref().ok_or_else(|| Error::NotFound("no bulk batch initialized".to_string()))?;
        let count = self
            .drafts
            .get(user_id)
            .map(Vec::len)
            .ok_or_else(|| Error::NotFound(format!("member {} is not part of the batch", user_id)))?;

        if count >= target {
            return Ok(ValidationResult::rejected(ValidationError::DraftLimitReached { user_id: user_id.clone(), limit: target }));
        }

        let occurrence = self.config.default_occurrence(self.clock.today(), key.default_group_type);
        let check = self.validator.check_capacity(&occurrence, Exclusion::Nothing)?;
        if !check.is_available {
            return Ok(ValidationResult::rejected(check.rejection_including_candidate(&occurrence)));
        }

        if let Some(drafts) = self.drafts.get_mut(user_id) {
            drafts.push(Draft::new(occurrence));
        }

        Ok(ValidationResult::valid())
    }

    /// Returns `false` if no such draft exists.
    pub fn remove_draft(&mut self, user_id: &UserId, draft_id: &DraftId) -> bool {
        match self.drafts.get_mut(user_id) {
            Some(drafts) => {
                let before = drafts.len();
                drafts.retain(|d| &d.id != draft_id);
                drafts.len() != before
            }
            None => false,
        }
    }

    pub fn is_user_complete(&self, user_id: &UserId) -> bool {
        self.drafts.get(user_id).is_some_and(|drafts| drafts.len() == self.monthly_target())
    }

    pub fn is_complete(&self) -> bool {
        self.key.is_some() && self.drafts.keys().all(|user_id| self.is_user_complete(user_id))
    }

    /// Turns every draft into an ad-hoc assignment through `manager`, one at
    /// a time. Committed drafts leave the batch; rejected ones stay for editing.
    ///
    /// Every member must have a program in `programs`, otherwise nothing is written.
    pub fn commit(
        &mut self,
        manager: &AssignmentManager,
        programs: &HashMap<UserId, ProgramId>,
        created_by: Option<UserId>,
    ) -> Result<Vec<DraftCommit>> {
        let weekly_frequency =
            self.key.as_ref().map(|key| key.weekly_frequency).ok_or_else(|| Error::NotFound("no bulk batch initialized".to_string()))?;

        if let Some(missing) = self.drafts.keys().find(|user_id| !programs.contains_key(*user_id)) {
            return Err(Error::NotFound(format!("program for member {}", missing)));
        }

        let mut commits = Vec::new();
        let mut outcome = Ok(());

        'members: for (user_id, drafts) in &self.drafts {
            let program_id = &programs[user_id];

            for draft in drafts {
                let mut request =
                    AssignmentRequest::ad_hoc(draft.occurrence.clone(), user_id.clone(), program_id.clone(), weekly_frequency);
                if !draft.notes.is_empty() {
                    request = request.with_notes(draft.notes.clone());
                }
                if let Some(staff) = &created_by {
                    request = request.created_by(staff.clone());
                }

                match manager.create_assignment(request) {
                    Ok(result) => commits.push(DraftCommit { user_id: user_id.clone(), draft_id: draft.id.clone(), result }),
                    Err(err) => {
                        outcome = Err(err);
                        break 'members;
                    }
                }
            }
        }

        // Drafts written before a store failure are dropped as well.
        let written: HashSet<DraftId> = commits.iter().filter(|c| c.result.success).map(|c| c.draft_id.clone()).collect();
        for drafts in self.drafts.values_mut() {
            drafts.retain(|d| !written.contains(&d.id));
        }
        outcome?;

        log::info!("Bulk commit: {} of {} drafts assigned.", written.len(), commits.len());

        Ok(commits)
    }

    fn draft_mut(&mut self, user_id: &UserId, draft_id: &DraftId) -> Option<&mut Draft> {
        self.drafts.get_mut(user_id)?.iter_mut().find(|d| &d.id == draft_id)
    }
}
