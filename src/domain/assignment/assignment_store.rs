use slotmap::{SlotMap, new_key_type};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::assignment::assignment::{Assignment, SlotRef};
use crate::domain::utils::id::{AssignmentId, ProgramId, UserId};
use crate::error::{Error, Result};

/// Selection criteria for active assignments. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentFilter {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub room: Option<String>,
    pub program_id: Option<ProgramId>,
    pub user_id: Option<UserId>,
    pub slot_ref: Option<SlotRef>,
}

impl AssignmentFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_date(self, date: NaiveDate) -> Self {
        self.between(date, date)
    }

    /// Inclusive on both ends.
    pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.date_from = Some(from);
        self.date_to = Some(to);
        self
    }

    pub fn in_room(mut self, room: impl Into<String>) -> Self {
        self.room = Some(room.into());
        self
    }

    pub fn for_program(mut self, program_id: ProgramId) -> Self {
        self.program_id = Some(program_id);
        self
    }

    pub fn for_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn for_slot(mut self, slot_ref: SlotRef) -> Self {
        self.slot_ref = Some(slot_ref);
        self
    }

    pub fn matches(&self, assignment: &Assignment) -> bool {
        let date = assignment.occurrence.date;

        self.date_from.is_none_or(|from| date >= from)
            && self.date_to.is_none_or(|to| date <= to)
            && self.room.as_ref().is_none_or(|room| &assignment.occurrence.room == room)
            && self.program_id.as_ref().is_none_or(|program| &assignment.program_id == program)
            && self.user_id.as_ref().is_none_or(|user| &assignment.user_id == user)
            && self.slot_ref.as_ref().is_none_or(|slot| &assignment.slot_ref == slot)
    }
}

/// Storage collaborator for staff-created assignments.
///
/// Every call is atomic for a single row; no multi-row transaction is
/// assumed. Implementations report their own failures as
/// `Error::PersistenceFailure`.
pub trait AssignmentRepository: std::fmt::Debug + Send + Sync {
    /// Active assignments matching `filter`.
    fn find_active(&self, filter: &AssignmentFilter) -> Result<Vec<Assignment>>;

    fn get(&self, id: &AssignmentId) -> Result<Option<Assignment>>;

    fn insert(&self, assignment: Assignment) -> Result<AssignmentId>;

    fn update(&self, assignment: &Assignment) -> Result<()>;

    /// Soft-deletes the assignment. Returns `false` when the id is unknown.
    fn deactivate(&self, id: &AssignmentId, at: NaiveDateTime) -> Result<bool>;
}

new_key_type! {
    struct AssignmentKey;
}

#[derive(Debug, Default)]
struct StoreInner {
    /// Assignment storage.
    slots: SlotMap<AssignmentKey, Assignment>,

    /// Lookup of the internal key by public assignment id.
    id_index: HashMap<AssignmentId, AssignmentKey>,
}

/// Process-local [`AssignmentRepository`]. Clones share the same rows.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAssignmentStore {
    /// Both maps are protected with a single lock.
    inner: Arc<RwLock<StoreInner>>,
}

fn poisoned<T>(_: T) -> Error {
    Error::PersistenceFailure("assignment store lock poisoned".to_string())
}

impl InMemoryAssignmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows, active or not.
    pub fn len(&self) -> usize {
        self.inner.read().map(|guard| guard.slots.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AssignmentRepository for InMemoryAssignmentStore {
    fn find_active(&self, filter: &AssignmentFilter) -> Result<Vec<Assignment>> {
        let guard = self.inner.read().map_err(poisoned)?;

        let mut found: Vec<Assignment> =
            guard.slots.values().filter(|a| a.is_active && filter.matches(a)).cloned().collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

        Ok(found)
    }

    fn get(&self, id: &AssignmentId) -> Result<Option<Assignment>> {
        let guard = self.inner.read().map_err(poisoned)?;

        Ok(guard.id_index.get(id).and_then(|key| guard.slots.get(*key)).cloned())
    }

    fn insert(&self, assignment: Assignment) -> Result<AssignmentId> {
        let mut guard = self.inner.write().map_err(poisoned)?;

        if guard.id_index.contains_key(&assignment.id) {
            return Err(Error::PersistenceFailure(format!("assignment {} already exists", assignment.id)));
        }

        let id = assignment.id.clone();
        let key = guard.slots.insert(assignment);
        guard.id_index.insert(id.clone(), key);

        Ok(id)
    }

    fn update(&self, assignment: &Assignment) -> Result<()> {
        let mut guard = self.inner.write().map_err(poisoned)?;

        let key = *guard
            .id_index
            .get(&assignment.id)
            .ok_or_else(|| Error::NotFound(format!("assignment {}", assignment.id)))?;

        match guard.slots.get_mut(key) {
            Some(stored) => {
                *stored = assignment.clone();
                Ok(())
            }
            None => Err(Error::PersistenceFailure(format!("index of assignment {} points to an empty slot", assignment.id))),
        }
    }

    fn deactivate(&self, id: &AssignmentId, at: NaiveDateTime) -> Result<bool> {
        let mut guard = self.inner.write().map_err(poisoned)?;

        let Some(key) = guard.id_index.get(id).copied() else {
            return Ok(false);
        };

        match guard.slots.get_mut(key) {
            Some(stored) => {
                stored.is_active = false;
                stored.updated_at = at;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
