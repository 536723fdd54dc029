use std::collections::BTreeSet;

use crate::domain::slot::occurrence::Occurrence;
use crate::domain::slot::slot_template::GroupType;
use crate::domain::utils::id::{DraftId, UserId};

/// A provisional occurrence for one member, editable until commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub id: DraftId,
    pub occurrence: Occurrence,
    pub notes: String,
}

impl Draft {
    pub fn new(occurrence: Occurrence) -> Self {
        Draft { id: DraftId::generate(), occurrence, notes: String::new() }
    }
}

/// Inputs a batch of drafts was generated from. Re-initializing with an
/// equal key keeps the existing drafts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkKey {
    pub user_ids: BTreeSet<UserId>,
    pub weekly_frequency: u32,
    pub default_group_type: GroupType,
}

impl BulkKey {
    pub fn new(user_ids: impl IntoIterator<Item = UserId>, weekly_frequency: u32, default_group_type: GroupType) -> Self {
        BulkKey { user_ids: user_ids.into_iter().collect(), weekly_frequency, default_group_type }
    }
}
