use std::collections::BTreeMap;

use chrono::Weekday;

use crate::domain::slot::slot_template::{GroupType, SlotTemplate};
use crate::domain::utils::id::GroupIdentifier;
use crate::error::{Error, Result};

/// Holds the recurring weekly slot definitions, keyed by their stable
/// group identifier. Read-only for the scheduler once populated.
#[derive(Debug, Clone, Default)]
pub struct SlotTemplateRegistry {
    templates: BTreeMap<GroupIdentifier, SlotTemplate>,

    /// The capacity tiers a template may use (e.g. 2, 3 and 6 members).
    supported_tiers: Vec<u32>,
}

impl SlotTemplateRegistry {
    pub fn new(supported_tiers: Vec<u32>) -> Self {
        SlotTemplateRegistry { templates: BTreeMap::new(), supported_tiers }
    }

    pub fn is_supported(&self, group_type: GroupType) -> bool {
        self.supported_tiers.contains(&group_type.capacity())
    }

    /// Adds a template, replacing an earlier one with the same identifier.
    ///
    /// # Errors
    /// `Error::InvalidSlot` if the template uses a group size that is not one
    /// of the supported tiers.
    pub fn register(&mut self, template: SlotTemplate) -> Result<()> {
        if !self.is_supported(template.group_type) {
            return Err(Error::InvalidSlot(format!(
                "template {} uses group type {}, supported tiers are {:?}",
                template.group_identifier, template.group_type, self.supported_tiers
            )));
        }

        if let Some(previous) = self.templates.insert(template.group_identifier.clone(), template) {
            log::warn!("Slot template {} was registered twice, the later definition wins.", previous.group_identifier);
        }

        Ok(())
    }

    pub fn get(&self, group_identifier: &GroupIdentifier) -> Option<&SlotTemplate> {
        self.templates.get(group_identifier)
    }

    /// Templates held on `day`, ordered by start time.
    pub fn templates_for_day(&self, day: Weekday) -> Vec<&SlotTemplate> {
        let mut templates: Vec<&SlotTemplate> = self.templates.values().filter(|t| t.day_of_week == day).collect();
        templates.sort_by_key(|t| (t.time, t.room.clone()));
        templates
    }

    pub fn iter(&self) -> impl Iterator<Item = &SlotTemplate> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
