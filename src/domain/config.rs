use std::path::Path;

use chrono::{NaiveDate, NaiveTime};

use crate::api::config_dto::{ConfigDto, QuotaHorizonDto, SlotTemplateDto};
use crate::domain::quota::quota_tracker::QuotaHorizon;
use crate::domain::slot::occurrence::Occurrence;
use crate::domain::slot::slot_template::{GroupType, SlotTemplate, TimeRange, weekday_from_index};
use crate::domain::slot::slot_template_registry::SlotTemplateRegistry;
use crate::domain::utils::id::GroupIdentifier;
use crate::error::{Error, Result};
use crate::loader::parser::{parse_json_file, parse_time_of_day};

const DEFAULT_TIERS: [u32; 3] = [2, 3, 6];
const DEFAULT_TRAINER: &str = "Mike";
const DEFAULT_ROOM: &str = "Room Mike";
const DEFAULT_GROUP_TYPE: u32 = 3;

/// Static input supplied by the configuration collaborator.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Group sizes a slot may be configured with.
    pub group_type_tiers: Vec<u32>,
    pub default_trainer: String,
    pub default_room: String,
    pub default_time: TimeRange,
    pub default_group_type: GroupType,
    pub trainers: Vec<String>,
    pub rooms: Vec<String>,

    /// Horizon used when checking a new assignment against the member's quota.
    pub quota_horizon: QuotaHorizon,
    pub slot_templates: Vec<SlotTemplate>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            group_type_tiers: DEFAULT_TIERS.to_vec(),
            default_trainer: DEFAULT_TRAINER.to_string(),
            default_room: DEFAULT_ROOM.to_string(),
            default_time: default_time_range(),
            default_group_type: GroupType::new(DEFAULT_GROUP_TYPE).expect("default group type is non-zero"),
            trainers: vec![DEFAULT_TRAINER.to_string(), "Jordan".to_string()],
            rooms: vec![DEFAULT_ROOM.to_string(), "Room Jordan".to_string()],
            quota_horizon: QuotaHorizon::Month,
            slot_templates: Vec::new(),
        }
    }
}

fn default_time_range() -> TimeRange {
    let start = NaiveTime::from_hms_opt(18, 0, 0).expect("valid time of day");
    let end = NaiveTime::from_hms_opt(19, 0, 0).expect("valid time of day");

    TimeRange::new(start, end).expect("18:00 is before 19:00")
}

impl SchedulerConfig {
    pub fn load(file_path: impl AsRef<Path>) -> Result<Self> {
        let dto: ConfigDto = parse_json_file(file_path)?;
        SchedulerConfig::try_from(dto)
    }

    pub fn is_supported(&self, group_type: GroupType) -> bool {
        self.group_type_tiers.contains(&group_type.capacity())
    }

    /// The occurrence a new draft starts out with on `date`.
    pub fn default_occurrence(&self, date: NaiveDate, group_type: GroupType) -> Occurrence {
        Occurrence {
            date,
            time: self.default_time,
            trainer: self.default_trainer.clone(),
            room: self.default_room.clone(),
            group_type,
        }
    }

    /// Registry holding every configured template.
    pub fn build_registry(&self) -> Result<SlotTemplateRegistry> {
        let mut registry = SlotTemplateRegistry::new(self.group_type_tiers.clone());

        for template in &self.slot_templates {
            registry.register(template.clone())?;
        }

        Ok(registry)
    }
}

impl TryFrom<SlotTemplateDto> for SlotTemplate {
    type Error = Error;

    fn try_from(dto: SlotTemplateDto) -> Result<Self> {
        let start = parse_time_of_day(&dto.start_time)?;
        let end = parse_time_of_day(&dto.end_time)?;
        let time = TimeRange::new(start, end).ok_or_else(|| {
            Error::InvalidSlot(format!(
                "template {} starts at {} but ends at {}",
                dto.group_identifier, dto.start_time, dto.end_time
            ))
        })?;

        Ok(SlotTemplate {
            group_identifier: GroupIdentifier::new(dto.group_identifier),
            day_of_week: weekday_from_index(dto.day_of_week)?,
            time,
            trainer: dto.trainer,
            room: dto.room,
            group_type: GroupType::new(dto.group_type)?,
            max_capacity: dto.max_capacity,
        })
    }
}

impl TryFrom<ConfigDto> for SchedulerConfig {
    type Error = Error;

    fn try_from(dto: ConfigDto) -> Result<Self> {
        let defaults = SchedulerConfig::default();

        let group_type_tiers = dto.group_type_tiers.unwrap_or(defaults.group_type_tiers);
        if group_type_tiers.is_empty() || group_type_tiers.contains(&0) {
            return Err(Error::ConfigError("group type tiers must be a non-empty list of positive sizes".to_string()));
        }

        let default_group_type = match dto.default_group_type {
            Some(size) => GroupType::new(size)?,
            None => defaults.default_group_type,
        };
        if !group_type_tiers.contains(&default_group_type.capacity()) {
            return Err(Error::ConfigError(format!(
                "default group type {} is not one of the tiers {:?}",
                default_group_type, group_type_tiers
            )));
        }

        let start = match dto.default_start_time {
            Some(value) => parse_time_of_day(&value)?,
            None => defaults.default_time.start(),
        };
        let end = match dto.default_end_time {
            Some(value) => parse_time_of_day(&value)?,
            None => defaults.default_time.end(),
        };
        let default_time = TimeRange::new(start, end)
            .ok_or_else(|| Error::ConfigError(format!("default start {} is not before default end {}", start, end)))?;

        let slot_templates = dto.slot_templates.into_iter().map(SlotTemplate::try_from).collect::<Result<Vec<_>>>()?;

        let quota_horizon = match dto.quota_horizon {
            Some(QuotaHorizonDto::Week) => QuotaHorizon::Week,
            Some(QuotaHorizonDto::Month) | None => QuotaHorizon::Month,
        };

        log::info!(
            "Scheduler configuration loaded: tiers {:?}, {} slot template(s), quota horizon {:?}.",
            group_type_tiers,
            slot_templates.len(),
            quota_horizon
        );

        Ok(SchedulerConfig {
            group_type_tiers,
            default_trainer: dto.default_trainer.unwrap_or(defaults.default_trainer),
            default_room: dto.default_room.unwrap_or(defaults.default_room),
            default_time,
            default_group_type,
            trainers: dto.trainers.unwrap_or(defaults.trainers),
            rooms: dto.rooms.unwrap_or(defaults.rooms),
            quota_horizon,
            slot_templates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = SchedulerConfig::try_from(ConfigDto::default()).unwrap();
        assert_eq!(config.group_type_tiers, vec![2, 3, 6]);
        assert_eq!(config.default_trainer, "Mike");
        assert_eq!(config.default_time.to_string(), "18:00-19:00");
        assert_eq!(config.default_group_type.capacity(), 3);
        assert_eq!(config.quota_horizon, QuotaHorizon::Month);
    }

    #[test]
    fn default_group_type_must_be_a_tier() {
        let dto = ConfigDto { default_group_type: Some(4), ..ConfigDto::default() };
        assert!(matches!(SchedulerConfig::try_from(dto), Err(Error::ConfigError(_))));
    }

    #[test]
    fn inverted_default_times_are_rejected() {
        let dto = ConfigDto {
            default_start_time: Some("19:00".to_string()),
            default_end_time: Some("18:00".to_string()),
            ..ConfigDto::default()
        };
        assert!(matches!(SchedulerConfig::try_from(dto), Err(Error::ConfigError(_))));
    }

    #[test]
    fn templates_are_parsed_from_camel_case_json() {
        let json = r#"{
            "groupTypeTiers": [2, 3, 6],
            "quotaHorizon": "week",
            "slotTemplates": [{
                "groupIdentifier": "wed-18-mike",
                "dayOfWeek": 3,
                "startTime": "18:00:00",
                "endTime": "19:00",
                "trainer": "Mike",
                "room": "Room Mike",
                "groupType": 3
            }]
        }"#;
        let dto: ConfigDto = serde_json::from_str(json).unwrap();
        let config = SchedulerConfig::try_from(dto).unwrap();

        assert_eq!(config.quota_horizon, QuotaHorizon::Week);
        assert_eq!(config.slot_templates.len(), 1);
        assert_eq!(config.slot_templates[0].day_of_week, chrono::Weekday::Wed);
        assert_eq!(config.build_registry().unwrap().len(), 1);
    }
}
