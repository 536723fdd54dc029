use serde::{Deserialize, Serialize};

/// On-disk scheduler configuration. Every key is optional; missing keys
/// fall back to the built-in defaults.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigDto {
    pub group_type_tiers: Option<Vec<u32>>,
    pub default_trainer: Option<String>,
    pub default_room: Option<String>,
    pub default_start_time: Option<String>,
    pub default_end_time: Option<String>,
    pub default_group_type: Option<u32>,
    pub trainers: Option<Vec<String>>,
    pub rooms: Option<Vec<String>>,
    pub quota_horizon: Option<QuotaHorizonDto>,
    pub slot_templates: Vec<SlotTemplateDto>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum QuotaHorizonDto {
    Week,
    Month,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SlotTemplateDto {
    pub group_identifier: String,

    /// `0 = Sunday` .. `6 = Saturday`.
    pub day_of_week: u8,
    pub start_time: String,
    pub end_time: String,
    pub trainer: String,
    pub room: String,
    pub group_type: u32,
    pub max_capacity: Option<u32>,
}
