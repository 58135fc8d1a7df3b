//! Feature flag and per-event override models.

use gaestefotos_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FeatureFlag {
    pub id: DbId,
    pub key: String,
    pub description: Option<String>,
    pub default_enabled: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EventFeatureOverride {
    pub id: DbId,
    pub event_id: DbId,
    pub flag_key: String,
    pub enabled: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFeatureFlag {
    pub key: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[serde(default)]
    pub default_enabled: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateFeatureFlag {
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub default_enabled: Option<bool>,
}
