//! API key model and DTOs.

use gaestefotos_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `api_keys` table.
///
/// `key_hash` is never serialized; `key_prefix` identifies the key to humans.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ApiKey {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    #[serde(skip_serializing)]
    pub key_hash: String,
    pub key_prefix: String,
    pub scopes: Vec<String>,
    pub event_id: Option<DbId>,
    pub created_by: DbId,
    pub rate_limit_read_per_min: i32,
    pub rate_limit_write_per_min: i32,
    pub is_active: bool,
    pub last_used_at: Option<Timestamp>,
    pub expires_at: Option<Timestamp>,
    pub revoked_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ApiKey {
    /// Active, not revoked and not expired at `now`.
    pub fn is_usable(&self, now: Timestamp) -> bool {
        self.is_active && self.revoked_at.is_none() && self.expires_at.is_none_or(|exp| exp > now)
    }
}

/// Returned on creation and rotation. Carries the plaintext exactly once.
#[derive(Debug, Clone, Serialize)]
pub struct ApiKeyCreatedResponse {
    #[serde(flatten)]
    pub key: ApiKey,
    pub plaintext_key: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateApiKey {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub description: Option<String>,
    pub scopes: Vec<String>,
    pub event_id: Option<DbId>,
    pub rate_limit_read_per_min: Option<i32>,
    pub rate_limit_write_per_min: Option<i32>,
    pub expires_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateApiKey {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub scopes: Option<Vec<String>>,
    pub rate_limit_read_per_min: Option<i32>,
    pub rate_limit_write_per_min: Option<i32>,
    pub is_active: Option<bool>,
    pub expires_at: Option<Timestamp>,
}
