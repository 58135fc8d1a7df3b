//! Package (pricing tier) model and DTOs.

use gaestefotos_core::packages::PackageLimits;
use gaestefotos_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `packages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Package {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub max_photos: Option<i32>,
    pub max_videos: Option<i32>,
    pub storage_limit_bytes: Option<i64>,
    /// JSON array of feature flag keys included in the package.
    pub features: serde_json::Value,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Package {
    pub fn limits(&self) -> PackageLimits {
        PackageLimits {
            max_photos: self.max_photos,
            max_videos: self.max_videos,
            storage_limit_bytes: self.storage_limit_bytes,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePackage {
    #[validate(length(min = 1, max = 50))]
    pub code: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub max_photos: Option<i32>,
    pub max_videos: Option<i32>,
    pub storage_limit_bytes: Option<i64>,
    #[serde(default)]
    pub features: Vec<String>,
    pub is_active: Option<bool>,
}

impl CreatePackage {
    pub fn limits(&self) -> PackageLimits {
        PackageLimits {
            max_photos: self.max_photos,
            max_videos: self.max_videos,
            storage_limit_bytes: self.storage_limit_bytes,
        }
    }
}

/// Update DTO. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePackage {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub max_photos: Option<i32>,
    pub max_videos: Option<i32>,
    pub storage_limit_bytes: Option<i64>,
    pub features: Option<Vec<String>>,
    pub is_active: Option<bool>,
}
