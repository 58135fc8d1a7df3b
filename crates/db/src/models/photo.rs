//! Photo / video model, filters and DTOs.

use gaestefotos_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `photos` table. Videos share the table, told apart by
/// `media_kind`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Photo {
    pub id: DbId,
    pub event_id: DbId,
    pub category_id: Option<DbId>,
    pub media_kind: String,
    pub storage_path: String,
    pub original_filename: Option<String>,
    pub mime_type: String,
    pub size_bytes: i64,
    pub sha256: String,
    pub uploader_name: Option<String>,
    #[serde(skip_serializing)]
    pub guest_key: Option<String>,
    pub status: String,
    pub is_favorite: bool,
    pub taken_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert DTO built by the upload handler after the file is stored.
#[derive(Debug, Clone)]
pub struct CreatePhoto {
    pub event_id: DbId,
    pub category_id: Option<DbId>,
    pub media_kind: String,
    pub storage_path: String,
    pub original_filename: Option<String>,
    pub mime_type: String,
    pub size_bytes: i64,
    pub sha256: String,
    pub uploader_name: Option<String>,
    pub guest_key: Option<String>,
    pub status: String,
}

/// Host-side edits. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePhoto {
    pub category_id: Option<DbId>,
    pub is_favorite: Option<bool>,
    #[validate(length(max = 80))]
    pub uploader_name: Option<String>,
}

/// Filters shared by the public gallery and the host list.
#[derive(Debug, Clone, Default)]
pub struct PhotoFilter {
    /// Restrict to these statuses; empty means any status except `DELETED`.
    pub statuses: Vec<String>,
    pub category_id: Option<DbId>,
    /// Inclusive lower bound on `created_at`.
    pub from: Option<Timestamp>,
    /// Exclusive upper bound on `created_at`.
    pub to: Option<Timestamp>,
    pub limit: i64,
    pub offset: i64,
}

/// Per-event counters for the host dashboard.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct PhotoStats {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub deleted: i64,
    pub images: i64,
    pub videos: i64,
    pub total_bytes: i64,
}
