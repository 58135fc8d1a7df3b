//! Drawbot / spinner job model and DTOs. Both queues share one row shape.

use gaestefotos_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from `drawbot_jobs` or `spinner_jobs`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BoothJob {
    pub id: DbId,
    pub event_id: DbId,
    pub photo_id: Option<DbId>,
    pub guest_name: Option<String>,
    pub payload: serde_json::Value,
    pub status: String,
    pub error_message: Option<String>,
    pub claimed_by_key_id: Option<DbId>,
    pub started_at: Option<Timestamp>,
    pub finished_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A job together with its place in the queue.
#[derive(Debug, Clone, Serialize)]
pub struct BoothJobWithPosition {
    #[serde(flatten)]
    pub job: BoothJob,
    /// 1-based position among QUEUED jobs; `None` once the job left the queue.
    pub position: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EnqueueBoothJob {
    pub photo_id: Option<DbId>,
    #[validate(length(max = 80))]
    pub guest_name: Option<String>,
    pub payload: Option<serde_json::Value>,
}

/// Status report from booth hardware.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateBoothJobStatus {
    pub status: String,
    #[validate(length(max = 4000))]
    pub error_message: Option<String>,
}

/// Per-queue status counters for the ops view.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct QueueCounts {
    pub queued: i64,
    pub processing: i64,
    pub failed: i64,
}
