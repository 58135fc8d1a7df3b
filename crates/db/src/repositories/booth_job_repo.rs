//! Repository for the `drawbot_jobs` and `spinner_jobs` tables.
//!
//! Both tables share one shape, so every function takes a [`BoothKind`]
//! selecting the table. Table names come from the closed `BoothKind` set and
//! are never user input.

use gaestefotos_core::booth::{BoothJobStatus, BoothKind};
use gaestefotos_core::types::DbId;
use sqlx::PgPool;

use crate::models::booth_job::{BoothJob, BoothJobWithPosition, EnqueueBoothJob, QueueCounts};

const COLUMNS: &str = "id, event_id, photo_id, guest_name, payload, status, error_message, \
                        claimed_by_key_id, started_at, finished_at, created_at, updated_at";

pub struct BoothJobRepo;

impl BoothJobRepo {
    pub async fn enqueue(
        pool: &PgPool,
        kind: BoothKind,
        event_id: DbId,
        input: &EnqueueBoothJob,
    ) -> Result<BoothJob, sqlx::Error> {
        let table = kind.table();
        let query = format!(
            "INSERT INTO {table} (event_id, photo_id, guest_name, payload)
             VALUES ($1, $2, $3, COALESCE($4, '{{}}'::jsonb))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BoothJob>(&query)
            .bind(event_id)
            .bind(input.photo_id)
            .bind(&input.guest_name)
            .bind(&input.payload)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        kind: BoothKind,
        id: DbId,
    ) -> Result<Option<BoothJob>, sqlx::Error> {
        let table = kind.table();
        let query = format!("SELECT {COLUMNS} FROM {table} WHERE id = $1");
        sqlx::query_as::<_, BoothJob>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// 1-based queue position of a job, or `None` when it is not QUEUED.
    ///
    /// Jobs are ordered by `created_at`, ties broken by `id`.
    pub async fn position(
        pool: &PgPool,
        kind: BoothKind,
        job: &BoothJob,
    ) -> Result<Option<i64>, sqlx::Error> {
        if job.status != BoothJobStatus::Queued.as_str() {
            return Ok(None);
        }
        let table = kind.table();
        let query = format!(
            "SELECT COUNT(*) FROM {table}
             WHERE event_id = $1
               AND status = 'QUEUED'
               AND (created_at < $2 OR (created_at = $2 AND id < $3))"
        );
        let ahead: i64 = sqlx::query_scalar(&query)
            .bind(job.event_id)
            .bind(job.created_at)
            .bind(job.id)
            .fetch_one(pool)
            .await?;
        Ok(Some(ahead + 1))
    }

    /// Find a job and compute its position in one call.
    pub async fn find_with_position(
        pool: &PgPool,
        kind: BoothKind,
        id: DbId,
    ) -> Result<Option<BoothJobWithPosition>, sqlx::Error> {
        let Some(job) = Self::find_by_id(pool, kind, id).await? else {
            return Ok(None);
        };
        let position = Self::position(pool, kind, &job).await?;
        Ok(Some(BoothJobWithPosition { job, position }))
    }

    /// Processing and queued jobs of an event, processing first, then the
    /// queue in order. Queued jobs carry their positions.
    pub async fn list_queue(
        pool: &PgPool,
        kind: BoothKind,
        event_id: DbId,
    ) -> Result<Vec<BoothJobWithPosition>, sqlx::Error> {
        let table = kind.table();
        let query = format!(
            "SELECT {COLUMNS} FROM {table}
             WHERE event_id = $1 AND status IN ('QUEUED', 'PROCESSING')
             ORDER BY (status = 'PROCESSING') DESC, created_at ASC, id ASC"
        );
        let jobs = sqlx::query_as::<_, BoothJob>(&query)
            .bind(event_id)
            .fetch_all(pool)
            .await?;

        let mut next_position = 0;
        Ok(jobs
            .into_iter()
            .map(|job| {
                let position = (job.status == BoothJobStatus::Queued.as_str()).then(|| {
                    next_position += 1;
                    next_position
                });
                BoothJobWithPosition { job, position }
            })
            .collect())
    }

    /// Claim the oldest QUEUED job and move it to PROCESSING.
    ///
    /// `event_id = None` claims across all events. Concurrent booths never
    /// receive the same job (`FOR UPDATE SKIP LOCKED`).
    pub async fn claim_next(
        pool: &PgPool,
        kind: BoothKind,
        event_id: Option<DbId>,
        api_key_id: Option<DbId>,
    ) -> Result<Option<BoothJob>, sqlx::Error> {
        let table = kind.table();
        let query = format!(
            "UPDATE {table} SET
                status = 'PROCESSING',
                started_at = NOW(),
                claimed_by_key_id = $2
             WHERE id = (
                SELECT id FROM {table}
                WHERE status = 'QUEUED' AND ($1::BIGINT IS NULL OR event_id = $1)
                ORDER BY created_at ASC, id ASC
                LIMIT 1
                FOR UPDATE SKIP LOCKED
             )
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BoothJob>(&query)
            .bind(event_id)
            .bind(api_key_id)
            .fetch_optional(pool)
            .await
    }

    /// Move a job from `from` to `to`. Terminal targets stamp `finished_at`,
    /// PROCESSING stamps `started_at`.
    ///
    /// Returns `None` if the job is no longer in `from`.
    pub async fn transition(
        pool: &PgPool,
        kind: BoothKind,
        id: DbId,
        from: BoothJobStatus,
        to: BoothJobStatus,
        error_message: Option<&str>,
    ) -> Result<Option<BoothJob>, sqlx::Error> {
        let table = kind.table();
        let query = format!(
            "UPDATE {table} SET
                status = $3,
                error_message = COALESCE($4, error_message),
                started_at = CASE WHEN $3 = 'PROCESSING' THEN NOW() ELSE started_at END,
                finished_at = CASE WHEN $5 THEN NOW() ELSE finished_at END
             WHERE id = $1 AND status = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BoothJob>(&query)
            .bind(id)
            .bind(from.as_str())
            .bind(to.as_str())
            .bind(error_message)
            .bind(to.is_terminal())
            .fetch_optional(pool)
            .await
    }

    /// Status counters across all events.
    pub async fn counts(pool: &PgPool, kind: BoothKind) -> Result<QueueCounts, sqlx::Error> {
        let table = kind.table();
        let query = format!(
            "SELECT
                COUNT(*) FILTER (WHERE status = 'QUEUED') AS queued,
                COUNT(*) FILTER (WHERE status = 'PROCESSING') AS processing,
                COUNT(*) FILTER (WHERE status = 'FAILED') AS failed
             FROM {table}"
        );
        sqlx::query_as::<_, QueueCounts>(&query).fetch_one(pool).await
    }
}
