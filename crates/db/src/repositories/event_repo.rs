//! Repository for the `events` table.
//!
//! Soft-deleted events (`deleted_at` set) are invisible to every finder.

use gaestefotos_core::types::DbId;
use sqlx::PgPool;

use crate::models::event::{CreateEvent, Event, UpdateEvent};

const COLUMNS: &str = "id, host_id, package_id, title, slug, description, location, \
                        starts_at, ends_at, is_active, design_config, feature_config, \
                        deleted_at, created_at, updated_at";

pub struct EventRepo;

impl EventRepo {
    /// Insert an event. Config blobs must already be validated.
    pub async fn create(
        pool: &PgPool,
        host_id: DbId,
        slug: &str,
        input: &CreateEvent,
        design_config: &serde_json::Value,
        feature_config: &serde_json::Value,
    ) -> Result<Event, sqlx::Error> {
        let query = format!(
            "INSERT INTO events
                (host_id, package_id, title, slug, description, location,
                 starts_at, ends_at, design_config, feature_config)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(host_id)
            .bind(input.package_id)
            .bind(&input.title)
            .bind(slug)
            .bind(&input.description)
            .bind(&input.location)
            .bind(input.starts_at)
            .bind(input.ends_at)
            .bind(design_config)
            .bind(feature_config)
            .fetch_one(pool)
            .await
    }

    /// Whether a slug is already used, including by deleted events.
    pub async fn slug_taken(pool: &PgPool, slug: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM events WHERE slug = $1)")
            .bind(slug)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Event>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM events WHERE slug = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Event>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// List events, newest first. `host_id = None` lists every host's events.
    pub async fn list(
        pool: &PgPool,
        host_id: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events
             WHERE deleted_at IS NULL
               AND ($1::BIGINT IS NULL OR host_id = $1)
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(host_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Apply non-`None` fields. Config blobs must already be validated.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateEvent,
    ) -> Result<Option<Event>, sqlx::Error> {
        let query = format!(
            "UPDATE events SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                location = COALESCE($4, location),
                starts_at = COALESCE($5, starts_at),
                ends_at = COALESCE($6, ends_at),
                is_active = COALESCE($7, is_active),
                package_id = COALESCE($8, package_id),
                design_config = COALESCE($9, design_config),
                feature_config = COALESCE($10, feature_config)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.location)
            .bind(input.starts_at)
            .bind(input.ends_at)
            .bind(input.is_active)
            .bind(input.package_id)
            .bind(&input.design_config)
            .bind(&input.feature_config)
            .fetch_optional(pool)
            .await
    }

    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE events SET deleted_at = NOW(), is_active = false
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
