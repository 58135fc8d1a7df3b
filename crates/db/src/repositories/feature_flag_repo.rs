//! Repository for `feature_flags` and `event_feature_overrides`.

use std::collections::HashMap;

use gaestefotos_core::types::DbId;
use sqlx::PgPool;

use crate::models::feature_flag::{
    CreateFeatureFlag, EventFeatureOverride, FeatureFlag, UpdateFeatureFlag,
};

const COLUMNS: &str = "id, key, description, default_enabled, created_at, updated_at";

const OVERRIDE_COLUMNS: &str = "id, event_id, flag_key, enabled, created_at, updated_at";

pub struct FeatureFlagRepo;

impl FeatureFlagRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateFeatureFlag,
    ) -> Result<FeatureFlag, sqlx::Error> {
        let query = format!(
            "INSERT INTO feature_flags (key, description, default_enabled)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FeatureFlag>(&query)
            .bind(&input.key)
            .bind(&input.description)
            .bind(input.default_enabled)
            .fetch_one(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<FeatureFlag>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM feature_flags ORDER BY key ASC");
        sqlx::query_as::<_, FeatureFlag>(&query).fetch_all(pool).await
    }

    pub async fn find_by_key(
        pool: &PgPool,
        key: &str,
    ) -> Result<Option<FeatureFlag>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM feature_flags WHERE key = $1");
        sqlx::query_as::<_, FeatureFlag>(&query)
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        key: &str,
        input: &UpdateFeatureFlag,
    ) -> Result<Option<FeatureFlag>, sqlx::Error> {
        let query = format!(
            "UPDATE feature_flags SET
                description = COALESCE($2, description),
                default_enabled = COALESCE($3, default_enabled)
             WHERE key = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FeatureFlag>(&query)
            .bind(key)
            .bind(&input.description)
            .bind(input.default_enabled)
            .fetch_optional(pool)
            .await
    }

    /// Delete a flag together with every event override of it.
    pub async fn delete(pool: &PgPool, key: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM feature_flags WHERE key = $1")
            .bind(key)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// `(key, default_enabled)` pairs of every flag.
    pub async fn defaults(pool: &PgPool) -> Result<Vec<(String, bool)>, sqlx::Error> {
        sqlx::query_as("SELECT key, default_enabled FROM feature_flags ORDER BY key")
            .fetch_all(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Event overrides
    // -----------------------------------------------------------------------

    pub async fn set_override(
        pool: &PgPool,
        event_id: DbId,
        key: &str,
        enabled: bool,
    ) -> Result<EventFeatureOverride, sqlx::Error> {
        let query = format!(
            "INSERT INTO event_feature_overrides (event_id, flag_key, enabled)
             VALUES ($1, $2, $3)
             ON CONFLICT (event_id, flag_key) DO UPDATE SET enabled = EXCLUDED.enabled
             RETURNING {OVERRIDE_COLUMNS}"
        );
        sqlx::query_as::<_, EventFeatureOverride>(&query)
            .bind(event_id)
            .bind(key)
            .bind(enabled)
            .fetch_one(pool)
            .await
    }

    pub async fn delete_override(
        pool: &PgPool,
        event_id: DbId,
        key: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM event_feature_overrides WHERE event_id = $1 AND flag_key = $2",
        )
        .bind(event_id)
        .bind(key)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn overrides_for_event(
        pool: &PgPool,
        event_id: DbId,
    ) -> Result<HashMap<String, bool>, sqlx::Error> {
        let rows: Vec<(String, bool)> = sqlx::query_as(
            "SELECT flag_key, enabled FROM event_feature_overrides WHERE event_id = $1",
        )
        .bind(event_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().collect())
    }
}
