//! Repository for the `api_keys` table.

use gaestefotos_core::types::DbId;
use sqlx::PgPool;

use crate::models::api_key::{ApiKey, CreateApiKey, UpdateApiKey};

const COLUMNS: &str = "\
    id, name, description, key_hash, key_prefix, scopes, event_id, created_by, \
    rate_limit_read_per_min, rate_limit_write_per_min, is_active, last_used_at, \
    expires_at, revoked_at, created_at, updated_at";

/// Provides CRUD operations for API keys.
pub struct ApiKeyRepo;

impl ApiKeyRepo {
    /// Insert a key. Rate limits must already be resolved to concrete values.
    pub async fn create(
        pool: &PgPool,
        input: &CreateApiKey,
        key_hash: &str,
        key_prefix: &str,
        created_by: DbId,
        rate_limit_read: i32,
        rate_limit_write: i32,
    ) -> Result<ApiKey, sqlx::Error> {
        let query = format!(
            "INSERT INTO api_keys \
                (name, description, key_hash, key_prefix, scopes, event_id, created_by, \
                 rate_limit_read_per_min, rate_limit_write_per_min, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ApiKey>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(key_hash)
            .bind(key_prefix)
            .bind(&input.scopes)
            .bind(input.event_id)
            .bind(created_by)
            .bind(rate_limit_read)
            .bind(rate_limit_write)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<ApiKey>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM api_keys ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, ApiKey>(&query).fetch_all(pool).await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ApiKey>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM api_keys WHERE id = $1");
        sqlx::query_as::<_, ApiKey>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Look a key up by its SHA-256 hash. Usability (active, revoked,
    /// expired) is checked by the caller.
    pub async fn find_by_hash(
        pool: &PgPool,
        key_hash: &str,
    ) -> Result<Option<ApiKey>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM api_keys WHERE key_hash = $1");
        sqlx::query_as::<_, ApiKey>(&query)
            .bind(key_hash)
            .fetch_optional(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateApiKey,
    ) -> Result<Option<ApiKey>, sqlx::Error> {
        let query = format!(
            "UPDATE api_keys SET \
                 name = COALESCE($2, name), \
                 description = COALESCE($3, description), \
                 scopes = COALESCE($4, scopes), \
                 rate_limit_read_per_min = COALESCE($5, rate_limit_read_per_min), \
                 rate_limit_write_per_min = COALESCE($6, rate_limit_write_per_min), \
                 is_active = COALESCE($7, is_active), \
                 expires_at = COALESCE($8, expires_at) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ApiKey>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.scopes)
            .bind(input.rate_limit_read_per_min)
            .bind(input.rate_limit_write_per_min)
            .bind(input.is_active)
            .bind(input.expires_at)
            .fetch_optional(pool)
            .await
    }

    /// Revoke a key. Returns `None` if missing or already revoked.
    pub async fn revoke(pool: &PgPool, id: DbId) -> Result<Option<ApiKey>, sqlx::Error> {
        let query = format!(
            "UPDATE api_keys SET revoked_at = NOW(), is_active = false \
             WHERE id = $1 AND revoked_at IS NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ApiKey>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Replace the secret of a key. The old plaintext stops working at once.
    pub async fn rotate(
        pool: &PgPool,
        id: DbId,
        new_hash: &str,
        new_prefix: &str,
    ) -> Result<Option<ApiKey>, sqlx::Error> {
        let query = format!(
            "UPDATE api_keys SET \
                 key_hash = $2, key_prefix = $3, \
                 revoked_at = NULL, is_active = true \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ApiKey>(&query)
            .bind(id)
            .bind(new_hash)
            .bind(new_prefix)
            .fetch_optional(pool)
            .await
    }

    pub async fn touch_last_used(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE api_keys SET last_used_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
