//! Repository for the `user_sessions` table.
//!
//! A session row is one refresh token. Tokens are single use: refreshing
//! consumes the row and the caller opens a new one.

use gaestefotos_core::types::DbId;
use sqlx::PgPool;

use crate::models::session::{CreateSession, UserSession};

const COLUMNS: &str = "id, user_id, refresh_token_hash, expires_at, is_revoked, \
                        user_agent, ip_address, created_at, updated_at";

/// Rows removed per statement by [`SessionRepo::purge_stale`].
pub const PURGE_BATCH_SIZE: i64 = 1_000;

pub struct SessionRepo;

impl SessionRepo {
    pub async fn create(pool: &PgPool, input: &CreateSession) -> Result<UserSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_sessions (user_id, refresh_token_hash, expires_at, user_agent, ip_address)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(input.user_id)
            .bind(&input.refresh_token_hash)
            .bind(input.expires_at)
            .bind(&input.user_agent)
            .bind(&input.ip_address)
            .fetch_one(pool)
            .await
    }

    /// Revoke the live session holding `hash` and return it.
    ///
    /// One statement, so of two concurrent refreshes with the same token
    /// exactly one gets the row. `None` for unknown, expired or already
    /// used tokens.
    pub async fn consume_refresh_token(
        pool: &PgPool,
        hash: &str,
    ) -> Result<Option<UserSession>, sqlx::Error> {
        let query = format!(
            "UPDATE user_sessions SET is_revoked = true
             WHERE refresh_token_hash = $1
               AND is_revoked = false
               AND expires_at > NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(hash)
            .fetch_optional(pool)
            .await
    }

    /// Revoke all active sessions for a user. Returns the count revoked.
    pub async fn revoke_all_for_user(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_sessions SET is_revoked = true
             WHERE user_id = $1 AND is_revoked = false",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete expired or revoked sessions in batches of `batch_size`, so a
    /// large backlog never holds locks on the whole table.
    pub async fn purge_stale(pool: &PgPool, batch_size: i64) -> Result<u64, sqlx::Error> {
        let mut total = 0;
        loop {
            let deleted = sqlx::query(
                "DELETE FROM user_sessions WHERE id IN (
                     SELECT id FROM user_sessions
                     WHERE expires_at < NOW() OR is_revoked = true
                     LIMIT $1
                 )",
            )
            .bind(batch_size)
            .execute(pool)
            .await?
            .rows_affected();
            total += deleted;
            if deleted < batch_size as u64 {
                return Ok(total);
            }
        }
    }
}
