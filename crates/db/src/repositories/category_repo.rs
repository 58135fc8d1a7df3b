//! Repository for the `categories` table.

use gaestefotos_core::types::DbId;
use sqlx::PgPool;

use crate::models::category::{Category, CreateCategory, UpdateCategory};

const COLUMNS: &str = "id, event_id, name, sort_order, is_hidden, created_at, updated_at";

pub struct CategoryRepo;

impl CategoryRepo {
    pub async fn create(
        pool: &PgPool,
        event_id: DbId,
        input: &CreateCategory,
    ) -> Result<Category, sqlx::Error> {
        let query = format!(
            "INSERT INTO categories (event_id, name, sort_order, is_hidden)
             VALUES ($1, $2, COALESCE($3, 0), COALESCE($4, false))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(event_id)
            .bind(input.name.trim())
            .bind(input.sort_order)
            .bind(input.is_hidden)
            .fetch_one(pool)
            .await
    }

    /// Find a category, scoped to its event.
    pub async fn find(
        pool: &PgPool,
        event_id: DbId,
        id: DbId,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE id = $1 AND event_id = $2");
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(event_id)
            .fetch_optional(pool)
            .await
    }

    /// List an event's categories in display order.
    pub async fn list_for_event(
        pool: &PgPool,
        event_id: DbId,
        include_hidden: bool,
    ) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM categories
             WHERE event_id = $1 AND ($2 OR is_hidden = false)
             ORDER BY sort_order ASC, name ASC"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(event_id)
            .bind(include_hidden)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        event_id: DbId,
        id: DbId,
        input: &UpdateCategory,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query = format!(
            "UPDATE categories SET
                name = COALESCE($3, name),
                sort_order = COALESCE($4, sort_order),
                is_hidden = COALESCE($5, is_hidden)
             WHERE id = $1 AND event_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(event_id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(input.sort_order)
            .bind(input.is_hidden)
            .fetch_optional(pool)
            .await
    }

    /// Delete a category. Its photos keep existing without a category.
    pub async fn delete(pool: &PgPool, event_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1 AND event_id = $2")
            .bind(id)
            .bind(event_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
