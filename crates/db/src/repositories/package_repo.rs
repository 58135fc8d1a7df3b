//! Repository for the `packages` table.

use gaestefotos_core::types::DbId;
use sqlx::PgPool;

use crate::models::package::{CreatePackage, Package, UpdatePackage};

const COLUMNS: &str = "id, code, name, description, price_cents, max_photos, max_videos, \
                        storage_limit_bytes, features, is_active, created_at, updated_at";

pub struct PackageRepo;

impl PackageRepo {
    pub async fn create(pool: &PgPool, input: &CreatePackage) -> Result<Package, sqlx::Error> {
        let query = format!(
            "INSERT INTO packages
                (code, name, description, price_cents, max_photos, max_videos,
                 storage_limit_bytes, features, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, COALESCE($9, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Package>(&query)
            .bind(&input.code)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price_cents)
            .bind(input.max_photos)
            .bind(input.max_videos)
            .bind(input.storage_limit_bytes)
            .bind(serde_json::json!(input.features))
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Package>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM packages WHERE id = $1");
        sqlx::query_as::<_, Package>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List packages by price. `active_only` restricts to purchasable ones.
    pub async fn list(pool: &PgPool, active_only: bool) -> Result<Vec<Package>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM packages
             WHERE ($1 = false OR is_active = true)
             ORDER BY price_cents ASC, id ASC"
        );
        sqlx::query_as::<_, Package>(&query)
            .bind(active_only)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePackage,
    ) -> Result<Option<Package>, sqlx::Error> {
        let query = format!(
            "UPDATE packages SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                price_cents = COALESCE($4, price_cents),
                max_photos = COALESCE($5, max_photos),
                max_videos = COALESCE($6, max_videos),
                storage_limit_bytes = COALESCE($7, storage_limit_bytes),
                features = COALESCE($8, features),
                is_active = COALESCE($9, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Package>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price_cents)
            .bind(input.max_photos)
            .bind(input.max_videos)
            .bind(input.storage_limit_bytes)
            .bind(input.features.as_ref().map(|f| serde_json::json!(f)))
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Hard delete. Events on the package fall back to no package.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM packages WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
