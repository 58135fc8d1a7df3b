//! Repository for the `photos` table.

use gaestefotos_core::media::kinds;
use gaestefotos_core::packages::EventUsage;
use gaestefotos_core::types::DbId;
use sqlx::PgPool;

use crate::models::photo::{CreatePhoto, Photo, PhotoFilter, PhotoStats, UpdatePhoto};

const COLUMNS: &str = "id, event_id, category_id, media_kind, storage_path, original_filename, \
                        mime_type, size_bytes, sha256, uploader_name, guest_key, status, \
                        is_favorite, taken_at, created_at, updated_at";

pub struct PhotoRepo;

impl PhotoRepo {
    pub async fn create(pool: &PgPool, input: &CreatePhoto) -> Result<Photo, sqlx::Error> {
        let query = format!(
            "INSERT INTO photos
                (event_id, category_id, media_kind, storage_path, original_filename,
                 mime_type, size_bytes, sha256, uploader_name, guest_key, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Photo>(&query)
            .bind(input.event_id)
            .bind(input.category_id)
            .bind(&input.media_kind)
            .bind(&input.storage_path)
            .bind(&input.original_filename)
            .bind(&input.mime_type)
            .bind(input.size_bytes)
            .bind(&input.sha256)
            .bind(&input.uploader_name)
            .bind(&input.guest_key)
            .bind(&input.status)
            .fetch_one(pool)
            .await
    }

    /// Find a photo of an event in any status.
    pub async fn find(
        pool: &PgPool,
        event_id: DbId,
        id: DbId,
    ) -> Result<Option<Photo>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM photos WHERE id = $1 AND event_id = $2");
        sqlx::query_as::<_, Photo>(&query)
            .bind(id)
            .bind(event_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a live (not deleted) photo with the same content hash.
    pub async fn find_by_sha256(
        pool: &PgPool,
        event_id: DbId,
        sha256: &str,
    ) -> Result<Option<Photo>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM photos
             WHERE event_id = $1 AND sha256 = $2 AND status <> 'DELETED'"
        );
        sqlx::query_as::<_, Photo>(&query)
            .bind(event_id)
            .bind(sha256)
            .fetch_optional(pool)
            .await
    }

    /// List photos of an event, newest first.
    pub async fn list(
        pool: &PgPool,
        event_id: DbId,
        filter: &PhotoFilter,
    ) -> Result<Vec<Photo>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM photos
             WHERE event_id = $1
               AND ((cardinality($2::TEXT[]) = 0 AND status <> 'DELETED') OR status = ANY($2))
               AND ($3::BIGINT IS NULL OR category_id = $3)
               AND ($4::TIMESTAMPTZ IS NULL OR created_at >= $4)
               AND ($5::TIMESTAMPTZ IS NULL OR created_at < $5)
             ORDER BY created_at DESC, id DESC
             LIMIT $6 OFFSET $7"
        );
        sqlx::query_as::<_, Photo>(&query)
            .bind(event_id)
            .bind(&filter.statuses)
            .bind(filter.category_id)
            .bind(filter.from)
            .bind(filter.to)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        event_id: DbId,
        id: DbId,
        input: &UpdatePhoto,
    ) -> Result<Option<Photo>, sqlx::Error> {
        let query = format!(
            "UPDATE photos SET
                category_id = COALESCE($3, category_id),
                is_favorite = COALESCE($4, is_favorite),
                uploader_name = COALESCE($5, uploader_name)
             WHERE id = $1 AND event_id = $2 AND status <> 'DELETED'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Photo>(&query)
            .bind(id)
            .bind(event_id)
            .bind(input.category_id)
            .bind(input.is_favorite)
            .bind(&input.uploader_name)
            .fetch_optional(pool)
            .await
    }

    /// Move a photo to `to`, but only if it is still in `from`.
    ///
    /// Any status other than APPROVED takes the photo off its mosaic wall in
    /// the same transaction. Returns `None` when the photo changed
    /// concurrently.
    pub async fn transition_status(
        pool: &PgPool,
        event_id: DbId,
        id: DbId,
        from: &str,
        to: &str,
    ) -> Result<Option<Photo>, sqlx::Error> {
        let query = format!(
            "UPDATE photos SET status = $4
             WHERE id = $1 AND event_id = $2 AND status = $3
             RETURNING {COLUMNS}"
        );
        let mut tx = pool.begin().await?;
        let photo = sqlx::query_as::<_, Photo>(&query)
            .bind(id)
            .bind(event_id)
            .bind(from)
            .bind(to)
            .fetch_optional(&mut *tx)
            .await?;
        if photo.is_some() && to != "APPROVED" {
            sqlx::query("DELETE FROM mosaic_tiles WHERE photo_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(photo)
    }

    /// Current usage of an event, for package quota checks.
    pub async fn usage(pool: &PgPool, event_id: DbId) -> Result<EventUsage, sqlx::Error> {
        let (photos, videos, bytes): (i64, i64, i64) = sqlx::query_as(
            "SELECT
                COUNT(*) FILTER (WHERE media_kind = $2),
                COUNT(*) FILTER (WHERE media_kind = $3),
                COALESCE(SUM(size_bytes), 0)::BIGINT
             FROM photos
             WHERE event_id = $1 AND status <> 'DELETED'",
        )
        .bind(event_id)
        .bind(kinds::IMAGE)
        .bind(kinds::VIDEO)
        .fetch_one(pool)
        .await?;
        Ok(EventUsage {
            photos,
            videos,
            bytes,
        })
    }

    /// Live uploads by one guest in an event.
    pub async fn count_for_guest(
        pool: &PgPool,
        event_id: DbId,
        guest_key: &str,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM photos
             WHERE event_id = $1 AND guest_key = $2 AND status <> 'DELETED'",
        )
        .bind(event_id)
        .bind(guest_key)
        .fetch_one(pool)
        .await
    }

    pub async fn stats(pool: &PgPool, event_id: DbId) -> Result<PhotoStats, sqlx::Error> {
        sqlx::query_as::<_, PhotoStats>(
            "SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'PENDING') AS pending,
                COUNT(*) FILTER (WHERE status = 'APPROVED') AS approved,
                COUNT(*) FILTER (WHERE status = 'REJECTED') AS rejected,
                COUNT(*) FILTER (WHERE status = 'DELETED') AS deleted,
                COUNT(*) FILTER (WHERE media_kind = 'IMAGE' AND status <> 'DELETED') AS images,
                COUNT(*) FILTER (WHERE media_kind = 'VIDEO' AND status <> 'DELETED') AS videos,
                COALESCE(SUM(size_bytes) FILTER (WHERE status <> 'DELETED'), 0)::BIGINT
                    AS total_bytes
             FROM photos
             WHERE event_id = $1",
        )
        .bind(event_id)
        .fetch_one(pool)
        .await
    }
}
