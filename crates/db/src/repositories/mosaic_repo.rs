//! Repository for the `mosaic_walls` and `mosaic_tiles` tables.

use gaestefotos_core::mosaic::Cell;
use gaestefotos_core::types::DbId;
use sqlx::PgPool;

use crate::models::mosaic::{MosaicTile, MosaicWall, UpsertMosaicWall};

const WALL_COLUMNS: &str = "id, event_id, grid_columns, grid_rows, tile_size_px, \
                             target_image_path, auto_fill, is_active, created_at, updated_at";

const TILE_COLUMNS: &str = "id, wall_id, photo_id, cell_x, cell_y, placed_at";

pub struct MosaicRepo;

impl MosaicRepo {
    // -----------------------------------------------------------------------
    // Walls
    // -----------------------------------------------------------------------

    pub async fn find_wall(
        pool: &PgPool,
        event_id: DbId,
    ) -> Result<Option<MosaicWall>, sqlx::Error> {
        let query = format!("SELECT {WALL_COLUMNS} FROM mosaic_walls WHERE event_id = $1");
        sqlx::query_as::<_, MosaicWall>(&query)
            .bind(event_id)
            .fetch_optional(pool)
            .await
    }

    /// Create the event's wall or replace its configuration.
    pub async fn upsert_wall(
        pool: &PgPool,
        event_id: DbId,
        input: &UpsertMosaicWall,
        tile_size_px: i32,
    ) -> Result<MosaicWall, sqlx::Error> {
        let query = format!(
            "INSERT INTO mosaic_walls
                (event_id, grid_columns, grid_rows, tile_size_px, target_image_path,
                 auto_fill, is_active)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, false), COALESCE($7, true))
             ON CONFLICT (event_id) DO UPDATE SET
                grid_columns = EXCLUDED.grid_columns,
                grid_rows = EXCLUDED.grid_rows,
                tile_size_px = EXCLUDED.tile_size_px,
                target_image_path = COALESCE($5, mosaic_walls.target_image_path),
                auto_fill = COALESCE($6, mosaic_walls.auto_fill),
                is_active = COALESCE($7, mosaic_walls.is_active)
             RETURNING {WALL_COLUMNS}"
        );
        sqlx::query_as::<_, MosaicWall>(&query)
            .bind(event_id)
            .bind(input.grid_columns)
            .bind(input.grid_rows)
            .bind(tile_size_px)
            .bind(&input.target_image_path)
            .bind(input.auto_fill)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Tiles
    // -----------------------------------------------------------------------

    pub async fn list_tiles(pool: &PgPool, wall_id: DbId) -> Result<Vec<MosaicTile>, sqlx::Error> {
        let query = format!(
            "SELECT {TILE_COLUMNS} FROM mosaic_tiles
             WHERE wall_id = $1
             ORDER BY placed_at ASC, id ASC"
        );
        sqlx::query_as::<_, MosaicTile>(&query)
            .bind(wall_id)
            .fetch_all(pool)
            .await
    }

    pub async fn insert_tile(
        pool: &PgPool,
        wall_id: DbId,
        photo_id: DbId,
        cell: Cell,
    ) -> Result<MosaicTile, sqlx::Error> {
        let query = format!(
            "INSERT INTO mosaic_tiles (wall_id, photo_id, cell_x, cell_y)
             VALUES ($1, $2, $3, $4)
             RETURNING {TILE_COLUMNS}"
        );
        sqlx::query_as::<_, MosaicTile>(&query)
            .bind(wall_id)
            .bind(photo_id)
            .bind(cell.x)
            .bind(cell.y)
            .fetch_one(pool)
            .await
    }

    /// Insert several tiles atomically.
    pub async fn insert_tiles(
        pool: &PgPool,
        wall_id: DbId,
        placements: &[(DbId, Cell)],
    ) -> Result<Vec<MosaicTile>, sqlx::Error> {
        let query = format!(
            "INSERT INTO mosaic_tiles (wall_id, photo_id, cell_x, cell_y)
             VALUES ($1, $2, $3, $4)
             RETURNING {TILE_COLUMNS}"
        );
        let mut tx = pool.begin().await?;
        let mut tiles = Vec::with_capacity(placements.len());
        for &(photo_id, cell) in placements {
            let tile = sqlx::query_as::<_, MosaicTile>(&query)
                .bind(wall_id)
                .bind(photo_id)
                .bind(cell.x)
                .bind(cell.y)
                .fetch_one(&mut *tx)
                .await?;
            tiles.push(tile);
        }
        tx.commit().await?;
        Ok(tiles)
    }

    pub async fn delete_tile(
        pool: &PgPool,
        wall_id: DbId,
        tile_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM mosaic_tiles WHERE id = $1 AND wall_id = $2")
            .bind(tile_id)
            .bind(wall_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Approved photos of the event that are not on the wall yet, oldest
    /// first. Only images are placed on a mosaic.
    pub async fn unplaced_photo_ids(
        pool: &PgPool,
        event_id: DbId,
        wall_id: DbId,
        limit: i64,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT p.id FROM photos p
             WHERE p.event_id = $1
               AND p.status = 'APPROVED'
               AND p.media_kind = 'IMAGE'
               AND NOT EXISTS (
                   SELECT 1 FROM mosaic_tiles t WHERE t.wall_id = $2 AND t.photo_id = p.id
               )
             ORDER BY p.created_at ASC, p.id ASC
             LIMIT $3",
        )
        .bind(event_id)
        .bind(wall_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
