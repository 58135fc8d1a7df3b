//! Mosaic wall and tile models.

use gaestefotos_core::mosaic::Cell;
use gaestefotos_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MosaicWall {
    pub id: DbId,
    pub event_id: DbId,
    pub grid_columns: i32,
    pub grid_rows: i32,
    pub tile_size_px: i32,
    pub target_image_path: Option<String>,
    pub auto_fill: bool,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MosaicTile {
    pub id: DbId,
    pub wall_id: DbId,
    pub photo_id: DbId,
    pub cell_x: i32,
    pub cell_y: i32,
    pub placed_at: Timestamp,
}

impl MosaicTile {
    pub fn cell(&self) -> Cell {
        Cell {
            x: self.cell_x,
            y: self.cell_y,
        }
    }
}

/// Create-or-update body for `PUT /events/{id}/mosaic`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpsertMosaicWall {
    pub grid_columns: i32,
    pub grid_rows: i32,
    pub tile_size_px: Option<i32>,
    #[validate(length(max = 500))]
    pub target_image_path: Option<String>,
    pub auto_fill: Option<bool>,
    pub is_active: Option<bool>,
}

/// Body for placing a tile. Without `cell_x`/`cell_y` the next free cell
/// is chosen.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceTile {
    pub photo_id: DbId,
    pub cell_x: Option<i32>,
    pub cell_y: Option<i32>,
}
