//! Handlers for the per-event mosaic wall.
//!
//! Cell bookkeeping lives in [`MosaicGrid`]; these handlers load the wall,
//! ask the grid where tiles go, then persist the result. The unique
//! constraints on `mosaic_tiles` catch concurrent placements as 409s.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use gaestefotos_core::error::CoreError;
use gaestefotos_core::media::kinds;
use gaestefotos_core::moderation::PhotoStatus;
use gaestefotos_core::mosaic::{validate_dimensions, Cell, MosaicGrid, DEFAULT_TILE_SIZE_PX};
use gaestefotos_core::types::DbId;
use gaestefotos_db::models::event::Event;
use gaestefotos_db::models::mosaic::{MosaicTile, MosaicWall, PlaceTile, UpsertMosaicWall};
use gaestefotos_db::models::photo::Photo;
use gaestefotos_db::repositories::{MosaicRepo, PhotoRepo};
use serde::Serialize;
use sqlx::PgPool;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::features::EventFeatures;
use crate::handlers::events::{owned_event, public_event};
use crate::middleware::rbac::RequireHost;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MosaicView {
    pub wall: MosaicWall,
    pub tiles: Vec<MosaicTile>,
    pub capacity: usize,
    pub filled: usize,
    pub fill_ratio: f64,
}

fn conflict(msg: String) -> AppError {
    AppError::Core(CoreError::Conflict(msg))
}

async fn require_wall(pool: &PgPool, event_id: DbId) -> AppResult<MosaicWall> {
    MosaicRepo::find_wall(pool, event_id).await?.ok_or_else(|| {
        AppError::Core(CoreError::NotFoundByKey {
            entity: "Mosaic wall",
            key: format!("event {event_id}"),
        })
    })
}

async fn load_grid(pool: &PgPool, wall: &MosaicWall) -> AppResult<(Vec<MosaicTile>, MosaicGrid)> {
    let tiles = MosaicRepo::list_tiles(pool, wall.id).await?;
    let grid = MosaicGrid::new(
        wall.grid_columns,
        wall.grid_rows,
        tiles.iter().map(MosaicTile::cell),
    );
    Ok((tiles, grid))
}

fn view(wall: MosaicWall, tiles: Vec<MosaicTile>, grid: &MosaicGrid) -> MosaicView {
    MosaicView {
        wall,
        tiles,
        capacity: grid.capacity(),
        filled: grid.filled(),
        fill_ratio: grid.fill_ratio(),
    }
}

/// Only approved images go on a wall.
fn ensure_placeable(photo: &Photo) -> AppResult<()> {
    if photo.media_kind != kinds::IMAGE {
        return Err(AppError::Core(CoreError::Validation(
            "Only images can be placed on a mosaic wall".into(),
        )));
    }
    if photo.status != PhotoStatus::Approved.as_str() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Photo {} is not approved",
            photo.id
        ))));
    }
    Ok(())
}

async fn require_mosaic(pool: &PgPool, event: &Event) -> AppResult<()> {
    let (features, _) = EventFeatures::load(pool, event).await?;
    EventFeatures::require(features.mosaic_enabled(), "mosaic_wall")
}

/// Put a freshly approved photo on the wall when the wall auto-fills.
///
/// Never fails the caller: a full wall or a lost race is logged and skipped.
pub(crate) async fn auto_place(pool: &PgPool, event: &Event, photo: &Photo) {
    if ensure_placeable(photo).is_err() {
        return;
    }
    let result: AppResult<Option<MosaicTile>> = async {
        let Some(wall) = MosaicRepo::find_wall(pool, event.id).await? else {
            return Ok(None);
        };
        if !wall.auto_fill || !wall.is_active {
            return Ok(None);
        }
        let (features, _) = EventFeatures::load(pool, event).await?;
        if !features.mosaic_enabled() {
            return Ok(None);
        }
        let (_, grid) = load_grid(pool, &wall).await?;
        let Some(cell) = grid.next_free() else {
            return Ok(None);
        };
        Ok(Some(MosaicRepo::insert_tile(pool, wall.id, photo.id, cell).await?))
    }
    .await;

    match result {
        Ok(Some(tile)) => tracing::debug!(
            event_id = event.id,
            photo_id = photo.id,
            cell_x = tile.cell_x,
            cell_y = tile.cell_y,
            "Photo auto-placed on mosaic",
        ),
        Ok(None) => {}
        Err(e) => tracing::warn!(
            event_id = event.id,
            photo_id = photo.id,
            error = %e,
            "Mosaic auto-placement skipped",
        ),
    }
}

// ---------------------------------------------------------------------------
// Host
// ---------------------------------------------------------------------------

/// PUT /api/v1/events/{id}/mosaic
///
/// Creates the wall or replaces its configuration. Shrinking below placed
/// tiles is refused.
pub async fn upsert_wall(
    RequireHost(user): RequireHost,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
    Json(input): Json<UpsertMosaicWall>,
) -> AppResult<Json<DataResponse<MosaicView>>> {
    input.validate()?;
    let event = owned_event(&state.pool, &user, event_id).await?;
    require_mosaic(&state.pool, &event).await?;

    let tile_size = input.tile_size_px.unwrap_or(DEFAULT_TILE_SIZE_PX);
    validate_dimensions(input.grid_columns, input.grid_rows, tile_size)
        .map_err(|e| AppError::Core(CoreError::Validation(e)))?;

    if let Some(existing) = MosaicRepo::find_wall(&state.pool, event_id).await? {
        let (_, grid) = load_grid(&state.pool, &existing).await?;
        if !grid.fits_within(input.grid_columns, input.grid_rows) {
            return Err(conflict(format!(
                "Placed tiles lie outside a {}x{} wall; remove them first",
                input.grid_columns, input.grid_rows
            )));
        }
    }

    let wall = MosaicRepo::upsert_wall(&state.pool, event_id, &input, tile_size).await?;
    let (tiles, grid) = load_grid(&state.pool, &wall).await?;
    tracing::info!(
        event_id,
        wall_id = wall.id,
        columns = wall.grid_columns,
        rows = wall.grid_rows,
        user_id = user.user_id,
        "Mosaic wall configured",
    );
    Ok(Json(DataResponse {
        data: view(wall, tiles, &grid),
    }))
}

/// GET /api/v1/events/{id}/mosaic
pub async fn get_wall(
    RequireHost(user): RequireHost,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
) -> AppResult<Json<DataResponse<MosaicView>>> {
    owned_event(&state.pool, &user, event_id).await?;
    let wall = require_wall(&state.pool, event_id).await?;
    let (tiles, grid) = load_grid(&state.pool, &wall).await?;
    Ok(Json(DataResponse {
        data: view(wall, tiles, &grid),
    }))
}

/// POST /api/v1/events/{id}/mosaic/tiles
///
/// With `cell_x` and `cell_y` the tile goes exactly there; without them
/// the next cell of the spread order is used.
pub async fn place_tile(
    RequireHost(user): RequireHost,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
    Json(input): Json<PlaceTile>,
) -> AppResult<(StatusCode, Json<DataResponse<MosaicTile>>)> {
    let event = owned_event(&state.pool, &user, event_id).await?;
    require_mosaic(&state.pool, &event).await?;
    let wall = require_wall(&state.pool, event_id).await?;

    let photo = PhotoRepo::find(&state.pool, event_id, input.photo_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Photo",
            id: input.photo_id,
        }))?;
    ensure_placeable(&photo)?;

    let (_, mut grid) = load_grid(&state.pool, &wall).await?;
    let cell = match (input.cell_x, input.cell_y) {
        (Some(x), Some(y)) => grid.place_at(Cell { x, y }).map_err(conflict)?,
        (None, None) => grid.place_next().map_err(conflict)?,
        _ => {
            return Err(AppError::Core(CoreError::Validation(
                "cell_x and cell_y must be given together".into(),
            )))
        }
    };

    let tile = MosaicRepo::insert_tile(&state.pool, wall.id, photo.id, cell).await?;
    tracing::info!(
        event_id,
        photo_id = photo.id,
        cell_x = cell.x,
        cell_y = cell.y,
        "Mosaic tile placed",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: tile })))
}

/// DELETE /api/v1/events/{id}/mosaic/tiles/{tile_id}
pub async fn delete_tile(
    RequireHost(user): RequireHost,
    State(state): State<AppState>,
    Path((event_id, tile_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    owned_event(&state.pool, &user, event_id).await?;
    let wall = require_wall(&state.pool, event_id).await?;
    if !MosaicRepo::delete_tile(&state.pool, wall.id, tile_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "MosaicTile",
            id: tile_id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/events/{id}/mosaic/auto-fill
///
/// Places approved images that are not on the wall yet, oldest first, until
/// the wall is full. Returns the new tiles.
pub async fn auto_fill(
    RequireHost(user): RequireHost,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<MosaicTile>>>> {
    let event = owned_event(&state.pool, &user, event_id).await?;
    require_mosaic(&state.pool, &event).await?;
    let wall = require_wall(&state.pool, event_id).await?;

    let (_, mut grid) = load_grid(&state.pool, &wall).await?;
    let free = grid.capacity() - grid.filled();
    if free == 0 {
        return Err(conflict("Mosaic wall is full".into()));
    }

    let photo_ids =
        MosaicRepo::unplaced_photo_ids(&state.pool, event_id, wall.id, free as i64).await?;
    let cells = grid.place_many(photo_ids.len());
    let placements: Vec<(DbId, Cell)> = photo_ids.into_iter().zip(cells).collect();
    let tiles = MosaicRepo::insert_tiles(&state.pool, wall.id, &placements).await?;

    tracing::info!(
        event_id,
        placed = tiles.len(),
        filled = grid.filled(),
        capacity = grid.capacity(),
        user_id = user.user_id,
        "Mosaic auto-fill completed",
    );
    Ok(Json(DataResponse { data: tiles }))
}

// ---------------------------------------------------------------------------
// Public
// ---------------------------------------------------------------------------

/// GET /api/v1/public/events/{slug}/mosaic
pub async fn get_public_wall(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<MosaicView>>> {
    let event = public_event(&state.pool, &slug).await?;
    require_mosaic(&state.pool, &event).await?;
    let wall = MosaicRepo::find_wall(&state.pool, event.id)
        .await?
        .filter(|w| w.is_active)
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFoundByKey {
                entity: "Mosaic wall",
                key: slug.clone(),
            })
        })?;
    let (tiles, grid) = load_grid(&state.pool, &wall).await?;
    Ok(Json(DataResponse {
        data: view(wall, tiles, &grid),
    }))
}
