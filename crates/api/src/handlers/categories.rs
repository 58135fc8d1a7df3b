//! Handlers for per-event categories (albums).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use gaestefotos_core::error::CoreError;
use gaestefotos_core::types::DbId;
use gaestefotos_db::models::category::{Category, CreateCategory, UpdateCategory};
use gaestefotos_db::repositories::CategoryRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::events::owned_event;
use crate::middleware::rbac::RequireHost;
use crate::response::DataResponse;
use crate::state::AppState;

fn category_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Category",
        id,
    })
}

/// GET /api/v1/events/{id}/categories
///
/// Hosts see hidden categories too.
pub async fn list_categories(
    RequireHost(user): RequireHost,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Category>>>> {
    owned_event(&state.pool, &user, event_id).await?;
    let categories = CategoryRepo::list_for_event(&state.pool, event_id, true).await?;
    Ok(Json(DataResponse { data: categories }))
}

/// POST /api/v1/events/{id}/categories
pub async fn create_category(
    RequireHost(user): RequireHost,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
    Json(input): Json<CreateCategory>,
) -> AppResult<(StatusCode, Json<DataResponse<Category>>)> {
    input.validate()?;
    owned_event(&state.pool, &user, event_id).await?;
    let category = CategoryRepo::create(&state.pool, event_id, &input).await?;
    tracing::info!(event_id, category_id = category.id, "Category created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: category })))
}

/// PUT /api/v1/events/{id}/categories/{category_id}
pub async fn update_category(
    RequireHost(user): RequireHost,
    State(state): State<AppState>,
    Path((event_id, category_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateCategory>,
) -> AppResult<Json<DataResponse<Category>>> {
    input.validate()?;
    owned_event(&state.pool, &user, event_id).await?;
    let category = CategoryRepo::update(&state.pool, event_id, category_id, &input)
        .await?
        .ok_or_else(|| category_not_found(category_id))?;
    Ok(Json(DataResponse { data: category }))
}

/// DELETE /api/v1/events/{id}/categories/{category_id}
///
/// Photos in the category stay, unassigned.
pub async fn delete_category(
    RequireHost(user): RequireHost,
    State(state): State<AppState>,
    Path((event_id, category_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    owned_event(&state.pool, &user, event_id).await?;
    if !CategoryRepo::delete(&state.pool, event_id, category_id).await? {
        return Err(category_not_found(category_id));
    }
    tracing::info!(event_id, category_id, "Category deleted");
    Ok(StatusCode::NO_CONTENT)
}
