//! Handlers for global feature flags and per-event overrides.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use gaestefotos_core::error::CoreError;
use gaestefotos_core::feature_flags::{validate_key, EffectiveFlag};
use gaestefotos_core::types::DbId;
use gaestefotos_db::models::feature_flag::{
    CreateFeatureFlag, EventFeatureOverride, FeatureFlag, UpdateFeatureFlag,
};
use gaestefotos_db::repositories::FeatureFlagRepo;
use serde::Deserialize;
use sqlx::PgPool;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::features::EventFeatures;
use crate::handlers::events::owned_event;
use crate::middleware::rbac::{RequireAdmin, RequireHost};
use crate::response::DataResponse;
use crate::state::AppState;

fn flag_not_found(key: &str) -> AppError {
    AppError::Core(CoreError::NotFoundByKey {
        entity: "Feature flag",
        key: key.to_string(),
    })
}

async fn require_flag(pool: &PgPool, key: &str) -> AppResult<FeatureFlag> {
    FeatureFlagRepo::find_by_key(pool, key)
        .await?
        .ok_or_else(|| flag_not_found(key))
}

// ---------------------------------------------------------------------------
// Global flags (admin)
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/feature-flags
pub async fn list_flags(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<FeatureFlag>>>> {
    let flags = FeatureFlagRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: flags }))
}

/// POST /api/v1/admin/feature-flags
pub async fn create_flag(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateFeatureFlag>,
) -> AppResult<(StatusCode, Json<DataResponse<FeatureFlag>>)> {
    input.validate()?;
    validate_key(&input.key).map_err(|e| AppError::Core(CoreError::Validation(e)))?;
    let flag = FeatureFlagRepo::create(&state.pool, &input).await?;
    tracing::info!(key = %flag.key, default_enabled = flag.default_enabled, user_id = admin.user_id, "Feature flag created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: flag })))
}

/// PUT /api/v1/admin/feature-flags/{key}
pub async fn update_flag(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(input): Json<UpdateFeatureFlag>,
) -> AppResult<Json<DataResponse<FeatureFlag>>> {
    input.validate()?;
    let flag = FeatureFlagRepo::update(&state.pool, &key, &input)
        .await?
        .ok_or_else(|| flag_not_found(&key))?;
    tracing::info!(key = %key, default_enabled = flag.default_enabled, user_id = admin.user_id, "Feature flag updated");
    Ok(Json(DataResponse { data: flag }))
}

/// DELETE /api/v1/admin/feature-flags/{key}
///
/// Event overrides of the flag go with it.
pub async fn delete_flag(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<StatusCode> {
    if !FeatureFlagRepo::delete(&state.pool, &key).await? {
        return Err(flag_not_found(&key));
    }
    tracing::info!(key = %key, user_id = admin.user_id, "Feature flag deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Event overrides (host / admin)
// ---------------------------------------------------------------------------

/// GET /api/v1/events/{id}/feature-flags
///
/// Effective values with their source.
pub async fn list_event_flags(
    RequireHost(user): RequireHost,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<EffectiveFlag>>>> {
    let event = owned_event(&state.pool, &user, event_id).await?;
    let (features, _) = EventFeatures::load(&state.pool, &event).await?;
    Ok(Json(DataResponse {
        data: features.flags,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SetOverrideRequest {
    pub enabled: bool,
}

/// PUT /api/v1/events/{id}/feature-flags/{key}
pub async fn set_event_override(
    RequireHost(user): RequireHost,
    State(state): State<AppState>,
    Path((event_id, key)): Path<(DbId, String)>,
    Json(input): Json<SetOverrideRequest>,
) -> AppResult<Json<DataResponse<EventFeatureOverride>>> {
    owned_event(&state.pool, &user, event_id).await?;
    require_flag(&state.pool, &key).await?;
    let row = FeatureFlagRepo::set_override(&state.pool, event_id, &key, input.enabled).await?;
    tracing::info!(event_id, key = %key, enabled = input.enabled, user_id = user.user_id, "Feature override set");
    Ok(Json(DataResponse { data: row }))
}

/// DELETE /api/v1/events/{id}/feature-flags/{key}
pub async fn delete_event_override(
    RequireHost(user): RequireHost,
    State(state): State<AppState>,
    Path((event_id, key)): Path<(DbId, String)>,
) -> AppResult<StatusCode> {
    owned_event(&state.pool, &user, event_id).await?;
    if !FeatureFlagRepo::delete_override(&state.pool, event_id, &key).await? {
        return Err(AppError::Core(CoreError::NotFoundByKey {
            entity: "Feature override",
            key,
        }));
    }
    tracing::info!(event_id, key = %key, user_id = user.user_id, "Feature override removed");
    Ok(StatusCode::NO_CONTENT)
}
