//! Admin handlers for booth and integration API keys.
//!
//! The plaintext key is returned once, on create and on rotate. Only its
//! SHA-256 hash and a short display prefix are stored.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use gaestefotos_core::api_keys::{
    generate_api_key, validate_rate_limit, validate_scopes, DEFAULT_RATE_LIMIT_READ,
    DEFAULT_RATE_LIMIT_WRITE,
};
use gaestefotos_core::error::CoreError;
use gaestefotos_core::types::DbId;
use gaestefotos_db::models::api_key::{ApiKey, ApiKeyCreatedResponse, CreateApiKey, UpdateApiKey};
use gaestefotos_db::repositories::{ApiKeyRepo, EventRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

fn key_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "ApiKey", id })
}

fn check_limit(field: &str, value: Option<i32>) -> AppResult<()> {
    match value {
        Some(v) => validate_rate_limit(v)
            .map_err(|e| AppError::Core(CoreError::Validation(format!("{field}: {e}")))),
        None => Ok(()),
    }
}

/// GET /api/v1/admin/api-keys
pub async fn list_api_keys(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ApiKey>>>> {
    let keys = ApiKeyRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: keys }))
}

/// POST /api/v1/admin/api-keys
pub async fn create_api_key(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateApiKey>,
) -> AppResult<(StatusCode, Json<DataResponse<ApiKeyCreatedResponse>>)> {
    input.validate()?;
    validate_scopes(&input.scopes).map_err(|e| AppError::Core(CoreError::Validation(e)))?;
    check_limit("rate_limit_read_per_min", input.rate_limit_read_per_min)?;
    check_limit("rate_limit_write_per_min", input.rate_limit_write_per_min)?;

    if let Some(event_id) = input.event_id {
        EventRepo::find_by_id(&state.pool, event_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Event",
                id: event_id,
            }))?;
    }

    let generated = generate_api_key();
    let key = ApiKeyRepo::create(
        &state.pool,
        &input,
        &generated.hash,
        &generated.prefix,
        admin.user_id,
        input.rate_limit_read_per_min.unwrap_or(DEFAULT_RATE_LIMIT_READ),
        input.rate_limit_write_per_min.unwrap_or(DEFAULT_RATE_LIMIT_WRITE),
    )
    .await?;

    tracing::info!(
        api_key_id = key.id,
        prefix = %key.key_prefix,
        user_id = admin.user_id,
        "API key created",
    );
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: ApiKeyCreatedResponse {
                key,
                plaintext_key: generated.plaintext,
            },
        }),
    ))
}

/// PUT /api/v1/admin/api-keys/{id}
pub async fn update_api_key(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateApiKey>,
) -> AppResult<Json<DataResponse<ApiKey>>> {
    input.validate()?;
    if let Some(scopes) = &input.scopes {
        validate_scopes(scopes).map_err(|e| AppError::Core(CoreError::Validation(e)))?;
    }
    check_limit("rate_limit_read_per_min", input.rate_limit_read_per_min)?;
    check_limit("rate_limit_write_per_min", input.rate_limit_write_per_min)?;

    let key = ApiKeyRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| key_not_found(id))?;
    tracing::info!(api_key_id = id, user_id = admin.user_id, "API key updated");
    Ok(Json(DataResponse { data: key }))
}

/// POST /api/v1/admin/api-keys/{id}/rotate
///
/// Issue a new secret for an existing key. Revoked keys stay revoked.
pub async fn rotate_api_key(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ApiKeyCreatedResponse>>> {
    let existing = ApiKeyRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| key_not_found(id))?;
    if existing.revoked_at.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "A revoked API key cannot be rotated".into(),
        )));
    }

    let generated = generate_api_key();
    let key = ApiKeyRepo::rotate(&state.pool, id, &generated.hash, &generated.prefix)
        .await?
        .ok_or_else(|| key_not_found(id))?;

    tracing::info!(
        api_key_id = id,
        old_prefix = %existing.key_prefix,
        new_prefix = %key.key_prefix,
        user_id = admin.user_id,
        "API key rotated",
    );
    Ok(Json(DataResponse {
        data: ApiKeyCreatedResponse {
            key,
            plaintext_key: generated.plaintext,
        },
    }))
}

/// POST /api/v1/admin/api-keys/{id}/revoke
pub async fn revoke_api_key(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ApiKey>>> {
    let key = match ApiKeyRepo::revoke(&state.pool, id).await? {
        Some(key) => key,
        None => {
            // Distinguish "missing" from "already revoked".
            ApiKeyRepo::find_by_id(&state.pool, id)
                .await?
                .ok_or_else(|| key_not_found(id))?;
            return Err(AppError::Core(CoreError::Conflict(
                "API key is already revoked".into(),
            )));
        }
    };
    tracing::info!(api_key_id = id, user_id = admin.user_id, "API key revoked");
    Ok(Json(DataResponse { data: key }))
}
