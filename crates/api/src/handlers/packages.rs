//! Handlers for pricing packages: admin CRUD and the public price list.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use gaestefotos_core::error::CoreError;
use gaestefotos_core::feature_flags::validate_key;
use gaestefotos_core::packages::{validate_limits, PackageLimits};
use gaestefotos_core::types::DbId;
use gaestefotos_db::models::package::{CreatePackage, Package, UpdatePackage};
use gaestefotos_db::repositories::{FeatureFlagRepo, PackageRepo};
use sqlx::PgPool;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

fn package_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Package", id })
}

/// Every included feature must be a defined flag.
async fn validate_features(pool: &PgPool, features: &[String]) -> AppResult<()> {
    let mut errors = Vec::new();
    for key in features {
        if let Err(e) = validate_key(key) {
            errors.push(e);
            continue;
        }
        if FeatureFlagRepo::find_by_key(pool, key).await?.is_none() {
            errors.push(format!("Unknown feature flag '{key}'"));
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Validation(errors.join("; "))))
    }
}

/// GET /api/v1/public/packages
pub async fn list_public_packages(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Package>>>> {
    let packages = PackageRepo::list(&state.pool, true).await?;
    Ok(Json(DataResponse { data: packages }))
}

/// GET /api/v1/admin/packages
pub async fn list_packages(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Package>>>> {
    let packages = PackageRepo::list(&state.pool, false).await?;
    Ok(Json(DataResponse { data: packages }))
}

/// GET /api/v1/admin/packages/{id}
pub async fn get_package(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Package>>> {
    let package = PackageRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| package_not_found(id))?;
    Ok(Json(DataResponse { data: package }))
}

/// POST /api/v1/admin/packages
pub async fn create_package(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreatePackage>,
) -> AppResult<(StatusCode, Json<DataResponse<Package>>)> {
    input.validate()?;
    validate_limits(&input.limits(), input.price_cents)
        .map_err(|e| AppError::Core(CoreError::Validation(e)))?;
    validate_features(&state.pool, &input.features).await?;

    let package = PackageRepo::create(&state.pool, &input).await?;
    tracing::info!(package_id = package.id, code = %package.code, user_id = admin.user_id, "Package created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: package })))
}

/// PUT /api/v1/admin/packages/{id}
///
/// Limits are validated against the merged result.
pub async fn update_package(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePackage>,
) -> AppResult<Json<DataResponse<Package>>> {
    input.validate()?;
    let current = PackageRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| package_not_found(id))?;

    let merged = PackageLimits {
        max_photos: input.max_photos.or(current.max_photos),
        max_videos: input.max_videos.or(current.max_videos),
        storage_limit_bytes: input.storage_limit_bytes.or(current.storage_limit_bytes),
    };
    validate_limits(&merged, input.price_cents.unwrap_or(current.price_cents))
        .map_err(|e| AppError::Core(CoreError::Validation(e)))?;
    if let Some(features) = &input.features {
        validate_features(&state.pool, features).await?;
    }

    let package = PackageRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| package_not_found(id))?;
    tracing::info!(package_id = id, user_id = admin.user_id, "Package updated");
    Ok(Json(DataResponse { data: package }))
}

/// DELETE /api/v1/admin/packages/{id}
///
/// Events and invoices that referenced the package keep their data but
/// lose the link. Prefer `is_active = false` for retired packages.
pub async fn delete_package(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !PackageRepo::delete(&state.pool, id).await? {
        return Err(package_not_found(id));
    }
    tracing::info!(package_id = id, user_id = admin.user_id, "Package deleted");
    Ok(StatusCode::NO_CONTENT)
}
