//! Handlers for guest uploads, the public gallery and host moderation.

use std::str::FromStr;

use axum::body::Bytes;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use gaestefotos_core::error::CoreError;
use gaestefotos_core::hashing::sha256_hex;
use gaestefotos_core::media::{
    classify_mime, kinds, mime_from_filename, normalize_uploader_name, validate_size,
};
use gaestefotos_core::moderation::PhotoStatus;
use gaestefotos_core::packages::check_upload_quota;
use gaestefotos_core::types::DbId;
use gaestefotos_db::models::photo::{CreatePhoto, Photo, PhotoFilter, PhotoStats, UpdatePhoto};
use gaestefotos_db::repositories::{CategoryRepo, PhotoRepo};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::features::EventFeatures;
use crate::handlers::events::{ensure_accepting_uploads, owned_event, public_event};
use crate::handlers::mosaic::auto_place;
use crate::middleware::guest::GuestRateLimit;
use crate::middleware::rbac::RequireHost;
use crate::query::PhotoQuery;
use crate::response::DataResponse;
use crate::state::AppState;

/// Longest client-chosen guest id kept for per-guest caps.
const MAX_GUEST_ID_LENGTH: usize = 64;

/// Most photos one bulk moderation request may touch.
const MAX_BULK_MODERATION: usize = 500;

fn photo_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Photo", id })
}

fn stored_status(photo: &Photo) -> AppResult<PhotoStatus> {
    PhotoStatus::from_str(&photo.status).map_err(AppError::InternalError)
}

/// Check that `category_id` names a category of this event.
async fn ensure_category(pool: &PgPool, event_id: DbId, category_id: DbId) -> AppResult<()> {
    CategoryRepo::find(pool, event_id, category_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "Category {category_id} does not belong to this event"
            )))
        })
}

// ---------------------------------------------------------------------------
// Guest upload
// ---------------------------------------------------------------------------

struct UploadedFile {
    filename: Option<String>,
    content_type: Option<String>,
    data: Bytes,
}

#[derive(Default)]
struct UploadForm {
    file: Option<UploadedFile>,
    uploader_name: Option<String>,
    category_id: Option<DbId>,
    guest_id: Option<String>,
}

async fn read_upload_form(mut multipart: Multipart) -> AppResult<UploadForm> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.file = Some(UploadedFile {
                    filename,
                    content_type,
                    data,
                });
            }
            "uploader_name" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.uploader_name = Some(text);
            }
            "category_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    let id = trimmed.parse::<DbId>().map_err(|_| {
                        AppError::BadRequest(format!("Invalid category_id '{trimmed}'"))
                    })?;
                    form.category_id = Some(id);
                }
            }
            "guest_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    form.guest_id = Some(trimmed.chars().take(MAX_GUEST_ID_LENGTH).collect());
                }
            }
            _ => {}
        }
    }
    Ok(form)
}

/// Resolve the MIME type, falling back to the filename when the client sent
/// nothing useful.
fn effective_mime(file: &UploadedFile) -> Option<String> {
    let declared = file
        .content_type
        .as_deref()
        .filter(|ct| !ct.is_empty() && !ct.starts_with("application/octet-stream"));
    match declared {
        Some(ct) => Some(ct.to_string()),
        None => file
            .filename
            .as_deref()
            .and_then(mime_from_filename)
            .map(str::to_string),
    }
}

/// POST /api/v1/public/events/{slug}/uploads
///
/// Multipart fields: `file` (required), `uploader_name`, `category_id`,
/// `guest_id`. Without a `guest_id` the client IP identifies the guest for
/// the per-guest cap.
pub async fn upload_photo(
    GuestRateLimit(ip): GuestRateLimit,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Photo>>)> {
    let event = public_event(&state.pool, &slug).await?;
    let (features, package) = EventFeatures::load(&state.pool, &event).await?;
    ensure_accepting_uploads(&event, &features)?;

    let form = read_upload_form(multipart).await?;
    let file = form
        .file
        .ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;

    let mime = effective_mime(&file)
        .ok_or_else(|| AppError::BadRequest("Could not determine the file type".into()))?;
    let media = classify_mime(&mime).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!(
            "Unsupported media type '{mime}'"
        )))
    })?;
    if media.kind == kinds::VIDEO {
        EventFeatures::require(features.videos_allowed(), "video_uploads")?;
    }
    let size = file.data.len() as u64;
    validate_size(&media, size).map_err(|e| AppError::Core(CoreError::Validation(e)))?;

    if let Some(category_id) = form.category_id {
        ensure_category(&state.pool, event.id, category_id).await?;
    }

    if let Some(package) = &package {
        let usage = PhotoRepo::usage(&state.pool, event.id).await?;
        check_upload_quota(&package.limits(), &usage, media.kind, size as i64)
            .map_err(|e| AppError::Core(CoreError::Forbidden(e)))?;
    }

    let guest_key = form.guest_id.unwrap_or_else(|| ip.0.clone());
    if let Some(max) = features.config.max_uploads_per_guest {
        let used = PhotoRepo::count_for_guest(&state.pool, event.id, &guest_key).await?;
        if used >= i64::from(max) {
            return Err(AppError::Core(CoreError::Forbidden(format!(
                "Upload limit of {max} files per guest reached"
            ))));
        }
    }

    let sha256 = sha256_hex(&file.data);
    if let Some(existing) = PhotoRepo::find_by_sha256(&state.pool, event.id, &sha256).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "This file was already uploaded (photo {})",
            existing.id
        ))));
    }

    let relative = format!(
        "events/{}/{}.{}",
        event.id,
        uuid::Uuid::new_v4().simple(),
        media.extension
    );
    let full_path = state.config.storage_root.join(&relative);
    if let Some(dir) = full_path.parent() {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to create media dir: {e}")))?;
    }
    tokio::fs::write(&full_path, &file.data)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to write media file: {e}")))?;

    let status = PhotoStatus::initial(features.config.moderation_required);
    let created = PhotoRepo::create(
        &state.pool,
        &CreatePhoto {
            event_id: event.id,
            category_id: form.category_id,
            media_kind: media.kind.to_string(),
            storage_path: relative,
            original_filename: file.filename,
            mime_type: mime,
            size_bytes: size as i64,
            sha256,
            uploader_name: normalize_uploader_name(form.uploader_name.as_deref()),
            guest_key: Some(guest_key),
            status: status.as_str().to_string(),
        },
    )
    .await;

    let photo = match created {
        Ok(photo) => photo,
        Err(e) => {
            if let Err(rm) = tokio::fs::remove_file(&full_path).await {
                tracing::warn!(path = %full_path.display(), error = %rm, "Failed to remove orphaned upload");
            }
            return Err(e.into());
        }
    };

    if status == PhotoStatus::Approved {
        auto_place(&state.pool, &event, &photo).await;
    }

    tracing::info!(
        event_id = event.id,
        photo_id = photo.id,
        kind = %photo.media_kind,
        status = %photo.status,
        size_bytes = photo.size_bytes,
        "Guest upload stored",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: photo })))
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// GET /api/v1/public/events/{slug}/photos
///
/// Approved media only; the `status` filter is ignored.
pub async fn list_gallery(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PhotoQuery>,
) -> AppResult<Json<DataResponse<Vec<Photo>>>> {
    let event = public_event(&state.pool, &slug).await?;
    let (from, to) = query.date_range()?;
    let page = query.pagination();
    let filter = PhotoFilter {
        statuses: vec![PhotoStatus::Approved.as_str().to_string()],
        category_id: query.category_id,
        from,
        to,
        limit: page.limit(),
        offset: page.offset(),
    };
    let photos = PhotoRepo::list(&state.pool, event.id, &filter).await?;
    Ok(Json(DataResponse { data: photos }))
}

fn parse_statuses(raw: Option<&str>) -> AppResult<Vec<String>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            PhotoStatus::from_str(s)
                .map(|status| status.as_str().to_string())
                .map_err(AppError::BadRequest)
        })
        .collect()
}

/// GET /api/v1/events/{id}/photos
pub async fn list_event_photos(
    RequireHost(user): RequireHost,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
    Query(query): Query<PhotoQuery>,
) -> AppResult<Json<DataResponse<Vec<Photo>>>> {
    owned_event(&state.pool, &user, event_id).await?;
    let (from, to) = query.date_range()?;
    let page = query.pagination();
    let filter = PhotoFilter {
        statuses: parse_statuses(query.status.as_deref())?,
        category_id: query.category_id,
        from,
        to,
        limit: page.limit(),
        offset: page.offset(),
    };
    let photos = PhotoRepo::list(&state.pool, event_id, &filter).await?;
    Ok(Json(DataResponse { data: photos }))
}

/// GET /api/v1/events/{id}/stats
pub async fn event_stats(
    RequireHost(user): RequireHost,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
) -> AppResult<Json<DataResponse<PhotoStats>>> {
    owned_event(&state.pool, &user, event_id).await?;
    let stats = PhotoRepo::stats(&state.pool, event_id).await?;
    Ok(Json(DataResponse { data: stats }))
}

// ---------------------------------------------------------------------------
// Host edits and moderation
// ---------------------------------------------------------------------------

/// PUT /api/v1/events/{id}/photos/{photo_id}
pub async fn update_photo(
    RequireHost(user): RequireHost,
    State(state): State<AppState>,
    Path((event_id, photo_id)): Path<(DbId, DbId)>,
    Json(mut input): Json<UpdatePhoto>,
) -> AppResult<Json<DataResponse<Photo>>> {
    input.validate()?;
    owned_event(&state.pool, &user, event_id).await?;
    if let Some(category_id) = input.category_id {
        ensure_category(&state.pool, event_id, category_id).await?;
    }
    input.uploader_name = normalize_uploader_name(input.uploader_name.as_deref());

    let photo = PhotoRepo::update(&state.pool, event_id, photo_id, &input)
        .await?
        .ok_or_else(|| photo_not_found(photo_id))?;
    Ok(Json(DataResponse { data: photo }))
}

#[derive(Debug, Deserialize)]
pub struct ModerateRequest {
    pub status: PhotoStatus,
}

/// Apply one moderation decision. Hosts may only approve or reject here.
async fn moderate_one(
    pool: &PgPool,
    event_id: DbId,
    photo_id: DbId,
    target: PhotoStatus,
) -> AppResult<Photo> {
    let photo = PhotoRepo::find(pool, event_id, photo_id)
        .await?
        .ok_or_else(|| photo_not_found(photo_id))?;
    let current = stored_status(&photo)?;
    current
        .validate_transition(target)
        .map_err(|e| AppError::Core(CoreError::Validation(e)))?;

    PhotoRepo::transition_status(pool, event_id, photo_id, current.as_str(), target.as_str())
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(format!(
                "Photo {photo_id} was changed concurrently"
            )))
        })
}

fn ensure_decision(target: PhotoStatus) -> AppResult<()> {
    match target {
        PhotoStatus::Approved | PhotoStatus::Rejected => Ok(()),
        other => Err(AppError::Core(CoreError::Validation(format!(
            "Moderation status must be APPROVED or REJECTED, got {other}"
        )))),
    }
}

/// POST /api/v1/events/{id}/photos/{photo_id}/moderate
pub async fn moderate_photo(
    RequireHost(user): RequireHost,
    State(state): State<AppState>,
    Path((event_id, photo_id)): Path<(DbId, DbId)>,
    Json(input): Json<ModerateRequest>,
) -> AppResult<Json<DataResponse<Photo>>> {
    ensure_decision(input.status)?;
    let event = owned_event(&state.pool, &user, event_id).await?;
    let photo = moderate_one(&state.pool, event_id, photo_id, input.status).await?;
    if input.status == PhotoStatus::Approved {
        auto_place(&state.pool, &event, &photo).await;
    }
    tracing::info!(
        event_id,
        photo_id,
        status = %input.status,
        user_id = user.user_id,
        "Photo moderated",
    );
    Ok(Json(DataResponse { data: photo }))
}

#[derive(Debug, Deserialize)]
pub struct BulkModerateRequest {
    pub photo_ids: Vec<DbId>,
    pub status: PhotoStatus,
}

#[derive(Debug, Serialize)]
pub struct BulkModerationFailure {
    pub photo_id: DbId,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct BulkModerateResponse {
    pub updated: Vec<DbId>,
    pub failed: Vec<BulkModerationFailure>,
}

/// POST /api/v1/events/{id}/photos/bulk-moderate
///
/// Each photo is moderated on its own; failures are reported per id.
pub async fn bulk_moderate(
    RequireHost(user): RequireHost,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
    Json(input): Json<BulkModerateRequest>,
) -> AppResult<Json<DataResponse<BulkModerateResponse>>> {
    ensure_decision(input.status)?;
    if input.photo_ids.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "photo_ids must not be empty".into(),
        )));
    }
    if input.photo_ids.len() > MAX_BULK_MODERATION {
        return Err(AppError::Core(CoreError::Validation(format!(
            "At most {MAX_BULK_MODERATION} photos per request"
        ))));
    }
    let event = owned_event(&state.pool, &user, event_id).await?;

    let mut ids = input.photo_ids;
    ids.sort_unstable();
    ids.dedup();

    let mut result = BulkModerateResponse {
        updated: Vec::new(),
        failed: Vec::new(),
    };
    for photo_id in ids {
        match moderate_one(&state.pool, event_id, photo_id, input.status).await {
            Ok(photo) => {
                if input.status == PhotoStatus::Approved {
                    auto_place(&state.pool, &event, &photo).await;
                }
                result.updated.push(photo_id);
            }
            Err(AppError::Core(e)) => result.failed.push(BulkModerationFailure {
                photo_id,
                error: e.to_string(),
            }),
            Err(other) => return Err(other),
        }
    }

    tracing::info!(
        event_id,
        status = %input.status,
        updated = result.updated.len(),
        failed = result.failed.len(),
        user_id = user.user_id,
        "Bulk moderation applied",
    );
    Ok(Json(DataResponse { data: result }))
}

/// DELETE /api/v1/events/{id}/photos/{photo_id}
///
/// Soft delete; the file stays on disk.
pub async fn delete_photo(
    RequireHost(user): RequireHost,
    State(state): State<AppState>,
    Path((event_id, photo_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    owned_event(&state.pool, &user, event_id).await?;
    moderate_one(&state.pool, event_id, photo_id, PhotoStatus::Deleted).await?;
    tracing::info!(event_id, photo_id, user_id = user.user_id, "Photo deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(filename: Option<&str>, content_type: Option<&str>) -> UploadedFile {
        UploadedFile {
            filename: filename.map(str::to_string),
            content_type: content_type.map(str::to_string),
            data: Bytes::from_static(&[1, 2, 3]),
        }
    }

    #[test]
    fn declared_mime_wins() {
        let f = file(Some("party.png"), Some("image/jpeg"));
        assert_eq!(effective_mime(&f).as_deref(), Some("image/jpeg"));
    }

    #[test]
    fn octet_stream_falls_back_to_filename() {
        let f = file(Some("clip.MOV"), Some("application/octet-stream"));
        assert_eq!(effective_mime(&f).as_deref(), Some("video/quicktime"));
        assert_eq!(effective_mime(&file(None, None)), None);
    }

    #[test]
    fn status_filter_is_parsed_and_normalised() {
        let statuses = parse_statuses(Some("pending, approved")).unwrap();
        assert_eq!(statuses, vec!["PENDING", "APPROVED"]);
        assert!(parse_statuses(None).unwrap().is_empty());
        assert!(parse_statuses(Some("lost")).is_err());
    }

    #[test]
    fn only_approve_and_reject_are_decisions() {
        assert!(ensure_decision(PhotoStatus::Approved).is_ok());
        assert!(ensure_decision(PhotoStatus::Rejected).is_ok());
        assert!(ensure_decision(PhotoStatus::Deleted).is_err());
        assert!(ensure_decision(PhotoStatus::Pending).is_err());
    }
}
