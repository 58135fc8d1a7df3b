//! Handlers for the drawbot and spinner queues.
//!
//! Both booths share these handlers. The router mounts them once per
//! [`BoothKind`] and passes the kind as a request extension.

use std::str::FromStr;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use gaestefotos_core::api_keys::scopes;
use gaestefotos_core::booth::{clip_error_message, BoothJobStatus, BoothKind};
use gaestefotos_core::error::CoreError;
use gaestefotos_core::types::DbId;
use gaestefotos_db::models::booth_job::{
    BoothJob, BoothJobWithPosition, EnqueueBoothJob, UpdateBoothJobStatus,
};
use gaestefotos_db::repositories::{BoothJobRepo, PhotoRepo};
use sqlx::PgPool;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::features::EventFeatures;
use crate::handlers::events::{active_event, ensure_accepting_uploads, owned_event};
use crate::middleware::api_key::ApiKeyAuth;
use crate::middleware::guest::GuestRateLimit;
use crate::middleware::rbac::RequireHost;
use crate::response::DataResponse;
use crate::state::AppState;

fn job_not_found(kind: BoothKind, id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: kind.entity(),
        id,
    })
}

async fn load_job(pool: &PgPool, kind: BoothKind, id: DbId) -> AppResult<BoothJob> {
    BoothJobRepo::find_by_id(pool, kind, id)
        .await?
        .ok_or_else(|| job_not_found(kind, id))
}

fn job_status(job: &BoothJob) -> AppResult<BoothJobStatus> {
    BoothJobStatus::from_str(&job.status).map_err(AppError::InternalError)
}

/// Validate and apply a status change, reporting lost races as 409.
async fn apply_transition(
    pool: &PgPool,
    kind: BoothKind,
    job: &BoothJob,
    to: BoothJobStatus,
    error_message: Option<&str>,
) -> AppResult<BoothJob> {
    let from = job_status(job)?;
    from.validate_transition(to)
        .map_err(|e| AppError::Core(CoreError::Validation(e)))?;
    BoothJobRepo::transition(pool, kind, job.id, from, to, error_message)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(format!(
                "{} {} was changed concurrently",
                kind.entity(),
                job.id
            )))
        })
}

// ---------------------------------------------------------------------------
// Guests
// ---------------------------------------------------------------------------

/// POST /api/v1/events/{id}/{drawbot|spinner}
pub async fn enqueue_job(
    GuestRateLimit(ip): GuestRateLimit,
    Extension(kind): Extension<BoothKind>,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
    Json(input): Json<EnqueueBoothJob>,
) -> AppResult<(StatusCode, Json<DataResponse<BoothJobWithPosition>>)> {
    input.validate()?;
    let event = active_event(&state.pool, event_id).await?;
    let (features, _) = EventFeatures::load(&state.pool, &event).await?;
    ensure_accepting_uploads(&event, &features)?;
    EventFeatures::require(features.booth_enabled(kind), kind.flag_key())?;

    if let Some(photo_id) = input.photo_id {
        PhotoRepo::find(&state.pool, event_id, photo_id)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Validation(format!(
                    "Photo {photo_id} does not belong to this event"
                )))
            })?;
    }

    let job = BoothJobRepo::enqueue(&state.pool, kind, event_id, &input).await?;
    let position = BoothJobRepo::position(&state.pool, kind, &job).await?;

    tracing::info!(
        booth = %kind,
        event_id,
        job_id = job.id,
        position,
        client_ip = %ip.0,
        "Booth job enqueued",
    );
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: BoothJobWithPosition { job, position },
        }),
    ))
}

/// GET /api/v1/{drawbot|spinner}/jobs/{id}
pub async fn get_job(
    Extension(kind): Extension<BoothKind>,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<BoothJobWithPosition>>> {
    let job = BoothJobRepo::find_with_position(&state.pool, kind, id)
        .await?
        .ok_or_else(|| job_not_found(kind, id))?;
    Ok(Json(DataResponse { data: job }))
}

/// GET /api/v1/events/{id}/{drawbot|spinner}/queue
///
/// Public, for display screens next to the booth.
pub async fn list_queue(
    Extension(kind): Extension<BoothKind>,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<BoothJobWithPosition>>>> {
    active_event(&state.pool, event_id).await?;
    let jobs = BoothJobRepo::list_queue(&state.pool, kind, event_id).await?;
    Ok(Json(DataResponse { data: jobs }))
}

// ---------------------------------------------------------------------------
// Hosts
// ---------------------------------------------------------------------------

/// POST /api/v1/events/{id}/{drawbot|spinner}/jobs/{job_id}/cancel
pub async fn cancel_job(
    RequireHost(user): RequireHost,
    Extension(kind): Extension<BoothKind>,
    State(state): State<AppState>,
    Path((event_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<BoothJob>>> {
    owned_event(&state.pool, &user, event_id).await?;
    let job = load_job(&state.pool, kind, id).await?;
    if job.event_id != event_id {
        return Err(job_not_found(kind, id));
    }
    let job = apply_transition(&state.pool, kind, &job, BoothJobStatus::Cancelled, None).await?;
    tracing::info!(booth = %kind, event_id, job_id = id, user_id = user.user_id, "Booth job cancelled");
    Ok(Json(DataResponse { data: job }))
}

// ---------------------------------------------------------------------------
// Booth hardware
// ---------------------------------------------------------------------------

/// POST /api/v1/booth/{drawbot|spinner}/next
///
/// Claims the oldest queued job for the key's event, or across all events
/// for keys without an event. `data` is `null` when the queue is empty.
pub async fn claim_next(
    auth: ApiKeyAuth,
    Extension(kind): Extension<BoothKind>,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Option<BoothJob>>>> {
    auth.require_scope(scopes::BOOTH_WRITE)?;
    let job = BoothJobRepo::claim_next(&state.pool, kind, auth.key.event_id, Some(auth.key.id))
        .await?;
    if let Some(job) = &job {
        tracing::info!(
            booth = %kind,
            event_id = job.event_id,
            job_id = job.id,
            api_key_id = auth.key.id,
            "Booth job claimed",
        );
    }
    Ok(Json(DataResponse { data: job }))
}

/// PUT /api/v1/booth/{drawbot|spinner}/jobs/{id}
///
/// Only the key that claimed the job through `/next` may report on it.
pub async fn report_status(
    auth: ApiKeyAuth,
    Extension(kind): Extension<BoothKind>,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateBoothJobStatus>,
) -> AppResult<Json<DataResponse<BoothJob>>> {
    auth.require_scope(scopes::BOOTH_WRITE)?;
    input.validate()?;
    let to = BoothJobStatus::from_str(&input.status)
        .map_err(|e| AppError::Core(CoreError::Validation(e)))?;

    let job = load_job(&state.pool, kind, id).await?;
    auth.ensure_event(job.event_id)?;
    if job.claimed_by_key_id != Some(auth.key.id) {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "Job {id} is not claimed by this API key"
        ))));
    }

    let message = input.error_message.as_deref().map(clip_error_message);
    let job = apply_transition(&state.pool, kind, &job, to, message.as_deref()).await?;

    if to == BoothJobStatus::Failed {
        tracing::warn!(
            booth = %kind,
            job_id = id,
            error = message.as_deref().unwrap_or(""),
            "Booth job failed",
        );
    } else {
        tracing::info!(booth = %kind, job_id = id, status = %to, "Booth job status reported");
    }
    Ok(Json(DataResponse { data: job }))
}
