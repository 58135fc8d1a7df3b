//! Handlers for host-managed events and the public event view.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use gaestefotos_core::error::CoreError;
use gaestefotos_core::event_config::{validate_design_config, validate_feature_config, FeatureConfig};
use gaestefotos_core::feature_flags::EffectiveFlag;
use gaestefotos_core::slug::{slugify, with_suffix};
use gaestefotos_core::types::{DbId, Timestamp};
use gaestefotos_core::upload_window::{upload_window_state, validate_event_dates};
use gaestefotos_db::models::category::Category;
use gaestefotos_db::models::event::{CreateEvent, Event, UpdateEvent};
use gaestefotos_db::repositories::{CategoryRepo, EventRepo};
use serde::Serialize;
use sqlx::PgPool;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::features::EventFeatures;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireHost;
use crate::query::PaginationQuery;
use crate::response::DataResponse;
use crate::state::AppState;

/// Give up looking for a free slug suffix after this many tries.
const MAX_SLUG_ATTEMPTS: u32 = 500;

// ---------------------------------------------------------------------------
// Shared lookups
// ---------------------------------------------------------------------------

/// Load an event the caller may manage: its host, or any admin.
pub(crate) async fn owned_event(pool: &PgPool, user: &AuthUser, id: DbId) -> AppResult<Event> {
    let event = EventRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Event", id }))?;
    if !user.is_admin() && event.host_id != user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not manage this event".into(),
        )));
    }
    Ok(event)
}

/// Load an active event by slug for guest endpoints. Inactive and deleted
/// events are reported as missing.
pub(crate) async fn public_event(pool: &PgPool, slug: &str) -> AppResult<Event> {
    EventRepo::find_by_slug(pool, slug)
        .await?
        .filter(|e| e.is_active)
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFoundByKey {
                entity: "Event",
                key: slug.to_string(),
            })
        })
}

/// Load an active event by id for guest endpoints addressed by id.
pub(crate) async fn active_event(pool: &PgPool, id: DbId) -> AppResult<Event> {
    EventRepo::find_by_id(pool, id)
        .await?
        .filter(|e| e.is_active)
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Event", id }))
}

/// 403 with the window message unless guests may upload right now.
pub(crate) fn ensure_accepting_uploads(event: &Event, features: &EventFeatures) -> AppResult<()> {
    if !features.config.allow_uploads {
        return Err(AppError::Core(CoreError::Forbidden(
            "This event does not accept uploads".into(),
        )));
    }
    let window = upload_window_state(event.is_active, event.starts_at, event.ends_at, Utc::now());
    if !window.is_open() {
        return Err(AppError::Core(CoreError::Forbidden(window.message().into())));
    }
    Ok(())
}

fn validation(msg: String) -> AppError {
    AppError::Core(CoreError::Validation(msg))
}

async fn unique_slug(pool: &PgPool, title: &str) -> AppResult<String> {
    let base = slugify(title);
    if !EventRepo::slug_taken(pool, &base).await? {
        return Ok(base);
    }
    for n in 2..=MAX_SLUG_ATTEMPTS {
        let candidate = with_suffix(&base, n);
        if !EventRepo::slug_taken(pool, &candidate).await? {
            return Ok(candidate);
        }
    }
    Err(AppError::Core(CoreError::Conflict(format!(
        "No free slug for '{base}'"
    ))))
}

// ---------------------------------------------------------------------------
// Host handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/events
pub async fn create_event(
    RequireHost(user): RequireHost,
    State(state): State<AppState>,
    Json(input): Json<CreateEvent>,
) -> AppResult<(StatusCode, Json<DataResponse<Event>>)> {
    input.validate()?;
    validate_event_dates(input.starts_at, input.ends_at).map_err(validation)?;

    let design = input
        .design_config
        .clone()
        .unwrap_or_else(|| serde_json::json!({}));
    let feature = input
        .feature_config
        .clone()
        .unwrap_or_else(|| serde_json::json!({}));
    validate_design_config(&design).map_err(validation)?;
    validate_feature_config(&feature).map_err(validation)?;

    let slug = unique_slug(&state.pool, &input.title).await?;
    let event =
        EventRepo::create(&state.pool, user.user_id, &slug, &input, &design, &feature).await?;

    tracing::info!(event_id = event.id, slug = %event.slug, user_id = user.user_id, "Event created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: event })))
}

/// GET /api/v1/events
///
/// Hosts see their own events, admins see all.
pub async fn list_events(
    RequireHost(user): RequireHost,
    State(state): State<AppState>,
    Query(page): Query<PaginationQuery>,
) -> AppResult<Json<DataResponse<Vec<Event>>>> {
    let host_filter = (!user.is_admin()).then_some(user.user_id);
    let events = EventRepo::list(&state.pool, host_filter, page.limit(), page.offset()).await?;
    Ok(Json(DataResponse { data: events }))
}

/// GET /api/v1/events/{id}
pub async fn get_event(
    RequireHost(user): RequireHost,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Event>>> {
    let event = owned_event(&state.pool, &user, id).await?;
    Ok(Json(DataResponse { data: event }))
}

/// PUT /api/v1/events/{id}
pub async fn update_event(
    RequireHost(user): RequireHost,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateEvent>,
) -> AppResult<Json<DataResponse<Event>>> {
    input.validate()?;
    let current = owned_event(&state.pool, &user, id).await?;

    validate_event_dates(
        input.starts_at.or(current.starts_at),
        input.ends_at.or(current.ends_at),
    )
    .map_err(validation)?;
    if let Some(design) = &input.design_config {
        validate_design_config(design).map_err(validation)?;
    }
    if let Some(feature) = &input.feature_config {
        validate_feature_config(feature).map_err(validation)?;
    }

    let event = EventRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Event", id }))?;

    tracing::info!(event_id = id, user_id = user.user_id, "Event updated");
    Ok(Json(DataResponse { data: event }))
}

/// DELETE /api/v1/events/{id}
///
/// Soft delete. The slug stays reserved.
pub async fn delete_event(
    RequireHost(user): RequireHost,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    owned_event(&state.pool, &user, id).await?;
    if !EventRepo::soft_delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "Event", id }));
    }
    tracing::info!(event_id = id, user_id = user.user_id, "Event deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Public view
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct UploadWindowView {
    pub open: bool,
    pub message: &'static str,
}

/// What a guest's browser needs to render the event.
#[derive(Debug, Serialize)]
pub struct PublicEventView {
    pub id: DbId,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: Option<Timestamp>,
    pub ends_at: Option<Timestamp>,
    pub design_config: serde_json::Value,
    pub features: FeatureConfig,
    pub flags: Vec<EffectiveFlag>,
    pub categories: Vec<Category>,
    pub upload_window: UploadWindowView,
}

/// GET /api/v1/public/events/{slug}
pub async fn get_public_event(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<PublicEventView>>> {
    let event = public_event(&state.pool, &slug).await?;
    let (features, _) = EventFeatures::load(&state.pool, &event).await?;
    let categories = CategoryRepo::list_for_event(&state.pool, event.id, false).await?;

    let window = if features.config.allow_uploads {
        upload_window_state(event.is_active, event.starts_at, event.ends_at, Utc::now())
    } else {
        gaestefotos_core::upload_window::WindowState::Inactive
    };

    Ok(Json(DataResponse {
        data: PublicEventView {
            id: event.id,
            title: event.title,
            slug: event.slug,
            description: event.description,
            location: event.location,
            starts_at: event.starts_at,
            ends_at: event.ends_at,
            design_config: event.design_config,
            features: features.config,
            flags: features.flags,
            categories,
            upload_window: UploadWindowView {
                open: window.is_open(),
                message: window.message(),
            },
        },
    }))
}
