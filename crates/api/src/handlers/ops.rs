//! Admin operations views.

use axum::extract::State;
use axum::Json;
use gaestefotos_core::booth::BoothKind;
use gaestefotos_core::rate_limit::WindowSnapshot;
use gaestefotos_db::models::booth_job::QueueCounts;
use gaestefotos_db::repositories::BoothJobRepo;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/admin/ops/rate-limits
pub async fn rate_limits(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<WindowSnapshot>>>> {
    Ok(Json(DataResponse {
        data: state.rate_limiter.snapshot(),
    }))
}

#[derive(Debug, Serialize)]
pub struct QueueReport {
    pub booth: BoothKind,
    #[serde(flatten)]
    pub counts: QueueCounts,
}

/// GET /api/v1/admin/ops/queues
pub async fn queues(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<QueueReport>>>> {
    let mut reports = Vec::with_capacity(BoothKind::ALL.len());
    for booth in BoothKind::ALL {
        let counts = BoothJobRepo::counts(&state.pool, booth).await?;
        reports.push(QueueReport { booth, counts });
    }
    Ok(Json(DataResponse { data: reports }))
}
