//! Handlers for invoices. Admins draft and advance them, hosts read their own.

use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use gaestefotos_core::error::CoreError;
use gaestefotos_core::invoice::{compute_totals, InvoiceStatus, DEFAULT_VAT_RATE_BP};
use gaestefotos_core::types::DbId;
use gaestefotos_db::models::invoice::{CreateInvoice, Invoice, NewInvoice};
use gaestefotos_db::repositories::{EventRepo, InvoiceRepo, PackageRepo, UserRepo};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireHost};
use crate::query::PaginationQuery;
use crate::response::DataResponse;
use crate::state::AppState;

fn invoice_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Invoice", id })
}

/// GET /api/v1/admin/invoices
pub async fn list_invoices(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(page): Query<PaginationQuery>,
) -> AppResult<Json<DataResponse<Vec<Invoice>>>> {
    let invoices = InvoiceRepo::list(&state.pool, None, page.limit(), page.offset()).await?;
    Ok(Json(DataResponse { data: invoices }))
}

/// GET /api/v1/invoices
pub async fn list_my_invoices(
    RequireHost(user): RequireHost,
    State(state): State<AppState>,
    Query(page): Query<PaginationQuery>,
) -> AppResult<Json<DataResponse<Vec<Invoice>>>> {
    let invoices =
        InvoiceRepo::list(&state.pool, Some(user.user_id), page.limit(), page.offset()).await?;
    Ok(Json(DataResponse { data: invoices }))
}

/// POST /api/v1/admin/invoices
///
/// Creates a `DRAFT`. Without `net_cents` the package price is billed.
pub async fn create_invoice(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateInvoice>,
) -> AppResult<(StatusCode, Json<DataResponse<Invoice>>)> {
    input.validate()?;

    UserRepo::find_by_id(&state.pool, input.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: input.user_id,
        }))?;

    if let Some(event_id) = input.event_id {
        let event = EventRepo::find_by_id(&state.pool, event_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Event",
                id: event_id,
            }))?;
        if event.host_id != input.user_id {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Event {event_id} does not belong to user {}",
                input.user_id
            ))));
        }
    }

    let package = match input.package_id {
        Some(id) => Some(
            PackageRepo::find_by_id(&state.pool, id)
                .await?
                .ok_or(AppError::Core(CoreError::NotFound { entity: "Package", id }))?,
        ),
        None => None,
    };

    let net_cents = match (input.net_cents, &package) {
        (Some(net), _) => net,
        (None, Some(package)) => package.price_cents,
        (None, None) => {
            return Err(AppError::Core(CoreError::Validation(
                "net_cents is required when no package is given".into(),
            )))
        }
    };

    let totals = compute_totals(net_cents, input.vat_rate_bp.unwrap_or(DEFAULT_VAT_RATE_BP))
        .map_err(|e| AppError::Core(CoreError::Validation(e)))?;

    let invoice = InvoiceRepo::create(
        &state.pool,
        &NewInvoice {
            user_id: input.user_id,
            event_id: input.event_id,
            package_id: input.package_id,
            description: input.description,
            net_cents: totals.net_cents,
            vat_rate_bp: totals.vat_rate_bp,
            vat_cents: totals.vat_cents,
            gross_cents: totals.gross_cents,
        },
    )
    .await?;

    tracing::info!(
        invoice_id = invoice.id,
        number = %invoice.invoice_number,
        gross_cents = invoice.gross_cents,
        user_id = admin.user_id,
        "Invoice drafted",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: invoice })))
}

#[derive(Debug, Deserialize)]
pub struct InvoiceStatusRequest {
    pub status: InvoiceStatus,
}

/// POST /api/v1/admin/invoices/{id}/status
pub async fn update_invoice_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<InvoiceStatusRequest>,
) -> AppResult<Json<DataResponse<Invoice>>> {
    let current = InvoiceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| invoice_not_found(id))?;
    let from = InvoiceStatus::from_str(&current.status).map_err(AppError::InternalError)?;
    from.validate_transition(input.status)
        .map_err(|e| AppError::Core(CoreError::Validation(e)))?;

    let invoice = InvoiceRepo::transition_status(&state.pool, id, from, input.status)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(format!(
                "Invoice {id} was changed concurrently"
            )))
        })?;

    tracing::info!(
        invoice_id = id,
        from = %from,
        to = %input.status,
        user_id = admin.user_id,
        "Invoice status updated",
    );
    Ok(Json(DataResponse { data: invoice }))
}
