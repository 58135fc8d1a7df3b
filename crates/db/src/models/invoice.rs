//! Invoice model and DTOs.

use gaestefotos_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Invoice {
    pub id: DbId,
    pub invoice_number: String,
    pub user_id: DbId,
    pub event_id: Option<DbId>,
    pub package_id: Option<DbId>,
    pub description: Option<String>,
    pub net_cents: i64,
    pub vat_rate_bp: i32,
    pub vat_cents: i64,
    pub gross_cents: i64,
    pub status: String,
    pub issued_at: Option<Timestamp>,
    pub paid_at: Option<Timestamp>,
    pub cancelled_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Admin request to draft an invoice.
///
/// When `net_cents` is absent the package price is used.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateInvoice {
    pub user_id: DbId,
    pub event_id: Option<DbId>,
    pub package_id: Option<DbId>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub net_cents: Option<i64>,
    pub vat_rate_bp: Option<i32>,
}

/// Fully computed insert, built by the handler.
#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub user_id: DbId,
    pub event_id: Option<DbId>,
    pub package_id: Option<DbId>,
    pub description: Option<String>,
    pub net_cents: i64,
    pub vat_rate_bp: i32,
    pub vat_cents: i64,
    pub gross_cents: i64,
}
