//! Repository for the `invoices` table.

use gaestefotos_core::invoice::{format_invoice_number, InvoiceStatus};
use gaestefotos_core::types::DbId;
use sqlx::PgPool;

use crate::models::invoice::{Invoice, NewInvoice};

const COLUMNS: &str = "id, invoice_number, user_id, event_id, package_id, description, \
                        net_cents, vat_rate_bp, vat_cents, gross_cents, status, \
                        issued_at, paid_at, cancelled_at, created_at, updated_at";

pub struct InvoiceRepo;

impl InvoiceRepo {
    /// Insert a draft invoice, drawing the next number from
    /// `invoice_number_seq`.
    pub async fn create(pool: &PgPool, input: &NewInvoice) -> Result<Invoice, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let (sequence, year): (i64, i32) = sqlx::query_as(
            "SELECT nextval('invoice_number_seq'), EXTRACT(YEAR FROM NOW())::INT",
        )
        .fetch_one(&mut *tx)
        .await?;
        let number = format_invoice_number(year, sequence);

        let query = format!(
            "INSERT INTO invoices
                (invoice_number, user_id, event_id, package_id, description,
                 net_cents, vat_rate_bp, vat_cents, gross_cents)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        let invoice = sqlx::query_as::<_, Invoice>(&query)
            .bind(&number)
            .bind(input.user_id)
            .bind(input.event_id)
            .bind(input.package_id)
            .bind(&input.description)
            .bind(input.net_cents)
            .bind(input.vat_rate_bp)
            .bind(input.vat_cents)
            .bind(input.gross_cents)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(invoice)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Invoice>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM invoices WHERE id = $1");
        sqlx::query_as::<_, Invoice>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List invoices, newest first. `user_id = None` lists all.
    pub async fn list(
        pool: &PgPool,
        user_id: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Invoice>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM invoices
             WHERE ($1::BIGINT IS NULL OR user_id = $1)
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Invoice>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Move an invoice from `from` to `to`, stamping the matching timestamp.
    ///
    /// Returns `None` if the invoice is no longer in `from`.
    pub async fn transition_status(
        pool: &PgPool,
        id: DbId,
        from: InvoiceStatus,
        to: InvoiceStatus,
    ) -> Result<Option<Invoice>, sqlx::Error> {
        let query = format!(
            "UPDATE invoices SET
                status = $3,
                issued_at = CASE WHEN $3 = 'ISSUED' THEN NOW() ELSE issued_at END,
                paid_at = CASE WHEN $3 = 'PAID' THEN NOW() ELSE paid_at END,
                cancelled_at = CASE WHEN $3 = 'CANCELLED' THEN NOW() ELSE cancelled_at END
             WHERE id = $1 AND status = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invoice>(&query)
            .bind(id)
            .bind(from.as_str())
            .bind(to.as_str())
            .fetch_optional(pool)
            .await
    }
}
