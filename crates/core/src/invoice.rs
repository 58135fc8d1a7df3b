//! Invoice numbering, VAT arithmetic and status transitions.
//!
//! All money amounts are integer cents; VAT rates are basis points
//! (`1900` = 19 %).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// German standard VAT rate in basis points.
pub const DEFAULT_VAT_RATE_BP: i32 = 1900;

/// Largest VAT rate accepted (50 %).
pub const MAX_VAT_RATE_BP: i32 = 5000;

/// Largest net amount accepted on one invoice (1 billion EUR).
pub const MAX_NET_CENTS: i64 = 100_000_000_000;

/// Prefix of every invoice number.
pub const INVOICE_NUMBER_PREFIX: &str = "GF";

/// Format an invoice number: `GF-2026-00042`.
pub fn format_invoice_number(year: i32, sequence: i64) -> String {
    format!("{INVOICE_NUMBER_PREFIX}-{year}-{sequence:05}")
}

/// VAT and gross amounts derived from a net amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InvoiceTotals {
    pub net_cents: i64,
    pub vat_rate_bp: i32,
    pub vat_cents: i64,
    pub gross_cents: i64,
}

/// Compute VAT with half-up rounding to the cent.
pub fn compute_totals(net_cents: i64, vat_rate_bp: i32) -> Result<InvoiceTotals, String> {
    if net_cents < 0 {
        return Err("net amount must not be negative".to_string());
    }
    if !(0..=MAX_VAT_RATE_BP).contains(&vat_rate_bp) {
        return Err(format!(
            "vat_rate_bp must be between 0 and {MAX_VAT_RATE_BP}, got {vat_rate_bp}"
        ));
    }
    if net_cents > MAX_NET_CENTS {
        return Err(format!(
            "net amount must not exceed {MAX_NET_CENTS} cents, got {net_cents}"
        ));
    }
    let vat_cents = net_cents
        .checked_mul(i64::from(vat_rate_bp))
        .and_then(|v| v.checked_add(5_000))
        .map(|v| v / 10_000)
        .ok_or_else(|| "VAT amount out of range".to_string())?;
    let gross_cents = net_cents
        .checked_add(vat_cents)
        .ok_or_else(|| "gross amount out of range".to_string())?;
    Ok(InvoiceTotals {
        net_cents,
        vat_rate_bp,
        vat_cents,
        gross_cents,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Draft,
    Issued,
    Paid,
    Cancelled,
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 4] = [
        InvoiceStatus::Draft,
        InvoiceStatus::Issued,
        InvoiceStatus::Paid,
        InvoiceStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "DRAFT",
            InvoiceStatus::Issued => "ISSUED",
            InvoiceStatus::Paid => "PAID",
            InvoiceStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn can_transition(self, to: InvoiceStatus) -> bool {
        matches!(
            (self, to),
            (InvoiceStatus::Draft, InvoiceStatus::Issued)
                | (InvoiceStatus::Draft, InvoiceStatus::Cancelled)
                | (InvoiceStatus::Issued, InvoiceStatus::Paid)
                | (InvoiceStatus::Issued, InvoiceStatus::Cancelled)
        )
    }

    pub fn validate_transition(self, to: InvoiceStatus) -> Result<(), String> {
        if self.can_transition(to) {
            Ok(())
        } else {
            Err(format!("Cannot move invoice from {self} to {to}"))
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InvoiceStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown invoice status '{s}'"))
    }
}
