//! Invoice domain model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use helpdesk_core::{InvoiceId, InvoiceStatus, UserId};

/// A billing invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique invoice ID.
    pub id: InvoiceId,
    /// Customer the invoice was issued to.
    pub user_id: UserId,
    /// Human-facing invoice number (e.g., "INV-2001").
    pub invoice_no: String,
    /// Invoice amount.
    pub amount: Decimal,
    /// Payment status.
    pub status: InvoiceStatus,
    /// Payment due date.
    pub due_date: DateTime<Utc>,
    /// When the invoice was created.
    pub created_at: DateTime<Utc>,
}
