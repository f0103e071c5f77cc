//! Database operations for invoices.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use helpdesk_core::{InvoiceId, InvoiceStatus, UserId};

use super::{DbPool, RepositoryError};
use crate::models::Invoice;

#[derive(Debug, sqlx::FromRow)]
struct InvoiceRow {
    id: i32,
    user_id: i32,
    invoice_no: String,
    amount: String,
    status: InvoiceStatus,
    due_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = RepositoryError;

    fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
        let amount = Decimal::from_str(&row.amount).map_err(|e| {
            RepositoryError::DataCorruption(format!(
                "invalid amount {:?} on invoice {}: {e}",
                row.amount, row.invoice_no
            ))
        })?;

        Ok(Self {
            id: InvoiceId::new(row.id),
            user_id: UserId::new(row.user_id),
            invoice_no: row.invoice_no,
            amount,
            status: row.status,
            due_date: row.due_date,
            created_at: row.created_at,
        })
    }
}

/// Repository for invoice database operations.
pub struct InvoiceRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> InvoiceRepository<'a> {
    /// Create a new invoice repository.
    #[must_use]
    pub const fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Find an invoice by its invoice number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if the stored amount cannot be
    /// parsed.
    pub async fn find_by_number(&self, invoice_no: &str) -> Result<Option<Invoice>, RepositoryError> {
        let row = sqlx::query_as::<_, InvoiceRow>(
            r"
            SELECT id, user_id, invoice_no, amount, status, due_date, created_at
            FROM invoices
            WHERE invoice_no = ?1
            ",
        )
        .bind(invoice_no)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(r.try_into()?)),
            None => Ok(None),
        }
    }

    /// Insert an invoice, replacing its mutable fields if the invoice number
    /// already exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(
        &self,
        user_id: UserId,
        invoice_no: &str,
        amount: Decimal,
        status: InvoiceStatus,
        due_date: DateTime<Utc>,
    ) -> Result<Invoice, RepositoryError> {
        let row = sqlx::query_as::<_, InvoiceRow>(
            r"
            INSERT INTO invoices (user_id, invoice_no, amount, status, due_date, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(invoice_no) DO UPDATE SET
                amount = excluded.amount,
                status = excluded.status,
                due_date = excluded.due_date
            RETURNING id, user_id, invoice_no, amount, status, due_date, created_at
            ",
        )
        .bind(user_id)
        .bind(invoice_no)
        .bind(amount.to_string())
        .bind(status)
        .bind(due_date)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }
}
