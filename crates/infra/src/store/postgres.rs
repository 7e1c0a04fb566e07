//! Postgres-backed invoice request store.
//!
//! Expects the `invoice_requests` table:
//!
//! ```sql
//! CREATE TABLE invoice_requests (
//!     id                  UUID PRIMARY KEY,
//!     taker_cnpj          TEXT NOT NULL,
//!     service_city        TEXT NOT NULL,
//!     service_state       TEXT NOT NULL,
//!     service_value       NUMERIC NOT NULL,
//!     desired_issue_date  TIMESTAMPTZ NOT NULL,
//!     service_description TEXT NOT NULL,
//!     status              TEXT NOT NULL,
//!     invoice_number      TEXT,
//!     invoice_issue_date  TIMESTAMPTZ,
//!     created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! Single-record atomicity comes from running each operation as one
//! statement; the partial update uses `COALESCE` so `None` patch fields
//! leave the stored columns untouched.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use notafiscal_core::{InvoiceRequestId, StoreError};
use notafiscal_invoicing::{
    InvoiceRequest, InvoiceRequestPatch, InvoiceRequestStatus, NewInvoiceRequest,
};

use super::InvoiceRequestStore;

/// Postgres-backed store; listing order is `created_at` ascending.
#[derive(Debug, Clone)]
pub struct PostgresInvoiceRequestStore {
    pool: Arc<PgPool>,
}

impl PostgresInvoiceRequestStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

const RECORD_COLUMNS: &str = "id, taker_cnpj, service_city, service_state, service_value, \
     desired_issue_date, service_description, status, invoice_number, invoice_issue_date, \
     created_at, updated_at";

#[async_trait]
impl InvoiceRequestStore for PostgresInvoiceRequestStore {
    #[instrument(skip(self, input), err)]
    async fn create(&self, input: NewInvoiceRequest) -> Result<InvoiceRequest, StoreError> {
        let id = InvoiceRequestId::new();
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO invoice_requests (
                id, taker_cnpj, service_city, service_state, service_value,
                desired_issue_date, service_description, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {RECORD_COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(&input.taker_cnpj)
        .bind(&input.service_city)
        .bind(&input.service_state)
        .bind(input.service_value)
        .bind(input.desired_issue_date)
        .bind(&input.service_description)
        .bind(InvoiceRequestStatus::PendingEmission.as_str())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx("create invoice request", e))?;

        row_to_record(&row)
    }

    #[instrument(skip(self), err)]
    async fn find_all(&self) -> Result<Vec<InvoiceRequest>, StoreError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM invoice_requests
            ORDER BY created_at ASC, id ASC
            "#
        ))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx("list invoice requests", e))?;

        rows.iter().map(row_to_record).collect()
    }

    #[instrument(skip(self), err)]
    async fn find_by_id(
        &self,
        id: InvoiceRequestId,
    ) -> Result<Option<InvoiceRequest>, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM invoice_requests
            WHERE id = $1
            "#
        ))
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx("find invoice request", e))?;

        row.as_ref().map(row_to_record).transpose()
    }

    #[instrument(skip(self, patch), err)]
    async fn update(
        &self,
        id: InvoiceRequestId,
        patch: InvoiceRequestPatch,
    ) -> Result<Option<InvoiceRequest>, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE invoice_requests
            SET status = COALESCE($2, status),
                invoice_number = COALESCE($3, invoice_number),
                invoice_issue_date = COALESCE($4, invoice_issue_date),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {RECORD_COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(patch.status.map(|s| s.as_str()))
        .bind(patch.invoice_number)
        .bind(patch.invoice_issue_date)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx("update invoice request", e))?;

        row.as_ref().map(row_to_record).transpose()
    }
}

fn row_to_record(row: &PgRow) -> Result<InvoiceRequest, StoreError> {
    let status_text: String = column(row, "status")?;
    let status = InvoiceRequestStatus::parse(&status_text).ok_or_else(|| {
        StoreError::backend(format!("unknown status '{status_text}' in invoice_requests"))
    })?;

    Ok(InvoiceRequest {
        id: InvoiceRequestId::from_uuid(column(row, "id")?),
        taker_cnpj: column(row, "taker_cnpj")?,
        service_city: column(row, "service_city")?,
        service_state: column(row, "service_state")?,
        service_value: column::<Decimal>(row, "service_value")?,
        desired_issue_date: column::<DateTime<Utc>>(row, "desired_issue_date")?,
        service_description: column(row, "service_description")?,
        status,
        invoice_number: column::<Option<String>>(row, "invoice_number")?,
        invoice_issue_date: column::<Option<DateTime<Utc>>>(row, "invoice_issue_date")?,
        created_at: column::<DateTime<Utc>>(row, "created_at")?,
        updated_at: column::<DateTime<Utc>>(row, "updated_at")?,
    })
}

fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name)
        .map_err(|e| StoreError::backend(format!("column {name}: {e}")))
}

fn map_sqlx(op: &str, e: sqlx::Error) -> StoreError {
    StoreError::backend(format!("{op}: {e}"))
}
