use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use notafiscal_core::{EmissionError, InvoiceRequestId};

use crate::emission::EmissionPayload;

/// Invoice request status lifecycle.
///
/// `PendingEmission` is the only state from which emission may proceed;
/// `Issued` and `Cancelled` are terminal for emission. Cancellation is an
/// external path: nothing in this service produces it, but the workflow
/// must respect it when present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceRequestStatus {
    PendingEmission,
    Issued,
    Cancelled,
}

impl InvoiceRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingEmission => "PENDING_EMISSION",
            Self::Issued => "ISSUED",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING_EMISSION" => Some(Self::PendingEmission),
            "ISSUED" => Some(Self::Issued),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl core::fmt::Display for InvoiceRequestStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The central record: a client's request for a fiscal invoice.
///
/// Invariants: `invoice_number` and `invoice_issue_date` are both `None`
/// until a successful emission sets both; `status == Issued` exactly when
/// `invoice_number` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRequest {
    pub id: InvoiceRequestId,
    /// Service recipient tax identifier, 14 numeric digits.
    pub taker_cnpj: String,
    pub service_city: String,
    /// Two-character UF code.
    pub service_state: String,
    pub service_value: Decimal,
    pub desired_issue_date: DateTime<Utc>,
    pub service_description: String,
    pub status: InvoiceRequestStatus,
    pub invoice_number: Option<String>,
    pub invoice_issue_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InvoiceRequest {
    /// Guard for the emission workflow: only pending requests may be
    /// emitted. `Issued` is reported before `Cancelled` for messaging
    /// clarity; the states are mutually exclusive.
    pub fn ensure_emittable(&self) -> Result<(), EmissionError> {
        match self.status {
            InvoiceRequestStatus::Issued => Err(EmissionError::invalid_state(
                "invoice already issued for this request",
            )),
            InvoiceRequestStatus::Cancelled => Err(EmissionError::invalid_state(
                "cannot issue invoice for a cancelled request",
            )),
            InvoiceRequestStatus::PendingEmission => Ok(()),
        }
    }

    /// Build the gateway payload from the record's immutable fields.
    pub fn emission_payload(&self) -> EmissionPayload {
        EmissionPayload {
            taker_cnpj: self.taker_cnpj.clone(),
            service_city: self.service_city.clone(),
            service_state: self.service_state.clone(),
            service_value: self.service_value,
            desired_issue_date: crate::emission::canonical_timestamp(self.desired_issue_date),
            service_description: self.service_description.clone(),
        }
    }
}

/// Creation input: the six immutable fields.
///
/// Constraint checks (CNPJ shape, UF length, positive value, non-empty
/// description) happen at the boundary before this type is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInvoiceRequest {
    pub taker_cnpj: String,
    pub service_city: String,
    pub service_state: String,
    pub service_value: Decimal,
    pub desired_issue_date: DateTime<Utc>,
    pub service_description: String,
}

/// Partial update applied by the store; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceRequestPatch {
    pub status: Option<InvoiceRequestStatus>,
    pub invoice_number: Option<String>,
    pub invoice_issue_date: Option<DateTime<Utc>>,
}

impl InvoiceRequestPatch {
    /// Patch applied after a successful emission.
    pub fn issued(invoice_number: impl Into<String>, invoice_issue_date: DateTime<Utc>) -> Self {
        Self {
            status: Some(InvoiceRequestStatus::Issued),
            invoice_number: Some(invoice_number.into()),
            invoice_issue_date: Some(invoice_issue_date),
        }
    }

    /// Patch that only moves the status (external cancellation path).
    pub fn status_only(status: InvoiceRequestStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}
