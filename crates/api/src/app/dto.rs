use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use notafiscal_invoicing::emission::canonical_timestamp;
use notafiscal_invoicing::{InvoiceRequest, NewInvoiceRequest};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    pub taker_cnpj: String,
    pub service_city: String,
    pub service_state: String,
    pub service_value: Decimal,
    pub desired_issue_date: String, // RFC3339
    pub service_description: String,
}

impl CreateInvoiceRequest {
    /// Validate the boundary constraints and convert into the domain input.
    ///
    /// The core trusts these constraints and never re-checks them.
    pub fn into_domain(self) -> Result<NewInvoiceRequest, axum::response::Response> {
        if self.taker_cnpj.len() != 14 || !self.taker_cnpj.bytes().all(|b| b.is_ascii_digit()) {
            return Err(validation_error("takerCnpj must be exactly 14 digits"));
        }
        if self.service_city.trim().is_empty() {
            return Err(validation_error("serviceCity is required"));
        }
        if self.service_state.chars().count() != 2 {
            return Err(validation_error("serviceState must have 2 characters (UF)"));
        }
        if self.service_value <= Decimal::ZERO {
            return Err(validation_error("serviceValue must be positive"));
        }
        let desired_issue_date = match DateTime::parse_from_rfc3339(&self.desired_issue_date) {
            Ok(dt) => dt.with_timezone(&Utc),
            Err(_) => {
                return Err(validation_error(
                    "desiredIssueDate must be a valid RFC3339 timestamp",
                ))
            }
        };
        if self.service_description.trim().is_empty() {
            return Err(validation_error("serviceDescription is required"));
        }

        Ok(NewInvoiceRequest {
            taker_cnpj: self.taker_cnpj,
            service_city: self.service_city,
            service_state: self.service_state,
            service_value: self.service_value,
            desired_issue_date,
            service_description: self.service_description,
        })
    }
}

fn validation_error(message: &'static str) -> axum::response::Response {
    errors::json_error(StatusCode::BAD_REQUEST, "validation_error", message)
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn invoice_request_to_json(record: &InvoiceRequest) -> serde_json::Value {
    serde_json::json!({
        "id": record.id.to_string(),
        "takerCnpj": record.taker_cnpj,
        "serviceCity": record.service_city,
        "serviceState": record.service_state,
        "serviceValue": record.service_value,
        "desiredIssueDate": canonical_timestamp(record.desired_issue_date),
        "serviceDescription": record.service_description,
        "status": record.status.as_str(),
        "invoiceNumber": record.invoice_number,
        "invoiceIssueDate": record.invoice_issue_date.map(canonical_timestamp),
        "createdAt": canonical_timestamp(record.created_at),
        "updatedAt": canonical_timestamp(record.updated_at),
    })
}
