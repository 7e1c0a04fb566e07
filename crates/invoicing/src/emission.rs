//! Types exchanged with the external fiscal authority.

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Wire payload sent to the fiscal authority (field names per its API).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionPayload {
    pub taker_cnpj: String,
    pub service_city: String,
    pub service_state: String,
    pub service_value: Decimal,
    /// RFC 3339 with milliseconds, UTC (`2024-12-31T00:00:00.000Z`).
    pub desired_issue_date: String,
    pub service_description: String,
}

/// Successful emission result, decoded and validated by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmissionReceipt {
    /// Invoice number assigned by the fiscal authority.
    pub invoice_number: String,
    /// Issuance instant confirmed by the fiscal authority.
    pub issued_at: DateTime<Utc>,
}

/// Canonical timestamp form used on the emission wire.
pub fn canonical_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_uses_camel_case_wire_names() {
        let payload = EmissionPayload {
            taker_cnpj: "12345678000195".to_string(),
            service_city: "São Paulo".to_string(),
            service_state: "SP".to_string(),
            service_value: "1500.50".parse().unwrap(),
            desired_issue_date: "2024-12-31T00:00:00.000Z".to_string(),
            service_description: "Consulting".to_string(),
        };

        let value = serde_json::to_value(&payload).unwrap();
        let object = value.as_object().unwrap();
        for key in [
            "takerCnpj",
            "serviceCity",
            "serviceState",
            "serviceValue",
            "desiredIssueDate",
            "serviceDescription",
        ] {
            assert!(object.contains_key(key), "missing wire field {key}");
        }
        assert_eq!(object.len(), 6);
    }

    #[test]
    fn canonical_timestamp_keeps_millisecond_precision_and_utc() {
        let instant = DateTime::parse_from_rfc3339("2024-05-15T11:00:00.000Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(canonical_timestamp(instant), "2024-05-15T11:00:00.000Z");
    }
}
