//! HTTP client for the fiscal authority emission API.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use notafiscal_core::GatewayError;
use notafiscal_invoicing::{EmissionPayload, EmissionReceipt};

use super::EmissionGateway;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Gateway-side configuration (endpoint + credential).
///
/// A missing endpoint or credential is a startup failure, not a per-call
/// one: emission cannot work without them.
#[derive(Debug, Clone)]
pub struct FiscalConfig {
    pub endpoint: String,
    pub api_key: String,
    /// Upper bound on a single emission call; expiry is classified as
    /// `Unreachable`.
    pub timeout: Duration,
}

impl FiscalConfig {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Read configuration from `FISCAL_API_URL` / `FISCAL_API_KEY`.
    pub fn from_env() -> anyhow::Result<Self> {
        let endpoint = std::env::var("FISCAL_API_URL")
            .map_err(|_| anyhow::anyhow!("FISCAL_API_URL is not set"))?;
        let api_key = std::env::var("FISCAL_API_KEY")
            .map_err(|_| anyhow::anyhow!("FISCAL_API_KEY is not set"))?;
        Ok(Self::new(endpoint, api_key))
    }
}

/// Reqwest-backed emission gateway.
///
/// Configured once at startup and injected into the workflow as an
/// explicit collaborator.
#[derive(Debug)]
pub struct FiscalAuthorityClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl FiscalAuthorityClient {
    pub fn new(config: FiscalConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            endpoint: config.endpoint,
            api_key: config.api_key,
        })
    }
}

/// Wire shape of a successful emission response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmissionResponse {
    invoice_number: String,
    issue_date: String,
}

#[async_trait]
impl EmissionGateway for FiscalAuthorityClient {
    async fn emit(&self, payload: &EmissionPayload) -> Result<EmissionReceipt, GatewayError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("Authorization", &self.api_key)
            .json(payload)
            .send()
            .await
            .map_err(|e| GatewayError::unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), %body, "fiscal authority returned an error response");
            return Err(classify_status(status, body));
        }

        let body: EmissionResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::unreachable(format!("malformed emission response: {e}")))?;

        let issued_at = DateTime::parse_from_rfc3339(&body.issue_date)
            .map_err(|e| {
                GatewayError::unreachable(format!(
                    "malformed issue date '{}': {e}",
                    body.issue_date
                ))
            })?
            .with_timezone(&Utc);

        Ok(EmissionReceipt {
            invoice_number: body.invoice_number,
            issued_at,
        })
    }
}

fn classify_status(status: reqwest::StatusCode, body: String) -> GatewayError {
    let code = status.as_u16();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        GatewayError::unauthorized(code, body)
    } else if status.is_client_error() {
        GatewayError::bad_request(code, body)
    } else if status.is_server_error() {
        GatewayError::upstream_internal(code, body)
    } else {
        GatewayError::unreachable(format!("unexpected status {code}: {body}"))
    }
}
