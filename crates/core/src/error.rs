//! Error taxonomy for the emission pipeline.
//!
//! Every failure is a tagged variant constructed at the point of failure.
//! The HTTP boundary translates on the discriminant; message text is never
//! inspected.

use thiserror::Error;

/// Classification of a failed call to the external fiscal authority.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExternalServiceKind {
    /// The upstream rejected the payload (4xx, excluding authentication).
    BadRequest,
    /// The upstream rejected the configured credential (401).
    Unauthorized,
    /// The upstream reported its own internal failure (5xx).
    UpstreamInternal,
    /// No interpretable response: network failure, timeout, malformed body.
    Unreachable,
}

impl ExternalServiceKind {
    /// Stable external signal for this classification.
    pub fn as_signal(&self) -> &'static str {
        match self {
            Self::BadRequest => "upstream rejected request",
            Self::Unauthorized => "upstream authentication failure",
            Self::UpstreamInternal => "upstream internal failure",
            Self::Unreachable => "upstream unreachable",
        }
    }
}

impl core::fmt::Display for ExternalServiceKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_signal())
    }
}

/// A classified failure from the external emission gateway.
///
/// Retains the raw upstream status and body for logging and the optional
/// `details` field of error responses. Consumers key off `kind`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayError {
    pub kind: ExternalServiceKind,
    /// Raw upstream HTTP status, when a response was received.
    pub status: Option<u16>,
    /// Raw upstream body, or the transport error message.
    pub detail: String,
}

impl GatewayError {
    pub fn bad_request(status: u16, detail: impl Into<String>) -> Self {
        Self {
            kind: ExternalServiceKind::BadRequest,
            status: Some(status),
            detail: detail.into(),
        }
    }

    pub fn unauthorized(status: u16, detail: impl Into<String>) -> Self {
        Self {
            kind: ExternalServiceKind::Unauthorized,
            status: Some(status),
            detail: detail.into(),
        }
    }

    pub fn upstream_internal(status: u16, detail: impl Into<String>) -> Self {
        Self {
            kind: ExternalServiceKind::UpstreamInternal,
            status: Some(status),
            detail: detail.into(),
        }
    }

    pub fn unreachable(detail: impl Into<String>) -> Self {
        Self {
            kind: ExternalServiceKind::Unreachable,
            status: None,
            detail: detail.into(),
        }
    }
}

impl core::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (status {status}): {}", self.kind, self.detail),
            None => write!(f, "{}: {}", self.kind, self.detail),
        }
    }
}

impl std::error::Error for GatewayError {}

/// Record store failure (backend-level, unclassified).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The storage backend failed to execute an operation.
    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// Failure of the invoice emission workflow.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EmissionError {
    /// The referenced invoice request does not exist.
    #[error("request not found")]
    NotFound,

    /// The request's current status forbids emission.
    #[error("{0}")]
    InvalidState(String),

    /// The external fiscal authority call failed, classified by the gateway.
    #[error("fiscal authority emission failed: {0}")]
    External(#[from] GatewayError),

    /// Local inconsistency after the external invoice was already issued.
    /// Terminal and non-retriable; requires manual reconciliation.
    #[error("{0}")]
    Internal(String),

    /// A store operation failed before the gateway was invoked.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EmissionError {
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// An opaque identifier failed to parse.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid invoice request id: {0}")]
pub struct InvalidIdError(pub String);
