use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use notafiscal_core::{EmissionError, ExternalServiceKind, StoreError};

/// Translate a workflow failure into a transport response.
///
/// Pure pattern match on the error discriminant; message text is never
/// inspected. External failures carry the classified signal as the message
/// and the raw upstream detail in `details`; internal failures withhold
/// detail.
pub fn emission_error_to_response(err: EmissionError) -> axum::response::Response {
    match err {
        EmissionError::NotFound => {
            json_error(StatusCode::NOT_FOUND, "not_found", "request not found")
        }
        EmissionError::InvalidState(msg) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_state", msg)
        }
        EmissionError::External(gw) => {
            let (status, code) = match gw.kind {
                ExternalServiceKind::BadRequest => (StatusCode::BAD_REQUEST, "upstream_rejected"),
                ExternalServiceKind::Unauthorized => {
                    (StatusCode::UNAUTHORIZED, "upstream_unauthorized")
                }
                ExternalServiceKind::UpstreamInternal => {
                    (StatusCode::BAD_GATEWAY, "upstream_internal_error")
                }
                ExternalServiceKind::Unreachable => {
                    (StatusCode::SERVICE_UNAVAILABLE, "upstream_unreachable")
                }
            };
            json_error_with_details(status, code, gw.kind.as_signal(), gw.to_string())
        }
        EmissionError::Internal(_) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "internal failure",
        ),
        EmissionError::Store(e) => store_error_to_response(e),
    }
}

/// Store failures outside the emission workflow (create/list/fetch).
/// Detail goes to the log, never to the client.
pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    tracing::error!(%err, "record store failure");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "store_error",
        "internal failure",
    )
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

fn json_error_with_details(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
    details: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
            "details": details.into(),
        })),
    )
        .into_response()
}
