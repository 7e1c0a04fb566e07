use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use notafiscal_core::InvoiceRequestId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_invoice_request).get(list_invoice_requests))
        .route("/:id", get(get_invoice_request))
        .route("/:id/emit", post(emit_invoice))
}

pub async fn create_invoice_request(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateInvoiceRequest>,
) -> axum::response::Response {
    let input = match body.into_domain() {
        Ok(input) => input,
        Err(resp) => return resp,
    };

    match services.create_request(input).await {
        Ok(record) => (
            StatusCode::CREATED,
            Json(dto::invoice_request_to_json(&record)),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_invoice_requests(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.list_requests().await {
        Ok(records) => {
            let items = records
                .iter()
                .map(dto::invoice_request_to_json)
                .collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_invoice_request(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: InvoiceRequestId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_id",
                "invalid invoice request id",
            )
        }
    };

    match services.find_request(id).await {
        Ok(Some(record)) => {
            (StatusCode::OK, Json(dto::invoice_request_to_json(&record))).into_response()
        }
        Ok(None) => errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            "invoice request not found",
        ),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn emit_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: InvoiceRequestId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_id",
                "invalid invoice request id",
            )
        }
    };

    match services.emit_invoice(id).await {
        Ok(record) => {
            (StatusCode::OK, Json(dto::invoice_request_to_json(&record))).into_response()
        }
        Err(e) => errors::emission_error_to_response(e),
    }
}
