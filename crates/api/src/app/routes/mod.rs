use axum::Router;

pub mod invoice_requests;
pub mod system;

/// Router for all invoice request endpoints.
pub fn router() -> Router {
    Router::new().nest("/invoice-requests", invoice_requests::router())
}
