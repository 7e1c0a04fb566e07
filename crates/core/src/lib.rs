//! `notafiscal-core` — shared domain primitives.
//!
//! This crate contains the strongly-typed identifier and the error taxonomy
//! shared by the workflow, the adapters, and the HTTP boundary. It has no
//! infrastructure concerns.

pub mod error;
pub mod id;

pub use error::{EmissionError, ExternalServiceKind, GatewayError, InvalidIdError, StoreError};
pub use id::InvoiceRequestId;
