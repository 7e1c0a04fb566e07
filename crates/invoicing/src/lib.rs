//! Invoicing domain module.
//!
//! This crate contains the invoice request record, its status lifecycle,
//! and the types exchanged with the external fiscal authority, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod emission;
pub mod request;

pub use emission::{EmissionPayload, EmissionReceipt};
pub use request::{
    InvoiceRequest, InvoiceRequestPatch, InvoiceRequestStatus, NewInvoiceRequest,
};
