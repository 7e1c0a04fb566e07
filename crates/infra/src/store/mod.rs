//! Invoice request persistence.

mod in_memory;
mod postgres;

pub use in_memory::InMemoryInvoiceRequestStore;
pub use postgres::PostgresInvoiceRequestStore;

use std::sync::Arc;

use async_trait::async_trait;

use notafiscal_core::{InvoiceRequestId, StoreError};
use notafiscal_invoicing::{InvoiceRequest, InvoiceRequestPatch, NewInvoiceRequest};

/// Create/read/update store for invoice request records.
///
/// - `create` assigns the id and bookkeeping timestamps; records start
///   pending emission with no invoice number.
/// - Absence (`Ok(None)`) is distinct from a backend failure (`Err`).
/// - Each call is atomic for a single record; no cross-call transaction
///   is offered.
#[async_trait]
pub trait InvoiceRequestStore: Send + Sync {
    async fn create(&self, input: NewInvoiceRequest) -> Result<InvoiceRequest, StoreError>;

    /// All records, in stable store order.
    async fn find_all(&self) -> Result<Vec<InvoiceRequest>, StoreError>;

    async fn find_by_id(
        &self,
        id: InvoiceRequestId,
    ) -> Result<Option<InvoiceRequest>, StoreError>;

    /// Apply a partial update. `Ok(None)` signals the record vanished
    /// between read and write.
    async fn update(
        &self,
        id: InvoiceRequestId,
        patch: InvoiceRequestPatch,
    ) -> Result<Option<InvoiceRequest>, StoreError>;
}

#[async_trait]
impl<S> InvoiceRequestStore for Arc<S>
where
    S: InvoiceRequestStore + ?Sized,
{
    async fn create(&self, input: NewInvoiceRequest) -> Result<InvoiceRequest, StoreError> {
        (**self).create(input).await
    }

    async fn find_all(&self) -> Result<Vec<InvoiceRequest>, StoreError> {
        (**self).find_all().await
    }

    async fn find_by_id(
        &self,
        id: InvoiceRequestId,
    ) -> Result<Option<InvoiceRequest>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn update(
        &self,
        id: InvoiceRequestId,
        patch: InvoiceRequestPatch,
    ) -> Result<Option<InvoiceRequest>, StoreError> {
        (**self).update(id, patch).await
    }
}
