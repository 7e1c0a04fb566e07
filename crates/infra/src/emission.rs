//! Invoice emission workflow (application-level orchestration).
//!
//! Pipeline for a single emission:
//!
//! ```text
//! emit_invoice(id)
//!   ↓
//! 1. Load the request from the store
//!   ↓
//! 2. Guard: only pending requests may be emitted
//!   ↓
//! 3. Call the fiscal authority (no store writes before this succeeds)
//!   ↓
//! 4. Persist the assigned number and issue date
//! ```
//!
//! The store and gateway are injected collaborators; the workflow holds no
//! state between calls. Concurrent emissions for the same id are not
//! serialized here — the store's single-record update is the only guard.
//! There is no retry anywhere in this pipeline.

use tracing::{error, info, warn};

use notafiscal_core::{EmissionError, InvoiceRequestId, StoreError};
use notafiscal_invoicing::{InvoiceRequest, InvoiceRequestPatch, NewInvoiceRequest};

use crate::fiscal::EmissionGateway;
use crate::store::InvoiceRequestStore;

/// Orchestrates invoice request persistence and external emission.
///
/// Generic over the store and gateway so tests can substitute in-memory
/// and scripted implementations.
#[derive(Debug)]
pub struct EmissionService<S, G> {
    store: S,
    gateway: G,
}

impl<S, G> EmissionService<S, G> {
    pub fn new(store: S, gateway: G) -> Self {
        Self { store, gateway }
    }
}

impl<S, G> EmissionService<S, G>
where
    S: InvoiceRequestStore,
    G: EmissionGateway,
{
    /// Create a pending invoice request.
    ///
    /// Input fields are validated at the boundary before reaching this
    /// method; store failures propagate unclassified.
    pub async fn create_request(
        &self,
        input: NewInvoiceRequest,
    ) -> Result<InvoiceRequest, StoreError> {
        self.store.create(input).await
    }

    /// All requests, in store order.
    pub async fn list_requests(&self) -> Result<Vec<InvoiceRequest>, StoreError> {
        self.store.find_all().await
    }

    /// Look up a single request; absence is a data result, not an error.
    pub async fn find_request(
        &self,
        id: InvoiceRequestId,
    ) -> Result<Option<InvoiceRequest>, StoreError> {
        self.store.find_by_id(id).await
    }

    /// Emit the fiscal invoice for a pending request.
    ///
    /// On gateway failure the store is left untouched. After a gateway
    /// success the external invoice exists: a failed or vanished update is
    /// terminal for this call (`EmissionError::Internal`) and the gateway
    /// is never re-invoked.
    pub async fn emit_invoice(
        &self,
        id: InvoiceRequestId,
    ) -> Result<InvoiceRequest, EmissionError> {
        let request = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(EmissionError::NotFound)?;

        request.ensure_emittable()?;

        let payload = request.emission_payload();
        let receipt = match self.gateway.emit(&payload).await {
            Ok(receipt) => receipt,
            Err(err) => {
                warn!(%id, kind = ?err.kind, status = ?err.status, detail = %err.detail,
                    "fiscal authority emission failed");
                return Err(EmissionError::External(err));
            }
        };

        info!(%id, invoice_number = %receipt.invoice_number, "invoice issued by fiscal authority");

        let patch = InvoiceRequestPatch::issued(receipt.invoice_number.clone(), receipt.issued_at);
        let updated = match self.store.update(id, patch).await {
            Ok(updated) => updated,
            Err(err) => {
                error!(%id, invoice_number = %receipt.invoice_number, %err,
                    "request update failed after emission; invoice exists upstream, manual reconciliation required");
                return Err(EmissionError::internal(format!(
                    "failed to update request after emission: {err}"
                )));
            }
        };

        let Some(updated) = updated else {
            error!(%id, invoice_number = %receipt.invoice_number,
                "request vanished after emission; invoice exists upstream, manual reconciliation required");
            return Err(EmissionError::internal(
                "failed to update request after emission",
            ));
        };

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};

    use notafiscal_core::{ExternalServiceKind, GatewayError};
    use notafiscal_invoicing::{EmissionPayload, EmissionReceipt, InvoiceRequestStatus};

    use crate::store::InMemoryInvoiceRequestStore;

    use super::*;

    /// Gateway that pops scripted responses and counts invocations.
    struct ScriptedGateway {
        responses: Mutex<VecDeque<Result<EmissionReceipt, GatewayError>>>,
        calls: AtomicUsize,
        last_payload: Mutex<Option<EmissionPayload>>,
    }

    impl ScriptedGateway {
        fn new(
            responses: impl IntoIterator<Item = Result<EmissionReceipt, GatewayError>>,
        ) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().collect()),
                calls: AtomicUsize::new(0),
                last_payload: Mutex::new(None),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl EmissionGateway for ScriptedGateway {
        async fn emit(
            &self,
            payload: &EmissionPayload,
        ) -> Result<EmissionReceipt, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_payload.lock().unwrap() = Some(payload.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("gateway invoked more times than scripted")
        }
    }

    /// Store whose update always reports the record as vanished.
    struct VanishingStore {
        inner: InMemoryInvoiceRequestStore,
    }

    #[async_trait]
    impl InvoiceRequestStore for VanishingStore {
        async fn create(&self, input: NewInvoiceRequest) -> Result<InvoiceRequest, StoreError> {
            self.inner.create(input).await
        }

        async fn find_all(&self) -> Result<Vec<InvoiceRequest>, StoreError> {
            self.inner.find_all().await
        }

        async fn find_by_id(
            &self,
            id: InvoiceRequestId,
        ) -> Result<Option<InvoiceRequest>, StoreError> {
            self.inner.find_by_id(id).await
        }

        async fn update(
            &self,
            _id: InvoiceRequestId,
            _patch: InvoiceRequestPatch,
        ) -> Result<Option<InvoiceRequest>, StoreError> {
            Ok(None)
        }
    }

    fn sample_input() -> NewInvoiceRequest {
        NewInvoiceRequest {
            taker_cnpj: "12345678000195".to_string(),
            service_city: "São Paulo".to_string(),
            service_state: "SP".to_string(),
            service_value: "1500.50".parse().unwrap(),
            desired_issue_date: instant("2024-12-31T00:00:00.000Z"),
            service_description: "Consulting".to_string(),
        }
    }

    fn instant(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn receipt(number: &str, issued_at: &str) -> EmissionReceipt {
        EmissionReceipt {
            invoice_number: number.to_string(),
            issued_at: instant(issued_at),
        }
    }

    fn service(
        responses: impl IntoIterator<Item = Result<EmissionReceipt, GatewayError>>,
    ) -> EmissionService<InMemoryInvoiceRequestStore, ScriptedGateway> {
        EmissionService::new(InMemoryInvoiceRequestStore::new(), ScriptedGateway::new(responses))
    }

    #[tokio::test]
    async fn create_returns_pending_record_with_empty_emission_fields() {
        let service = service([]);
        let record = service.create_request(sample_input()).await.unwrap();

        assert_eq!(record.status, InvoiceRequestStatus::PendingEmission);
        assert_eq!(record.invoice_number, None);
        assert_eq!(record.invoice_issue_date, None);
        assert!(!record.id.to_string().is_empty());
    }

    #[tokio::test]
    async fn emit_issues_a_pending_request() {
        let service = service([Ok(receipt("NF-1", "2024-05-15T11:00:00.000Z"))]);
        let record = service.create_request(sample_input()).await.unwrap();

        let issued = service.emit_invoice(record.id).await.unwrap();

        assert_eq!(issued.status, InvoiceRequestStatus::Issued);
        assert_eq!(issued.invoice_number.as_deref(), Some("NF-1"));
        assert_eq!(
            issued.invoice_issue_date,
            Some(instant("2024-05-15T11:00:00.000Z"))
        );
        assert_eq!(service.gateway.calls(), 1);

        // Payload was built from the record's immutable fields.
        let payload = service.gateway.last_payload.lock().unwrap().clone().unwrap();
        assert_eq!(payload.taker_cnpj, "12345678000195");
        assert_eq!(payload.desired_issue_date, "2024-12-31T00:00:00.000Z");
    }

    #[tokio::test]
    async fn emit_fails_not_found_without_calling_gateway() {
        let service = service([]);

        let err = service.emit_invoice(InvoiceRequestId::new()).await.unwrap_err();

        assert_eq!(err, EmissionError::NotFound);
        assert_eq!(service.gateway.calls(), 0);
    }

    #[tokio::test]
    async fn second_emit_is_rejected_without_a_second_gateway_call() {
        let service = service([Ok(receipt("NF-1", "2024-05-15T11:00:00.000Z"))]);
        let record = service.create_request(sample_input()).await.unwrap();

        service.emit_invoice(record.id).await.unwrap();
        let err = service.emit_invoice(record.id).await.unwrap_err();

        match err {
            EmissionError::InvalidState(msg) => assert!(msg.contains("already issued")),
            other => panic!("expected InvalidState, got {other:?}"),
        }
        assert_eq!(service.gateway.calls(), 1);
    }

    #[tokio::test]
    async fn cancelled_request_is_rejected_without_calling_gateway() {
        let service = service([]);
        let record = service.create_request(sample_input()).await.unwrap();
        service
            .store
            .update(
                record.id,
                InvoiceRequestPatch::status_only(InvoiceRequestStatus::Cancelled),
            )
            .await
            .unwrap();

        let err = service.emit_invoice(record.id).await.unwrap_err();

        match err {
            EmissionError::InvalidState(msg) => assert!(msg.contains("cancelled")),
            other => panic!("expected InvalidState, got {other:?}"),
        }
        assert_eq!(service.gateway.calls(), 0);
    }

    #[tokio::test]
    async fn gateway_failure_leaves_the_store_untouched() {
        let service = service([Err(GatewayError::bad_request(400, "invalid cnpj"))]);
        let record = service.create_request(sample_input()).await.unwrap();

        let err = service.emit_invoice(record.id).await.unwrap_err();

        match err {
            EmissionError::External(gw) => {
                assert_eq!(gw.kind, ExternalServiceKind::BadRequest);
                assert_eq!(gw.status, Some(400));
            }
            other => panic!("expected External, got {other:?}"),
        }

        let stored = service.store.find_by_id(record.id).await.unwrap().unwrap();
        assert_eq!(stored.status, InvoiceRequestStatus::PendingEmission);
        assert_eq!(stored.invoice_number, None);
        assert_eq!(stored.invoice_issue_date, None);
    }

    #[tokio::test]
    async fn vanished_record_after_emission_is_internal_without_retry() {
        let store = VanishingStore {
            inner: InMemoryInvoiceRequestStore::new(),
        };
        let gateway = ScriptedGateway::new([Ok(receipt("NF-1", "2024-05-15T11:00:00.000Z"))]);
        let service = EmissionService::new(store, gateway);

        let record = service.create_request(sample_input()).await.unwrap();
        let err = service.emit_invoice(record.id).await.unwrap_err();

        match err {
            EmissionError::Internal(msg) => {
                assert!(msg.contains("failed to update request after emission"))
            }
            other => panic!("expected Internal, got {other:?}"),
        }
        assert_eq!(service.gateway.calls(), 1);
    }
}
