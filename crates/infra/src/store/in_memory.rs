use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use notafiscal_core::{InvoiceRequestId, StoreError};
use notafiscal_invoicing::{
    InvoiceRequest, InvoiceRequestPatch, InvoiceRequestStatus, NewInvoiceRequest,
};

use super::InvoiceRequestStore;

/// In-memory store for tests/dev.
///
/// Listing order is creation order (`created_at`, then id as a tiebreak).
#[derive(Debug, Default)]
pub struct InMemoryInvoiceRequestStore {
    inner: RwLock<HashMap<InvoiceRequestId, InvoiceRequest>>,
}

impl InMemoryInvoiceRequestStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl InvoiceRequestStore for InMemoryInvoiceRequestStore {
    async fn create(&self, input: NewInvoiceRequest) -> Result<InvoiceRequest, StoreError> {
        let now = Utc::now();
        let record = InvoiceRequest {
            id: InvoiceRequestId::new(),
            taker_cnpj: input.taker_cnpj,
            service_city: input.service_city,
            service_state: input.service_state,
            service_value: input.service_value,
            desired_issue_date: input.desired_issue_date,
            service_description: input.service_description,
            status: InvoiceRequestStatus::PendingEmission,
            invoice_number: None,
            invoice_issue_date: None,
            created_at: now,
            updated_at: now,
        };

        let mut map = self
            .inner
            .write()
            .map_err(|_| StoreError::backend("store lock poisoned"))?;
        map.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_all(&self) -> Result<Vec<InvoiceRequest>, StoreError> {
        let map = self
            .inner
            .read()
            .map_err(|_| StoreError::backend("store lock poisoned"))?;
        let mut records: Vec<InvoiceRequest> = map.values().cloned().collect();
        records.sort_by_key(|r| (r.created_at, r.id));
        Ok(records)
    }

    async fn find_by_id(
        &self,
        id: InvoiceRequestId,
    ) -> Result<Option<InvoiceRequest>, StoreError> {
        let map = self
            .inner
            .read()
            .map_err(|_| StoreError::backend("store lock poisoned"))?;
        Ok(map.get(&id).cloned())
    }

    async fn update(
        &self,
        id: InvoiceRequestId,
        patch: InvoiceRequestPatch,
    ) -> Result<Option<InvoiceRequest>, StoreError> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| StoreError::backend("store lock poisoned"))?;

        let Some(record) = map.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(status) = patch.status {
            record.status = status;
        }
        if let Some(invoice_number) = patch.invoice_number {
            record.invoice_number = Some(invoice_number);
        }
        if let Some(invoice_issue_date) = patch.invoice_issue_date {
            record.invoice_issue_date = Some(invoice_issue_date);
        }
        record.updated_at = Utc::now();

        Ok(Some(record.clone()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;

    fn sample_input(description: &str) -> NewInvoiceRequest {
        NewInvoiceRequest {
            taker_cnpj: "12345678000195".to_string(),
            service_city: "São Paulo".to_string(),
            service_state: "SP".to_string(),
            service_value: "1500.50".parse().unwrap(),
            desired_issue_date: DateTime::parse_from_rfc3339("2024-12-31T00:00:00.000Z")
                .unwrap()
                .with_timezone(&Utc),
            service_description: description.to_string(),
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_initial_status() {
        let store = InMemoryInvoiceRequestStore::new();
        let record = store.create(sample_input("Consulting")).await.unwrap();

        assert!(!record.id.to_string().is_empty());
        assert_eq!(record.status, InvoiceRequestStatus::PendingEmission);
        assert_eq!(record.invoice_number, None);
        assert_eq!(record.invoice_issue_date, None);
        assert_eq!(record.created_at, record.updated_at);
    }

    #[tokio::test]
    async fn find_by_id_distinguishes_absence_from_failure() {
        let store = InMemoryInvoiceRequestStore::new();
        let found = store.find_by_id(InvoiceRequestId::new()).await.unwrap();
        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn find_all_lists_in_creation_order() {
        let store = InMemoryInvoiceRequestStore::new();
        let first = store.create(sample_input("first")).await.unwrap();
        let second = store.create(sample_input("second")).await.unwrap();
        let third = store.create(sample_input("third")).await.unwrap();

        let ids: Vec<InvoiceRequestId> = store
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![first.id, second.id, third.id]);
    }

    #[tokio::test]
    async fn update_applies_partial_patch() {
        let store = InMemoryInvoiceRequestStore::new();
        let record = store.create(sample_input("Consulting")).await.unwrap();

        let issued_at = DateTime::parse_from_rfc3339("2024-05-15T11:00:00.000Z")
            .unwrap()
            .with_timezone(&Utc);
        let updated = store
            .update(record.id, InvoiceRequestPatch::issued("NF-1", issued_at))
            .await
            .unwrap()
            .expect("record should exist");

        assert_eq!(updated.status, InvoiceRequestStatus::Issued);
        assert_eq!(updated.invoice_number.as_deref(), Some("NF-1"));
        assert_eq!(updated.invoice_issue_date, Some(issued_at));
        // Immutable fields are untouched.
        assert_eq!(updated.taker_cnpj, record.taker_cnpj);
        assert_eq!(updated.desired_issue_date, record.desired_issue_date);
    }

    #[tokio::test]
    async fn update_returns_none_for_vanished_record() {
        let store = InMemoryInvoiceRequestStore::new();
        let updated = store
            .update(
                InvoiceRequestId::new(),
                InvoiceRequestPatch::status_only(InvoiceRequestStatus::Cancelled),
            )
            .await
            .unwrap();
        assert_eq!(updated, None);
    }
}
