use std::sync::Arc;

use sqlx::PgPool;

use notafiscal_core::{EmissionError, InvoiceRequestId, StoreError};
use notafiscal_infra::emission::EmissionService;
use notafiscal_infra::fiscal::{FiscalAuthorityClient, FiscalConfig};
use notafiscal_infra::store::{InMemoryInvoiceRequestStore, PostgresInvoiceRequestStore};
use notafiscal_invoicing::{InvoiceRequest, NewInvoiceRequest};

/// Service wiring: which store backs the emission workflow.
pub enum AppServices {
    InMemory {
        emission: EmissionService<Arc<InMemoryInvoiceRequestStore>, Arc<FiscalAuthorityClient>>,
    },
    Persistent {
        emission: EmissionService<Arc<PostgresInvoiceRequestStore>, Arc<FiscalAuthorityClient>>,
    },
}

pub async fn build_services(fiscal: FiscalConfig) -> anyhow::Result<AppServices> {
    let gateway = Arc::new(FiscalAuthorityClient::new(fiscal)?);

    let use_persistent = std::env::var("USE_PERSISTENT_STORES")
        .unwrap_or_else(|_| "false".to_string())
        .parse::<bool>()
        .unwrap_or(false);

    if use_persistent {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set when USE_PERSISTENT_STORES=true"))?;
        let pool = PgPool::connect(&database_url).await?;
        let store = Arc::new(PostgresInvoiceRequestStore::new(pool));
        return Ok(AppServices::Persistent {
            emission: EmissionService::new(store, gateway),
        });
    }

    let store = Arc::new(InMemoryInvoiceRequestStore::new());
    Ok(AppServices::InMemory {
        emission: EmissionService::new(store, gateway),
    })
}

impl AppServices {
    pub async fn create_request(
        &self,
        input: NewInvoiceRequest,
    ) -> Result<InvoiceRequest, StoreError> {
        match self {
            AppServices::InMemory { emission } => emission.create_request(input).await,
            AppServices::Persistent { emission } => emission.create_request(input).await,
        }
    }

    pub async fn list_requests(&self) -> Result<Vec<InvoiceRequest>, StoreError> {
        match self {
            AppServices::InMemory { emission } => emission.list_requests().await,
            AppServices::Persistent { emission } => emission.list_requests().await,
        }
    }

    pub async fn find_request(
        &self,
        id: InvoiceRequestId,
    ) -> Result<Option<InvoiceRequest>, StoreError> {
        match self {
            AppServices::InMemory { emission } => emission.find_request(id).await,
            AppServices::Persistent { emission } => emission.find_request(id).await,
        }
    }

    pub async fn emit_invoice(
        &self,
        id: InvoiceRequestId,
    ) -> Result<InvoiceRequest, EmissionError> {
        match self {
            AppServices::InMemory { emission } => emission.emit_invoice(id).await,
            AppServices::Persistent { emission } => emission.emit_invoice(id).await,
        }
    }
}
