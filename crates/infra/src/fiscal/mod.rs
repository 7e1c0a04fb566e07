//! External fiscal authority integration.

mod client;

pub use client::{FiscalAuthorityClient, FiscalConfig};

use std::sync::Arc;

use async_trait::async_trait;

use notafiscal_core::GatewayError;
use notafiscal_invoicing::{EmissionPayload, EmissionReceipt};

/// Single synchronous emission call against the external fiscal authority.
///
/// Implementations classify every failure at the point of failure; callers
/// key off `GatewayError::kind`, never off message text.
#[async_trait]
pub trait EmissionGateway: Send + Sync {
    async fn emit(&self, payload: &EmissionPayload) -> Result<EmissionReceipt, GatewayError>;
}

#[async_trait]
impl<G> EmissionGateway for Arc<G>
where
    G: EmissionGateway + ?Sized,
{
    async fn emit(&self, payload: &EmissionPayload) -> Result<EmissionReceipt, GatewayError> {
        (**self).emit(payload).await
    }
}
