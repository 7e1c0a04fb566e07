//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::InvalidIdError;

/// Identifier of an invoice request.
///
/// Assigned exactly once, by the record store at creation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceRequestId(Uuid);

impl InvoiceRequestId {
    /// Create a new identifier.
    ///
    /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
    /// for determinism.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for InvoiceRequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for InvoiceRequestId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<Uuid> for InvoiceRequestId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<InvoiceRequestId> for Uuid {
    fn from(value: InvoiceRequestId) -> Self {
        value.0
    }
}

impl FromStr for InvoiceRequestId {
    type Err = InvalidIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = Uuid::from_str(s).map_err(|e| InvalidIdError(e.to_string()))?;
        Ok(Self(uuid))
    }
}
