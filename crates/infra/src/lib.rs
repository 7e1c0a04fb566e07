//! Infrastructure layer: record store adapters, the fiscal authority
//! client, and the emission workflow composing the two.

pub mod emission;
pub mod fiscal;
pub mod store;

pub use emission::EmissionService;
