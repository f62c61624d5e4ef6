//! bcportal Connect - Business Central admin API integration.
//!
//! This crate talks to the outside world on behalf of the sync core:
//! - [`IdentityClient`] performs OAuth2 client-credentials grants
//! - [`AdminApiClient`] lists environments and installed apps
//! - [`TokenService`] keeps each tenant's cached token fresh
//! - [`SyncOrchestrator`] drives token, fetch and reconcile across many
//!   tenants and environments in bounded batches
//!
//! Persistence is reached only through the repository traits in
//! `bcportal-core`.

pub mod client;
pub mod identity;
pub mod sync;
pub mod tokens;

pub use client::{AdminApiClient, DEFAULT_ADMIN_API_URL};
pub use identity::{IdentityClient, DEFAULT_IDENTITY_URL};
pub use sync::{run_in_batches, SyncConfig, SyncOrchestrator, DEFAULT_SYNC_BATCH_SIZE};
pub use tokens::{TokenService, TokenServiceConfig};

#[cfg(test)]
pub(crate) mod test_support;
