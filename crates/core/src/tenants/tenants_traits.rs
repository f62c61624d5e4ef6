//! Tenant repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::tenants_model::{NewTenant, Tenant};
use crate::errors::Result;
use crate::sync::TenantSyncTarget;

/// Trait defining the contract for Tenant repository operations.
///
/// The token fields are only ever written through [`update_token`], which is
/// called by the token refresher after a successful grant.
///
/// [`update_token`]: TenantRepositoryTrait::update_token
#[async_trait]
pub trait TenantRepositoryTrait: Send + Sync {
    /// Creates a new tenant.
    async fn create(&self, new_tenant: NewTenant) -> Result<Tenant>;

    /// Retrieves a tenant by its ID, `None` when it does not exist.
    fn get_by_id(&self, tenant_id: &str) -> Result<Option<Tenant>>;

    /// Lists all tenants.
    fn list(&self) -> Result<Vec<Tenant>>;

    /// Lists tenants with a complete OAuth configuration together with the
    /// name of their owning customer.
    fn list_sync_targets(&self) -> Result<Vec<TenantSyncTarget>>;

    /// Persists a freshly granted access token and its absolute expiry.
    async fn update_token(
        &self,
        tenant_id: &str,
        token: String,
        expires_at: DateTime<Utc>,
    ) -> Result<()>;
}
