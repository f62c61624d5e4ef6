//! Environment repository trait.

use async_trait::async_trait;

use super::environments_model::{Environment, EnvironmentSyncOutcome, RemoteEnvironment};
use crate::errors::Result;
use crate::sync::EnvironmentSyncTarget;

/// Trait defining the contract for Environment repository operations.
#[async_trait]
pub trait EnvironmentRepositoryTrait: Send + Sync {
    /// Retrieves one environment by its composite key.
    fn get(&self, tenant_id: &str, name: &str) -> Result<Option<Environment>>;

    /// Lists every environment of a tenant, soft-deleted ones included.
    fn list_by_tenant(&self, tenant_id: &str) -> Result<Vec<Environment>>;

    /// Lists environments that are not soft-deleted, with the owning
    /// customer's name for error reporting.
    fn list_active_sync_targets(&self) -> Result<Vec<EnvironmentSyncTarget>>;

    /// Mirrors the admin API's environment list for one tenant in a single
    /// transaction: reported environments are upserted, unreported ones are
    /// soft-deleted.
    async fn sync_from_remote(
        &self,
        tenant_id: &str,
        remote: Vec<RemoteEnvironment>,
    ) -> Result<EnvironmentSyncOutcome>;
}
