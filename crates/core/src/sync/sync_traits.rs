//! Traits for the remote admin API and the batch sync service.

use async_trait::async_trait;

use super::sync_errors::{FetchError, SyncUnitError};
use super::sync_model::{EnvironmentSyncTarget, SyncResult, SyncSummary, TenantSyncTarget};
use crate::environments::{EnvironmentSyncOutcome, RemoteEnvironment};
use crate::errors::Result;
use crate::installed_apps::RemoteApp;

/// Client for the Business Central admin API.
#[async_trait]
pub trait AdminApiClientTrait: Send + Sync {
    /// Lists the apps installed in one environment.
    async fn fetch_remote_apps(
        &self,
        tenant_id: &str,
        environment_name: &str,
        token: &str,
    ) -> std::result::Result<Vec<RemoteApp>, FetchError>;

    /// Lists the environments of the tenant the token was issued for.
    async fn fetch_remote_environments(
        &self,
        tenant_id: &str,
        token: &str,
    ) -> std::result::Result<Vec<RemoteEnvironment>, FetchError>;
}

/// Contract for the token + fetch + reconcile pipeline.
///
/// The batch operations never fail as a whole: every unit failure becomes an
/// entry in the returned summary. Only the `sync_all_*` variants, which first
/// enumerate their inputs from the store, can fail.
#[async_trait]
pub trait SyncServiceTrait: Send + Sync {
    /// Fetches and reconciles the installed apps of one environment using a
    /// token the caller already holds.
    async fn sync_environment_applications(
        &self,
        tenant_id: &str,
        environment_name: &str,
        token: &str,
    ) -> SyncResult;

    /// Ensures a token, fetches and reconciles apps for every environment.
    async fn sync_multiple_environments(&self, envs: Vec<EnvironmentSyncTarget>) -> SyncSummary;

    /// Ensures a valid token for every tenant.
    async fn sync_multiple_tenants(&self, tenants: Vec<TenantSyncTarget>) -> SyncSummary;

    /// Runs [`sync_multiple_environments`] over every active environment.
    ///
    /// [`sync_multiple_environments`]: SyncServiceTrait::sync_multiple_environments
    async fn sync_all_environments(&self) -> Result<SyncSummary>;

    /// Runs [`sync_multiple_tenants`] over every configured tenant.
    ///
    /// [`sync_multiple_tenants`]: SyncServiceTrait::sync_multiple_tenants
    async fn sync_all_tenants(&self) -> Result<SyncSummary>;

    /// Mirrors one tenant's environment list from the admin API.
    async fn sync_tenant_environments(
        &self,
        tenant_id: &str,
    ) -> std::result::Result<EnvironmentSyncOutcome, SyncUnitError>;
}
