//! Batch sync orchestrator.
//!
//! Drives token refresh, admin API fetches and local reconciliation across
//! many tenants and environments. Every unit of work is isolated: its
//! failure becomes one entry in the returned [`SyncSummary`] and never stops
//! its siblings.

use async_trait::async_trait;
use log::{debug, info, warn};
use std::sync::Arc;

use bcportal_core::environments::{EnvironmentRepositoryTrait, EnvironmentSyncOutcome};
use bcportal_core::errors::Result;
use bcportal_core::installed_apps::{InstalledAppRepositoryTrait, ReconcileOutcome};
use bcportal_core::sync::{
    AdminApiClientTrait, EnvironmentSyncTarget, ReconcileError, SyncResult, SyncServiceTrait,
    SyncSummary, SyncUnitError, TenantSyncTarget,
};
use bcportal_core::tenants::TenantRepositoryTrait;
use bcportal_core::tokens::TokenServiceTrait;

use super::batch::run_in_batches;

/// Number of units run concurrently when no batch size is configured.
pub const DEFAULT_SYNC_BATCH_SIZE: usize = 3;

/// Configuration for sync operations.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Units of work in flight at once. Values below 1 are treated as 1.
    pub batch_size: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_SYNC_BATCH_SIZE,
        }
    }
}

/// Orchestrates token, fetch and reconcile across tenants and environments.
///
/// # Example
///
/// ```ignore
/// let orchestrator = SyncOrchestrator::new(
///     token_service, admin_api, tenants, environments, installed_apps,
///     SyncConfig::default(),
/// );
/// let summary = orchestrator.sync_all_environments().await?;
/// ```
pub struct SyncOrchestrator {
    token_service: Arc<dyn TokenServiceTrait>,
    admin_api: Arc<dyn AdminApiClientTrait>,
    tenant_repository: Arc<dyn TenantRepositoryTrait>,
    environment_repository: Arc<dyn EnvironmentRepositoryTrait>,
    installed_app_repository: Arc<dyn InstalledAppRepositoryTrait>,
    config: SyncConfig,
}

impl SyncOrchestrator {
    pub fn new(
        token_service: Arc<dyn TokenServiceTrait>,
        admin_api: Arc<dyn AdminApiClientTrait>,
        tenant_repository: Arc<dyn TenantRepositoryTrait>,
        environment_repository: Arc<dyn EnvironmentRepositoryTrait>,
        installed_app_repository: Arc<dyn InstalledAppRepositoryTrait>,
        config: SyncConfig,
    ) -> Self {
        Self {
            token_service,
            admin_api,
            tenant_repository,
            environment_repository,
            installed_app_repository,
            config,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Fetch + reconcile for one environment with a token already in hand.
    /// Environments unknown locally fail before any remote call.
    async fn sync_apps(
        &self,
        tenant_id: &str,
        environment_name: &str,
        token: &str,
    ) -> std::result::Result<ReconcileOutcome, SyncUnitError> {
        if self
            .environment_repository
            .get(tenant_id, environment_name)
            .map_err(ReconcileError::from)?
            .is_none()
        {
            return Err(ReconcileError::environment_not_found(tenant_id, environment_name).into());
        }

        let apps = self
            .admin_api
            .fetch_remote_apps(tenant_id, environment_name, token)
            .await?;
        let outcome = self
            .installed_app_repository
            .reconcile(tenant_id, environment_name, apps)
            .await
            .map_err(ReconcileError::from)?;
        debug!(
            "[Sync] {}/{}: {} created, {} updated, {} deleted, {} unchanged",
            tenant_id,
            environment_name,
            outcome.created,
            outcome.updated,
            outcome.deleted,
            outcome.unchanged
        );
        Ok(outcome)
    }

    /// Token + fetch + reconcile for one environment.
    async fn sync_environment(
        &self,
        target: &EnvironmentSyncTarget,
    ) -> std::result::Result<ReconcileOutcome, SyncUnitError> {
        let token = self
            .token_service
            .ensure_valid_token(&target.tenant_id)
            .await?;
        self.sync_apps(&target.tenant_id, &target.name, &token.access_token)
            .await
    }
}

#[async_trait]
impl SyncServiceTrait for SyncOrchestrator {
    async fn sync_environment_applications(
        &self,
        tenant_id: &str,
        environment_name: &str,
        token: &str,
    ) -> SyncResult {
        let result = self.sync_apps(tenant_id, environment_name, token).await;
        if let Err(e) = &result {
            warn!(
                "[Sync] Failed to sync apps for {}/{}: {}",
                tenant_id, environment_name, e
            );
        }
        SyncResult::from(result)
    }

    async fn sync_multiple_environments(&self, envs: Vec<EnvironmentSyncTarget>) -> SyncSummary {
        if envs.is_empty() {
            info!("[Sync] No environments to sync");
            return SyncSummary::empty("No environments to sync");
        }

        info!(
            "[Sync] Syncing {} environments in batches of {}",
            envs.len(),
            self.config.batch_size.max(1)
        );
        let results = run_in_batches(envs, self.config.batch_size, |target| async move {
            let result = self.sync_environment(&target).await;
            (target, result)
        })
        .await;

        let mut summary = SyncSummary::default();
        for (target, result) in results {
            match result {
                Ok(_) => summary.record_success(),
                Err(e) => {
                    warn!(
                        "[Sync] Environment {}/{} failed: {}",
                        target.tenant_id, target.name, e
                    );
                    summary.record_failure(
                        &target.tenant_id,
                        Some(&target.name),
                        &target.customer_name,
                        &e,
                    );
                }
            }
        }

        let summary = summary.finish("environments");
        info!("[Sync] {}", summary.message);
        summary
    }

    async fn sync_multiple_tenants(&self, tenants: Vec<TenantSyncTarget>) -> SyncSummary {
        if tenants.is_empty() {
            info!("[Sync] No tenants to sync");
            return SyncSummary::empty("No tenants to sync");
        }

        info!(
            "[Sync] Refreshing tokens for {} tenants in batches of {}",
            tenants.len(),
            self.config.batch_size.max(1)
        );
        let results = run_in_batches(tenants, self.config.batch_size, |target| async move {
            let result = self
                .token_service
                .ensure_valid_token(&target.id)
                .await
                .map_err(SyncUnitError::from);
            (target, result)
        })
        .await;

        let mut summary = SyncSummary::default();
        for (target, result) in results {
            match result {
                Ok(_) => summary.record_success(),
                Err(e) => {
                    warn!("[Sync] Tenant {} failed: {}", target.id, e);
                    summary.record_failure(&target.id, None, &target.customer_name, &e);
                }
            }
        }

        let summary = summary.finish("tenants");
        info!("[Sync] {}", summary.message);
        summary
    }

    async fn sync_all_environments(&self) -> Result<SyncSummary> {
        let targets = self.environment_repository.list_active_sync_targets()?;
        Ok(self.sync_multiple_environments(targets).await)
    }

    async fn sync_all_tenants(&self) -> Result<SyncSummary> {
        let targets = self.tenant_repository.list_sync_targets()?;
        Ok(self.sync_multiple_tenants(targets).await)
    }

    async fn sync_tenant_environments(
        &self,
        tenant_id: &str,
    ) -> std::result::Result<EnvironmentSyncOutcome, SyncUnitError> {
        let token = self.token_service.ensure_valid_token(tenant_id).await?;
        let remote = self
            .admin_api
            .fetch_remote_environments(tenant_id, &token.access_token)
            .await?;
        let outcome = self
            .environment_repository
            .sync_from_remote(tenant_id, remote)
            .await
            .map_err(ReconcileError::from)?;
        info!(
            "[Sync] Environments for tenant {}: {} created, {} updated, {} soft-deleted",
            tenant_id, outcome.created, outcome.updated, outcome.soft_deleted
        );
        Ok(outcome)
    }
}
