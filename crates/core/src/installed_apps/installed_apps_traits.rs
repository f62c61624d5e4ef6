//! Installed app repository trait.

use async_trait::async_trait;

use super::installed_apps_model::{InstalledApp, RemoteApp};
use super::reconcile::ReconcileOutcome;
use crate::errors::Result;

/// Trait defining the contract for the installed-app mirror.
#[async_trait]
pub trait InstalledAppRepositoryTrait: Send + Sync {
    /// Lists the mirrored apps of one environment, ordered by app id.
    fn list_by_environment(
        &self,
        tenant_id: &str,
        environment_name: &str,
    ) -> Result<Vec<InstalledApp>>;

    /// Converges the mirror for `(tenant_id, environment_name)` to exactly
    /// `remote_apps` as one all-or-nothing unit of work.
    ///
    /// Implementations must bound the transaction and report an overrun as
    /// `DatabaseError::TransactionTimeout` without persisting partial work.
    async fn reconcile(
        &self,
        tenant_id: &str,
        environment_name: &str,
        remote_apps: Vec<RemoteApp>,
    ) -> Result<ReconcileOutcome>;
}
