//! In-memory doubles for the core traits used by the unit tests.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use bcportal_core::environments::{
    Environment, EnvironmentRepositoryTrait, EnvironmentSyncOutcome, RemoteEnvironment,
};
use bcportal_core::errors::{DatabaseError, Error, Result};
use bcportal_core::installed_apps::{
    plan_reconciliation, InstalledApp, InstalledAppRepositoryTrait, ReconcileOutcome, RemoteApp,
};
use bcportal_core::sync::{AdminApiClientTrait, EnvironmentSyncTarget, FetchError, TenantSyncTarget};
use bcportal_core::tenants::{NewTenant, OAuthCredentials, Tenant, TenantRepositoryTrait};
use bcportal_core::tokens::{IdentityProviderTrait, TokenError, TokenGrant};

pub fn configured_tenant(id: &str) -> Tenant {
    let now = Utc::now().naive_utc();
    Tenant {
        id: id.to_string(),
        customer_id: None,
        description: None,
        grant_type: Some("client_credentials".to_string()),
        client_id: Some(format!("client-{}", id)),
        client_secret: Some("s3cret".to_string()),
        scope: Some("https://api.businesscentral.dynamics.com/.default".to_string()),
        token: None,
        token_expires_at: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn with_token(mut tenant: Tenant, token: &str, expires_in: Duration) -> Tenant {
    tenant.token = Some(token.to_string());
    tenant.token_expires_at = Some(Utc::now() + expires_in);
    tenant
}

pub fn remote_app(id: &str, version: &str) -> RemoteApp {
    RemoteApp {
        id: id.to_string(),
        name: format!("App {}", id),
        version: version.to_string(),
        publisher: Some("Contoso".to_string()),
        app_type: Some("PTE".to_string()),
        state: Some("Installed".to_string()),
    }
}

// ============================================================================
// Tenants
// ============================================================================

#[derive(Default)]
pub struct MockTenantRepository {
    tenants: Mutex<HashMap<String, Tenant>>,
    pub token_writes: AtomicUsize,
}

impl MockTenantRepository {
    pub fn with(tenants: Vec<Tenant>) -> Self {
        let repo = Self::default();
        {
            let mut map = repo.tenants.lock().unwrap();
            for tenant in tenants {
                map.insert(tenant.id.clone(), tenant);
            }
        }
        repo
    }

    pub fn tenant(&self, id: &str) -> Option<Tenant> {
        self.tenants.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl TenantRepositoryTrait for MockTenantRepository {
    async fn create(&self, _new_tenant: NewTenant) -> Result<Tenant> {
        unimplemented!()
    }

    fn get_by_id(&self, tenant_id: &str) -> Result<Option<Tenant>> {
        Ok(self.tenant(tenant_id))
    }

    fn list(&self) -> Result<Vec<Tenant>> {
        let mut tenants: Vec<Tenant> = self.tenants.lock().unwrap().values().cloned().collect();
        tenants.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(tenants)
    }

    fn list_sync_targets(&self) -> Result<Vec<TenantSyncTarget>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(Tenant::is_configured)
            .map(|t| TenantSyncTarget {
                id: t.id,
                customer_name: "Contoso".to_string(),
            })
            .collect())
    }

    async fn update_token(
        &self,
        tenant_id: &str,
        token: String,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        self.token_writes.fetch_add(1, Ordering::SeqCst);
        let mut tenants = self.tenants.lock().unwrap();
        let tenant = tenants.get_mut(tenant_id).ok_or_else(|| {
            Error::Database(DatabaseError::NotFound(tenant_id.to_string()))
        })?;
        tenant.token = Some(token);
        tenant.token_expires_at = Some(expires_at);
        Ok(())
    }
}

// ============================================================================
// Identity provider
// ============================================================================

/// Grants `token-{tenant}` for `expires_in` seconds (one hour when unset),
/// except for tenants listed in `rejected`, which get a 401.
#[derive(Default)]
pub struct MockIdentity {
    pub calls: AtomicUsize,
    pub rejected: HashSet<String>,
    pub expires_in: Option<i64>,
}

impl MockIdentity {
    pub fn rejecting(tenant_ids: &[&str]) -> Self {
        Self {
            rejected: tenant_ids.iter().map(|id| id.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProviderTrait for MockIdentity {
    async fn request_token(
        &self,
        tenant_id: &str,
        _credentials: &OAuthCredentials,
    ) -> std::result::Result<TokenGrant, TokenError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.rejected.contains(tenant_id) {
            return Err(TokenError::RefreshFailed {
                status: 401,
                body: r#"{"error":"invalid_client"}"#.to_string(),
            });
        }
        Ok(TokenGrant {
            access_token: format!("token-{}", tenant_id),
            expires_in: self.expires_in.unwrap_or(3600),
        })
    }
}

// ============================================================================
// Admin API
// ============================================================================

#[derive(Default)]
pub struct MockAdminApi {
    pub apps: HashMap<String, Vec<RemoteApp>>,
    pub environments: HashMap<String, Vec<RemoteEnvironment>>,
    pub calls: AtomicUsize,
}

impl MockAdminApi {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AdminApiClientTrait for MockAdminApi {
    async fn fetch_remote_apps(
        &self,
        _tenant_id: &str,
        environment_name: &str,
        token: &str,
    ) -> std::result::Result<Vec<RemoteApp>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if token.is_empty() {
            return Err(FetchError::Api {
                status: 401,
                body: "Unauthorized".to_string(),
            });
        }
        self.apps
            .get(environment_name)
            .cloned()
            .ok_or_else(|| FetchError::Api {
                status: 404,
                body: format!("Environment {} not found", environment_name),
            })
    }

    async fn fetch_remote_environments(
        &self,
        tenant_id: &str,
        _token: &str,
    ) -> std::result::Result<Vec<RemoteEnvironment>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.environments.get(tenant_id).cloned().unwrap_or_default())
    }
}

// ============================================================================
// Environments
// ============================================================================

/// Every environment exists except the names listed in `missing`.
#[derive(Default)]
pub struct MockEnvironmentRepository {
    pub targets: Vec<EnvironmentSyncTarget>,
    pub missing: HashSet<String>,
    pub synced: Mutex<Vec<(String, usize)>>,
}

#[async_trait]
impl EnvironmentRepositoryTrait for MockEnvironmentRepository {
    fn get(&self, tenant_id: &str, name: &str) -> Result<Option<Environment>> {
        if self.missing.contains(name) {
            return Ok(None);
        }
        let now = Utc::now().naive_utc();
        Ok(Some(Environment {
            tenant_id: tenant_id.to_string(),
            name: name.to_string(),
            environment_type: Some("Production".to_string()),
            status: "Active".to_string(),
            application_version: None,
            platform_version: None,
            country_code: None,
            web_client_url: None,
            created_at: now,
            updated_at: now,
        }))
    }

    fn list_by_tenant(&self, _tenant_id: &str) -> Result<Vec<Environment>> {
        unimplemented!()
    }

    fn list_active_sync_targets(&self) -> Result<Vec<EnvironmentSyncTarget>> {
        Ok(self.targets.clone())
    }

    async fn sync_from_remote(
        &self,
        tenant_id: &str,
        remote: Vec<RemoteEnvironment>,
    ) -> Result<EnvironmentSyncOutcome> {
        self.synced
            .lock()
            .unwrap()
            .push((tenant_id.to_string(), remote.len()));
        Ok(EnvironmentSyncOutcome {
            created: remote.len(),
            ..Default::default()
        })
    }
}

// ============================================================================
// Installed apps
// ============================================================================

/// Keeps rows per `(tenant, environment)` and applies real reconciliation
/// plans. Environments listed in `timeouts` fail like an overrunning
/// transaction.
#[derive(Default)]
pub struct MockInstalledAppRepository {
    rows: Mutex<HashMap<(String, String), Vec<InstalledApp>>>,
    pub timeouts: HashSet<String>,
}

impl MockInstalledAppRepository {
    pub fn app_ids(&self, tenant_id: &str, environment_name: &str) -> Vec<String> {
        self.rows
            .lock()
            .unwrap()
            .get(&(tenant_id.to_string(), environment_name.to_string()))
            .map(|rows| rows.iter().map(|r| r.app_id.clone()).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl InstalledAppRepositoryTrait for MockInstalledAppRepository {
    fn list_by_environment(
        &self,
        tenant_id: &str,
        environment_name: &str,
    ) -> Result<Vec<InstalledApp>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get(&(tenant_id.to_string(), environment_name.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn reconcile(
        &self,
        tenant_id: &str,
        environment_name: &str,
        remote_apps: Vec<RemoteApp>,
    ) -> Result<ReconcileOutcome> {
        if self.timeouts.contains(environment_name) {
            return Err(Error::Database(DatabaseError::TransactionTimeout(
                "transaction ran 61000ms (max 60000ms) and was rolled back".to_string(),
            )));
        }
        let local = self.list_by_environment(tenant_id, environment_name)?;
        let plan = plan_reconciliation(&local, remote_apps);
        let now = Utc::now().naive_utc();
        let mut rows: Vec<InstalledApp> = local
            .into_iter()
            .filter(|row| !plan.to_delete.contains(&row.app_id))
            .filter(|row| !plan.upserts().any(|app| app.id == row.app_id))
            .collect();
        rows.extend(plan.upserts().map(|app| InstalledApp {
            tenant_id: tenant_id.to_string(),
            environment_name: environment_name.to_string(),
            app_id: app.id.clone(),
            name: app.name.clone(),
            version: app.version.clone(),
            publisher: app.publisher.clone(),
            published_as: app.app_type.clone(),
            state: app.state.clone(),
            created_at: now,
            updated_at: now,
        }));
        rows.sort_by(|a, b| a.app_id.cmp(&b.app_id));
        self.rows
            .lock()
            .unwrap()
            .insert((tenant_id.to_string(), environment_name.to_string()), rows);
        Ok(plan.outcome())
    }
}
