//! Temp-database fixtures shared by the repository tests.

use std::sync::Arc;

use bcportal_core::customers::{CustomerRepositoryTrait, NewCustomer};
use bcportal_core::environments::{EnvironmentRepositoryTrait, RemoteEnvironment};
use bcportal_core::tenants::{NewTenant, TenantRepositoryTrait};
use tempfile::{tempdir, TempDir};

use crate::db::{create_pool, run_migrations, spawn_writer, DbPool, WriteHandle};
use crate::{CustomerRepository, EnvironmentRepository, TenantRepository};

pub struct TestDb {
    pub pool: Arc<DbPool>,
    pub writer: WriteHandle,
    _dir: TempDir,
}

impl TestDb {
    pub fn new() -> Self {
        let dir = tempdir().expect("Failed to create temp directory");
        let db_path = dir.path().join("test.db").to_string_lossy().to_string();
        let pool = create_pool(&db_path).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        let writer = spawn_writer((*pool).clone());
        TestDb {
            pool,
            writer,
            _dir: dir,
        }
    }

    pub fn customers(&self) -> CustomerRepository {
        CustomerRepository::new(Arc::clone(&self.pool), self.writer.clone())
    }

    pub fn tenants(&self) -> TenantRepository {
        TenantRepository::new(Arc::clone(&self.pool), self.writer.clone())
    }

    pub fn environments(&self) -> EnvironmentRepository {
        EnvironmentRepository::new(Arc::clone(&self.pool), self.writer.clone())
    }

    /// Creates customer `customer_name` owning a fully configured tenant.
    pub async fn seed_tenant(&self, tenant_id: &str, customer_name: &str) {
        let customer = self
            .customers()
            .create(NewCustomer {
                id: None,
                name: customer_name.to_string(),
            })
            .await
            .expect("Failed to create customer");
        self.tenants()
            .create(configured_tenant(tenant_id, Some(customer.id)))
            .await
            .expect("Failed to create tenant");
    }

    pub async fn seed_environments(&self, tenant_id: &str, names: &[&str]) {
        let remote = names.iter().map(|name| remote_environment(name)).collect();
        self.environments()
            .sync_from_remote(tenant_id, remote)
            .await
            .expect("Failed to seed environments");
    }
}

pub fn configured_tenant(tenant_id: &str, customer_id: Option<String>) -> NewTenant {
    NewTenant {
        id: tenant_id.to_string(),
        customer_id,
        description: None,
        grant_type: Some("client_credentials".to_string()),
        client_id: Some("client-1".to_string()),
        client_secret: Some("s3cret".to_string()),
        scope: Some("https://api.businesscentral.dynamics.com/.default".to_string()),
    }
}

pub fn remote_environment(name: &str) -> RemoteEnvironment {
    RemoteEnvironment {
        name: name.to_string(),
        environment_type: Some("Sandbox".to_string()),
        status: Some("Active".to_string()),
        application_version: Some("25.1".to_string()),
        platform_version: Some("25.0".to_string()),
        country_code: Some("DK".to_string()),
        web_client_login_url: None,
    }
}
