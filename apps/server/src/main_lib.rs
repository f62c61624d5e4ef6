use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{Config, LogFormat};
use bcportal_connect::{
    AdminApiClient, IdentityClient, SyncConfig, SyncOrchestrator, TokenService, TokenServiceConfig,
};
use bcportal_core::customers::CustomerRepositoryTrait;
use bcportal_core::environments::EnvironmentRepositoryTrait;
use bcportal_core::installed_apps::InstalledAppRepositoryTrait;
use bcportal_core::sync::SyncServiceTrait;
use bcportal_core::tenants::TenantRepositoryTrait;
use bcportal_core::tokens::TokenServiceTrait;
use bcportal_storage_sqlite::{
    db, CustomerRepository, EnvironmentRepository, InstalledAppRepository, TenantRepository,
};

pub struct AppState {
    pub token_service: Arc<dyn TokenServiceTrait>,
    pub sync_service: Arc<dyn SyncServiceTrait>,
    pub customer_repository: Arc<dyn CustomerRepositoryTrait>,
    pub tenant_repository: Arc<dyn TenantRepositoryTrait>,
    pub environment_repository: Arc<dyn EnvironmentRepositoryTrait>,
    pub installed_app_repository: Arc<dyn InstalledAppRepositoryTrait>,
}

/// Installs the global subscriber. `log` records from the library crates are
/// forwarded into it.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init(),
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let customer_repository = Arc::new(CustomerRepository::new(pool.clone(), writer.clone()));
    let tenant_repository = Arc::new(TenantRepository::new(pool.clone(), writer.clone()));
    let environment_repository =
        Arc::new(EnvironmentRepository::new(pool.clone(), writer.clone()));
    let installed_app_repository =
        Arc::new(InstalledAppRepository::new(pool.clone(), writer.clone()));

    let identity = Arc::new(IdentityClient::new(&config.identity_url)?);
    let admin_api = Arc::new(AdminApiClient::new(&config.admin_api_url)?);
    tracing::info!("Admin API: {}", admin_api.base_url());

    let token_service = Arc::new(TokenService::new(
        tenant_repository.clone(),
        identity,
        TokenServiceConfig::default(),
    ));
    let sync_service = Arc::new(SyncOrchestrator::new(
        token_service.clone(),
        admin_api,
        tenant_repository.clone(),
        environment_repository.clone(),
        installed_app_repository.clone(),
        SyncConfig {
            batch_size: config.sync_batch_size,
        },
    ));

    Ok(Arc::new(AppState {
        token_service,
        sync_service,
        customer_repository,
        tenant_repository,
        environment_repository,
        installed_app_repository,
    }))
}
