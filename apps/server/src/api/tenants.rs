//! Tenant endpoints: token refresh, tenant batch sync and per-tenant
//! environment and app sync.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::parse_optional_body;
use crate::error::ApiResult;
use crate::main_lib::AppState;
use bcportal_core::environments::EnvironmentSyncOutcome;
use bcportal_core::sync::{SyncResult, SyncSummary, TenantSyncTarget};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenStatusResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refreshed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SyncTenantsRequest {
    #[serde(default)]
    tenants: Option<Vec<TenantSyncTarget>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentListSyncResponse {
    pub success: bool,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<EnvironmentSyncOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
}

/// Makes sure the tenant holds a token valid for at least the refresh margin.
/// The token itself stays server-side.
async fn ensure_token(
    State(state): State<Arc<AppState>>,
    Path(tenant_id): Path<String>,
) -> Json<TokenStatusResponse> {
    match state.token_service.ensure_valid_token(&tenant_id).await {
        Ok(token) => Json(TokenStatusResponse {
            success: true,
            expires_at: Some(token.expires_at),
            refreshed: Some(token.refreshed),
            error: None,
        }),
        Err(e) => {
            warn!("Token refresh for tenant {} failed: {}", tenant_id, e);
            Json(TokenStatusResponse {
                success: false,
                expires_at: None,
                refreshed: None,
                error: Some(e.to_string()),
            })
        }
    }
}

/// Refreshes tokens for the given tenants, or for every configured tenant
/// when the body names none.
async fn sync_tenants(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<SyncSummary>> {
    let request: SyncTenantsRequest = parse_optional_body(&body)?;
    let summary = match request.tenants {
        Some(tenants) => state.sync_service.sync_multiple_tenants(tenants).await,
        None => state.sync_service.sync_all_tenants().await?,
    };
    Ok(Json(summary))
}

async fn sync_tenant_environments(
    State(state): State<Arc<AppState>>,
    Path(tenant_id): Path<String>,
) -> Json<EnvironmentListSyncResponse> {
    match state.sync_service.sync_tenant_environments(&tenant_id).await {
        Ok(outcome) => Json(EnvironmentListSyncResponse {
            success: true,
            outcome: Some(outcome),
            error: None,
            retryable: None,
        }),
        Err(e) => {
            warn!("Environment sync for tenant {} failed: {}", tenant_id, e);
            Json(EnvironmentListSyncResponse {
                success: false,
                outcome: None,
                error: Some(e.to_string()),
                retryable: Some(e.is_retryable()),
            })
        }
    }
}

async fn sync_environment_apps(
    State(state): State<Arc<AppState>>,
    Path((tenant_id, environment_name)): Path<(String, String)>,
) -> Json<SyncResult> {
    let token = match state.token_service.ensure_valid_token(&tenant_id).await {
        Ok(token) => token,
        Err(e) => {
            warn!(
                "App sync for {}/{} skipped, no token: {}",
                tenant_id, environment_name, e
            );
            return Json(SyncResult::failed(e.to_string()));
        }
    };
    let result = state
        .sync_service
        .sync_environment_applications(&tenant_id, &environment_name, &token.access_token)
        .await;
    if result.success {
        info!("Synced apps for {}/{}", tenant_id, environment_name);
    }
    Json(result)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tenants/sync", post(sync_tenants))
        .route("/tenants/{tenant_id}/token", post(ensure_token))
        .route(
            "/tenants/{tenant_id}/environments/sync",
            post(sync_tenant_environments),
        )
        .route(
            "/tenants/{tenant_id}/environments/{name}/apps/sync",
            post(sync_environment_apps),
        )
}
