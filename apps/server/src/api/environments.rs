use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use super::parse_optional_body;
use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;
use bcportal_core::environments::Environment;
use bcportal_core::installed_apps::InstalledApp;
use bcportal_core::sync::{EnvironmentSyncTarget, SyncSummary};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SyncEnvironmentsRequest {
    #[serde(default)]
    environments: Option<Vec<EnvironmentSyncTarget>>,
}

/// Syncs installed apps for the given environments, or for every active
/// environment of a configured tenant when the body names none.
async fn sync_environments(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<SyncSummary>> {
    let request: SyncEnvironmentsRequest = parse_optional_body(&body)?;
    let summary = match request.environments {
        Some(environments) => {
            state
                .sync_service
                .sync_multiple_environments(environments)
                .await
        }
        None => state.sync_service.sync_all_environments().await?,
    };
    Ok(Json(summary))
}

async fn list_tenant_environments(
    State(state): State<Arc<AppState>>,
    Path(tenant_id): Path<String>,
) -> ApiResult<Json<Vec<Environment>>> {
    let environments = state.environment_repository.list_by_tenant(&tenant_id)?;
    Ok(Json(environments))
}

/// Mirrored apps of one environment. Unknown environments are a 404 rather
/// than an empty list.
async fn list_environment_apps(
    State(state): State<Arc<AppState>>,
    Path((tenant_id, environment_name)): Path<(String, String)>,
) -> ApiResult<Json<Vec<InstalledApp>>> {
    if state
        .environment_repository
        .get(&tenant_id, &environment_name)?
        .is_none()
    {
        return Err(ApiError::NotFound(format!(
            "Environment '{}/{}' not found",
            tenant_id, environment_name
        )));
    }
    let apps = state
        .installed_app_repository
        .list_by_environment(&tenant_id, &environment_name)?;
    Ok(Json(apps))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/environments/sync", post(sync_environments))
        .route(
            "/tenants/{tenant_id}/environments",
            get(list_tenant_environments),
        )
        .route(
            "/tenants/{tenant_id}/environments/{name}/apps",
            get(list_environment_apps),
        )
}
