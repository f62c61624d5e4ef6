//! Environment domain models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::environments_constants::{ENVIRONMENT_STATUS_ACTIVE, ENVIRONMENT_STATUS_SOFT_DELETED};

/// A named Business Central environment within a tenant, keyed by
/// `(tenant_id, name)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub tenant_id: String,
    pub name: String,
    pub environment_type: Option<String>,
    pub status: String,
    pub application_version: Option<String>,
    pub platform_version: Option<String>,
    pub country_code: Option<String>,
    pub web_client_url: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Environment {
    pub fn is_soft_deleted(&self) -> bool {
        self.status == ENVIRONMENT_STATUS_SOFT_DELETED
    }
}

/// An environment as reported by the admin API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteEnvironment {
    pub name: String,
    #[serde(rename = "type", default)]
    pub environment_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub application_version: Option<String>,
    #[serde(default)]
    pub platform_version: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub web_client_login_url: Option<String>,
}

impl RemoteEnvironment {
    /// Status to store locally; the admin API occasionally omits it.
    pub fn status_or_active(&self) -> String {
        self.status
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| ENVIRONMENT_STATUS_ACTIVE.to_string())
    }
}

/// Counts produced by one environment-list sync.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentSyncOutcome {
    pub created: usize,
    pub updated: usize,
    pub soft_deleted: usize,
}
