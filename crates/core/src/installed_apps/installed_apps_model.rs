//! Installed app domain models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// An extension installed in a Business Central environment, keyed by
/// `(tenant_id, environment_name, app_id)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstalledApp {
    pub tenant_id: String,
    pub environment_name: String,
    pub app_id: String,
    pub name: String,
    pub version: String,
    pub publisher: Option<String>,
    pub published_as: Option<String>,
    pub state: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl InstalledApp {
    /// True when every mirrored attribute already equals the remote record.
    pub fn matches_remote(&self, remote: &RemoteApp) -> bool {
        self.app_id == remote.id
            && self.name == remote.name
            && self.version == remote.version
            && self.publisher == remote.publisher
            && self.published_as == remote.app_type
            && self.state == remote.state
    }
}

/// An app as reported by the admin API's per-environment apps endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteApp {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub app_type: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}
