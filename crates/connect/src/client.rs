//! HTTP client for the Business Central admin API.

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use bcportal_core::environments::RemoteEnvironment;
use bcportal_core::errors::{Error, Result};
use bcportal_core::installed_apps::RemoteApp;
use bcportal_core::sync::{AdminApiClientTrait, FetchError};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default base URL of the admin API's environment collection.
pub const DEFAULT_ADMIN_API_URL: &str =
    "https://api.businesscentral.dynamics.com/admin/v2.24/applications/businesscentral/environments";

/// OData collection envelope used by every admin API list endpoint.
#[derive(Debug, Deserialize)]
struct Collection<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
}

/// HTTP client for the admin API.
///
/// The client is token-agnostic: each call carries the bearer token of the
/// tenant it is made for, so one instance serves every tenant.
#[derive(Debug, Clone)]
pub struct AdminApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl AdminApiClient {
    /// Create a new admin API client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The environments collection URL, see [`DEFAULT_ADMIN_API_URL`]
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Unexpected(format!("Failed to initialize HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn apps_url(&self, environment_name: &str) -> String {
        format!(
            "{}/{}/apps",
            self.base_url,
            urlencoding::encode(environment_name)
        )
    }

    /// GET a collection and unwrap its `value` array.
    async fn get_collection<T: DeserializeOwned>(
        &self,
        url: &str,
        token: &str,
    ) -> std::result::Result<Vec<T>, FetchError> {
        debug!("[AdminApi] GET {}", url);

        let auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| FetchError::Request(format!("Invalid access token format: {}", e)))?;

        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, auth)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        Self::parse_response(response).await
    }

    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> std::result::Result<Vec<T>, FetchError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Request(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(FetchError::Api {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str::<Collection<T>>(&body)
            .map(|collection| collection.value)
            .map_err(|e| FetchError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl AdminApiClientTrait for AdminApiClient {
    async fn fetch_remote_apps(
        &self,
        tenant_id: &str,
        environment_name: &str,
        token: &str,
    ) -> std::result::Result<Vec<RemoteApp>, FetchError> {
        let apps: Vec<RemoteApp> = self
            .get_collection(&self.apps_url(environment_name), token)
            .await?;
        debug!(
            "[AdminApi] {}/{} reported {} apps",
            tenant_id,
            environment_name,
            apps.len()
        );
        Ok(apps)
    }

    async fn fetch_remote_environments(
        &self,
        tenant_id: &str,
        token: &str,
    ) -> std::result::Result<Vec<RemoteEnvironment>, FetchError> {
        let environments: Vec<RemoteEnvironment> =
            self.get_collection(&self.base_url, token).await?;
        debug!(
            "[AdminApi] Tenant {} reported {} environments",
            tenant_id,
            environments.len()
        );
        Ok(environments)
    }
}
