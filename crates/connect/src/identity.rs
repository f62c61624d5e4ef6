//! OAuth2 client-credentials client for the Microsoft identity platform.

use async_trait::async_trait;
use log::{debug, warn};
use serde::Deserialize;
use std::time::Duration;

use bcportal_core::errors::{Error, Result};
use bcportal_core::tenants::OAuthCredentials;
use bcportal_core::tokens::{
    IdentityProviderTrait, TokenError, TokenGrant, MAX_TOKEN_LIFETIME_SECS,
};

/// Default timeout for token requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Lifetime assumed when the token response omits `expires_in`.
const FALLBACK_EXPIRES_IN_SECS: i64 = 3600;

/// Default base URL of the identity provider.
pub const DEFAULT_IDENTITY_URL: &str = "https://login.microsoftonline.com";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    /// A number on the v2 endpoint; some proxies hand it back as a string.
    #[serde(default)]
    expires_in: Option<serde_json::Value>,
}

impl TokenResponse {
    fn expires_in_secs(&self) -> Option<i64> {
        match self.expires_in.as_ref()? {
            serde_json::Value::Number(n) => n.as_i64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// HTTP client for `POST {base}/{tenant_id}/oauth2/v2.0/token`.
#[derive(Debug, Clone)]
pub struct IdentityClient {
    client: reqwest::Client,
    base_url: String,
}

impl IdentityClient {
    /// Create a new identity client.
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

    fn token_url(&self, tenant_id: &str) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.base_url,
            urlencoding::encode(tenant_id)
        )
    }
}

#[async_trait]
impl IdentityProviderTrait for IdentityClient {
    async fn request_token(
        &self,
        tenant_id: &str,
        credentials: &OAuthCredentials,
    ) -> std::result::Result<TokenGrant, TokenError> {
        let url = self.token_url(tenant_id);
        debug!("[Identity] Requesting token for tenant {}", tenant_id);

        let params = [
            ("grant_type", credentials.grant_type.as_str()),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("scope", credentials.scope.as_str()),
        ];

        let response = self
            .client
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(|e| TokenError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TokenError::Request(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(TokenError::RefreshFailed {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TokenResponse =
            serde_json::from_str(&body).map_err(|e| TokenError::InvalidResponse(e.to_string()))?;

        let access_token = parsed
            .access_token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or(TokenError::NoAccessToken)?;

        let expires_in = parsed.expires_in_secs().unwrap_or_else(|| {
            warn!(
                "[Identity] Token response for tenant {} has no usable expires_in; assuming {}s",
                tenant_id, FALLBACK_EXPIRES_IN_SECS
            );
            FALLBACK_EXPIRES_IN_SECS
        });
        if !(1..=MAX_TOKEN_LIFETIME_SECS).contains(&expires_in) {
            return Err(TokenError::InvalidResponse(format!(
                "expires_in {} is out of range",
                expires_in
            )));
        }

        Ok(TokenGrant {
            access_token,
            expires_in,
        })
    }
}
