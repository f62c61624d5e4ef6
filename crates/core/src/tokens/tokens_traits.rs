//! Token service and identity provider traits.

use async_trait::async_trait;

use super::tokens_errors::TokenError;
use super::tokens_model::{TokenGrant, ValidToken};
use crate::tenants::OAuthCredentials;

/// Client for an OAuth2 identity provider's per-tenant token endpoint.
#[async_trait]
pub trait IdentityProviderTrait: Send + Sync {
    /// Performs one client-credentials token request for `tenant_id`.
    async fn request_token(
        &self,
        tenant_id: &str,
        credentials: &OAuthCredentials,
    ) -> Result<TokenGrant, TokenError>;
}

/// Hands out access tokens that stay valid for at least the refresh margin.
#[async_trait]
pub trait TokenServiceTrait: Send + Sync {
    /// Returns the cached token when it is still fresh, otherwise refreshes,
    /// persists and returns a new one.
    async fn ensure_valid_token(&self, tenant_id: &str) -> Result<ValidToken, TokenError>;
}
