//! Token refresher backed by the tenant store and an identity provider.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use log::{debug, info, warn};
use std::sync::Arc;

use bcportal_core::tenants::TenantRepositoryTrait;
use bcportal_core::tokens::{
    cached_token, IdentityProviderTrait, TokenError, TokenServiceTrait, ValidToken,
    DEFAULT_REFRESH_MARGIN_SECS,
};

/// Configuration for the token service.
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// Tokens expiring within this margin are refreshed before use.
    pub refresh_margin: Duration,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            refresh_margin: Duration::seconds(DEFAULT_REFRESH_MARGIN_SECS),
        }
    }
}

/// Serves cached tenant tokens and refreshes them through the identity
/// provider when they are missing or about to expire.
///
/// Concurrent refreshes for one tenant are not coordinated: each caller
/// requests its own grant and the last persisted token wins.
pub struct TokenService {
    tenant_repository: Arc<dyn TenantRepositoryTrait>,
    identity_provider: Arc<dyn IdentityProviderTrait>,
    config: TokenServiceConfig,
}

impl TokenService {
    pub fn new(
        tenant_repository: Arc<dyn TenantRepositoryTrait>,
        identity_provider: Arc<dyn IdentityProviderTrait>,
        config: TokenServiceConfig,
    ) -> Self {
        Self {
            tenant_repository,
            identity_provider,
            config,
        }
    }
}

#[async_trait]
impl TokenServiceTrait for TokenService {
    async fn ensure_valid_token(&self, tenant_id: &str) -> Result<ValidToken, TokenError> {
        let tenant = self
            .tenant_repository
            .get_by_id(tenant_id)?
            .ok_or_else(|| TokenError::NotFound(tenant_id.to_string()))?;

        let credentials =
            tenant
                .oauth_credentials()
                .map_err(|missing| TokenError::MisconfiguredAuth {
                    tenant_id: tenant_id.to_string(),
                    missing,
                })?;

        if let Some(token) = cached_token(&tenant, Utc::now(), self.config.refresh_margin) {
            debug!(
                "[TokenService] Using cached token for tenant {} (expires {})",
                tenant_id, token.expires_at
            );
            return Ok(token);
        }

        debug!("[TokenService] Refreshing token for tenant {}", tenant_id);
        let grant = self
            .identity_provider
            .request_token(tenant_id, &credentials)
            .await
            .map_err(|e| {
                warn!(
                    "[TokenService] Token refresh for tenant {} failed: {}",
                    tenant_id, e
                );
                e
            })?;

        let expires_at = grant.expires_at(Utc::now()).ok_or_else(|| {
            warn!(
                "[TokenService] Tenant {} got a token with unusable expires_in {}",
                tenant_id, grant.expires_in
            );
            TokenError::InvalidResponse(format!(
                "expires_in {} is out of range",
                grant.expires_in
            ))
        })?;
        self.tenant_repository
            .update_token(tenant_id, grant.access_token.clone(), expires_at)
            .await?;

        info!(
            "[TokenService] Refreshed token for tenant {} (expires {})",
            tenant_id, expires_at
        );
        Ok(ValidToken {
            access_token: grant.access_token,
            expires_at,
            refreshed: true,
        })
    }
}
