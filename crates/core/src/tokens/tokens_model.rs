//! Token domain models and freshness rules.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fmt;

use crate::tenants::Tenant;

/// Tokens expiring within this many seconds are refreshed before use, so a
/// token never expires in the middle of a sync call.
pub const DEFAULT_REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// Longest token lifetime accepted from the identity provider.
pub const MAX_TOKEN_LIFETIME_SECS: i64 = 366 * 24 * 60 * 60;

/// A successful response from the identity provider's token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    /// Lifetime in seconds, relative to the moment the grant was received.
    pub expires_in: i64,
}

impl TokenGrant {
    /// Absolute expiry of a grant received at `now`, or `None` when
    /// `expires_in` is not in `1..=MAX_TOKEN_LIFETIME_SECS`.
    pub fn expires_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if !(1..=MAX_TOKEN_LIFETIME_SECS).contains(&self.expires_in) {
            return None;
        }
        Duration::try_seconds(self.expires_in)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
    }
}

impl fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGrant")
            .field("access_token", &"***")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// A bearer token that is valid for at least the refresh margin.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidToken {
    #[serde(skip_serializing)]
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    /// `false` when served from the tenant's cached token.
    pub refreshed: bool,
}

impl fmt::Debug for ValidToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidToken")
            .field("access_token", &"***")
            .field("expires_at", &self.expires_at)
            .field("refreshed", &self.refreshed)
            .finish()
    }
}

/// `true` when the token is absent, has no expiry, or expires in less than
/// `margin` from `now`.
pub fn needs_refresh(
    token: Option<&str>,
    expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    margin: Duration,
) -> bool {
    match (token.filter(|t| !t.is_empty()), expires_at) {
        (Some(_), Some(expires_at)) => expires_at - now < margin,
        _ => true,
    }
}

/// The tenant's cached token if it is still fresh at `now`.
pub fn cached_token(tenant: &Tenant, now: DateTime<Utc>, margin: Duration) -> Option<ValidToken> {
    if needs_refresh(tenant.token.as_deref(), tenant.token_expires_at, now, margin) {
        return None;
    }
    match (&tenant.token, tenant.token_expires_at) {
        (Some(token), Some(expires_at)) => Some(ValidToken {
            access_token: token.clone(),
            expires_at,
            refreshed: false,
        }),
        _ => None,
    }
}
