//! Tenant domain models.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A Business Central tenant. The `id` doubles as the Azure AD tenant id.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: String,
    pub customer_id: Option<String>,
    pub description: Option<String>,
    pub grant_type: Option<String>,
    pub client_id: Option<String>,
    #[serde(skip_serializing)]
    pub client_secret: Option<String>,
    pub scope: Option<String>,
    #[serde(skip_serializing)]
    pub token: Option<String>,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

// Secrets stay out of logs.
impl fmt::Debug for Tenant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tenant")
            .field("id", &self.id)
            .field("customer_id", &self.customer_id)
            .field("description", &self.description)
            .field("grant_type", &self.grant_type)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "***"))
            .field("scope", &self.scope)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("token_expires_at", &self.token_expires_at)
            .finish()
    }
}

/// Input model for registering a tenant.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTenant {
    pub id: String,
    pub customer_id: Option<String>,
    pub description: Option<String>,
    pub grant_type: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub scope: Option<String>,
}

impl NewTenant {
    pub fn validate(&self) -> crate::Result<()> {
        if self.id.trim().is_empty() {
            return Err(crate::Error::Validation(
                "Tenant id cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// One of the four OAuth app-registration fields a tenant must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OAuthField {
    GrantType,
    ClientId,
    ClientSecret,
    Scope,
}

impl OAuthField {
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthField::GrantType => "grant_type",
            OAuthField::ClientId => "client_id",
            OAuthField::ClientSecret => "client_secret",
            OAuthField::Scope => "scope",
        }
    }
}

impl fmt::Display for OAuthField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A complete client-credentials registration, borrowed from a configured tenant.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthCredentials {
    pub grant_type: String,
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
}

impl fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("grant_type", &self.grant_type)
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("scope", &self.scope)
            .finish()
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl Tenant {
    /// Returns the tenant's OAuth registration, or every field that is
    /// missing (blank values count as missing).
    pub fn oauth_credentials(&self) -> std::result::Result<OAuthCredentials, Vec<OAuthField>> {
        let grant_type = present(&self.grant_type);
        let client_id = present(&self.client_id);
        let client_secret = present(&self.client_secret);
        let scope = present(&self.scope);

        match (grant_type, client_id, client_secret, scope) {
            (Some(grant_type), Some(client_id), Some(client_secret), Some(scope)) => {
                Ok(OAuthCredentials {
                    grant_type: grant_type.to_string(),
                    client_id: client_id.to_string(),
                    client_secret: client_secret.to_string(),
                    scope: scope.to_string(),
                })
            }
            _ => Err([
                (OAuthField::GrantType, grant_type),
                (OAuthField::ClientId, client_id),
                (OAuthField::ClientSecret, client_secret),
                (OAuthField::Scope, scope),
            ]
            .into_iter()
            .filter(|(_, value)| value.is_none())
            .map(|(field, _)| field)
            .collect()),
        }
    }

    /// True when all four OAuth fields are present.
    pub fn is_configured(&self) -> bool {
        self.oauth_credentials().is_ok()
    }
}
