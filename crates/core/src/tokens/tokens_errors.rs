//! Error types for the token lifecycle.

use thiserror::Error;

use crate::errors::Error;
use crate::tenants::OAuthField;

/// Errors raised while obtaining a valid access token for a tenant.
#[derive(Error, Debug)]
pub enum TokenError {
    /// The tenant does not exist locally.
    #[error("Tenant '{0}' not found")]
    NotFound(String),

    /// The tenant lacks a complete OAuth app registration.
    #[error("Tenant '{tenant_id}' is missing OAuth configuration: {}", format_fields(.missing))]
    MisconfiguredAuth {
        tenant_id: String,
        missing: Vec<OAuthField>,
    },

    /// The identity provider rejected the token request.
    #[error("Token refresh failed with status {status}: {body}")]
    RefreshFailed { status: u16, body: String },

    /// The identity provider answered 2xx without an access token.
    #[error("Token response did not contain an access token")]
    NoAccessToken,

    /// The token request could not be sent or its response could not be read.
    #[error("Token request failed: {0}")]
    Request(String),

    /// The token response body was not valid JSON.
    #[error("Invalid token response: {0}")]
    InvalidResponse(String),

    /// Reading the tenant or persisting the new token failed.
    #[error("Token storage failed: {0}")]
    Storage(String),
}

fn format_fields(fields: &[OAuthField]) -> String {
    fields
        .iter()
        .map(OAuthField::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl TokenError {
    /// Whether a later sync pass may succeed without operator action.
    pub fn is_retryable(&self) -> bool {
        match self {
            TokenError::NotFound(_) | TokenError::MisconfiguredAuth { .. } => false,
            TokenError::RefreshFailed { status, .. } => *status == 429 || *status >= 500,
            TokenError::NoAccessToken | TokenError::InvalidResponse(_) => false,
            TokenError::Request(_) | TokenError::Storage(_) => true,
        }
    }
}

impl From<Error> for TokenError {
    fn from(err: Error) -> Self {
        match err {
            Error::Token(inner) => inner,
            other => TokenError::Storage(other.to_string()),
        }
    }
}
