//! Tokens module - OAuth2 client-credentials token lifecycle.

mod tokens_errors;
mod tokens_model;
mod tokens_traits;

pub use tokens_errors::TokenError;
pub use tokens_model::{
    cached_token, needs_refresh, TokenGrant, ValidToken, DEFAULT_REFRESH_MARGIN_SECS,
    MAX_TOKEN_LIFETIME_SECS,
};
pub use tokens_traits::{IdentityProviderTrait, TokenServiceTrait};
