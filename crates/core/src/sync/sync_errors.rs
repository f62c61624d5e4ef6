//! Per-unit error taxonomy for sync operations.

use thiserror::Error;

use crate::errors::Error;
use crate::tokens::TokenError;

/// Errors raised while fetching a remote collection from the admin API.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Non-2xx response. The body is kept as raw text since error payloads
    /// are not guaranteed to be JSON.
    #[error("Admin API returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The request could not be sent or its response could not be read.
    #[error("Admin API request failed: {0}")]
    Request(String),

    /// A 2xx response whose body did not match the expected envelope.
    #[error("Invalid admin API response: {0}")]
    InvalidResponse(String),
}

impl FetchError {
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Api { status, .. } => *status == 429 || *status >= 500,
            FetchError::Request(_) => true,
            FetchError::InvalidResponse(_) => false,
        }
    }
}

/// Errors raised while applying a reconciliation to the local store.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// The bounded transaction ran out of wait or execution time and was
    /// rolled back. Retrying later is safe.
    #[error("Reconciliation timed out: {0}")]
    Timeout(String),

    /// The tenant/environment pair has no local row to reconcile into.
    #[error("Environment '{0}' not found")]
    NotFound(String),

    #[error("Reconciliation failed: {0}")]
    Storage(String),
}

impl ReconcileError {
    pub fn environment_not_found(tenant_id: &str, environment_name: &str) -> Self {
        ReconcileError::NotFound(format!("{}/{}", tenant_id, environment_name))
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, ReconcileError::Timeout(_))
    }
}

impl From<Error> for ReconcileError {
    fn from(err: Error) -> Self {
        if err.is_transaction_timeout() {
            return ReconcileError::Timeout(err.to_string());
        }
        match err {
            Error::Reconcile(inner) => inner,
            other => ReconcileError::Storage(other.to_string()),
        }
    }
}

/// Failure of one unit of work (a tenant, or a tenant/environment pair).
#[derive(Error, Debug)]
pub enum SyncUnitError {
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

impl SyncUnitError {
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncUnitError::Token(e) => e.is_retryable(),
            SyncUnitError::Fetch(e) => e.is_retryable(),
            SyncUnitError::Reconcile(e) => e.is_retryable(),
        }
    }
}
