//! Sync inputs and aggregated results.

use serde::{Deserialize, Serialize};

use super::sync_errors::SyncUnitError;

/// A tenant to refresh, labelled with its customer for error reporting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TenantSyncTarget {
    pub id: String,
    #[serde(default)]
    pub customer_name: String,
}

/// An environment whose installed apps should be mirrored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentSyncTarget {
    pub tenant_id: String,
    pub name: String,
    #[serde(default)]
    pub customer_name: String,
}

/// Outcome of a single unit of work.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SyncResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

impl<T> From<std::result::Result<T, SyncUnitError>> for SyncResult {
    fn from(result: std::result::Result<T, SyncUnitError>) -> Self {
        match result {
            Ok(_) => SyncResult::ok(),
            Err(err) => SyncResult::failed(err.to_string()),
        }
    }
}

/// One failed unit inside a [`SyncSummary`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncErrorEntry {
    pub tenant_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_name: Option<String>,
    pub customer_name: String,
    pub error: String,
    pub retryable: bool,
}

/// Aggregated result of a batch sync.
///
/// Invariants: `success + failed == total` and `errors.len() == failed`.
/// Errors are kept in completion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    pub success: usize,
    pub failed: usize,
    pub total: usize,
    pub errors: Vec<SyncErrorEntry>,
    pub message: String,
}

impl SyncSummary {
    /// Summary for an empty input list.
    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn record_success(&mut self) {
        self.success += 1;
        self.total += 1;
    }

    pub fn record_failure(
        &mut self,
        tenant_id: &str,
        environment_name: Option<&str>,
        customer_name: &str,
        error: &SyncUnitError,
    ) {
        self.failed += 1;
        self.total += 1;
        self.errors.push(SyncErrorEntry {
            tenant_id: tenant_id.to_string(),
            environment_name: environment_name.map(str::to_string),
            customer_name: customer_name.to_string(),
            error: error.to_string(),
            retryable: error.is_retryable(),
        });
    }

    /// Sets the human-readable message from the counters.
    pub fn finish(mut self, noun: &str) -> Self {
        self.message = if self.failed == 0 {
            format!("Synced {} of {} {}.", self.success, self.total, noun)
        } else {
            format!(
                "Synced {} of {} {} ({} failed).",
                self.success, self.total, noun, self.failed
            )
        };
        self
    }

    pub fn is_consistent(&self) -> bool {
        self.success + self.failed == self.total && self.errors.len() == self.failed
    }
}
