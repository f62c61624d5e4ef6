//! Sync module - batch sync contracts, results and error taxonomy.

mod sync_errors;
mod sync_model;
mod sync_traits;

pub use sync_errors::{FetchError, ReconcileError, SyncUnitError};
pub use sync_model::{
    EnvironmentSyncTarget, SyncErrorEntry, SyncResult, SyncSummary, TenantSyncTarget,
};
pub use sync_traits::{AdminApiClientTrait, SyncServiceTrait};
