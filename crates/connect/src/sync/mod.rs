//! Batch sync: bounded fan-out over tenants and environments.

mod batch;
mod orchestrator;

pub use batch::run_in_batches;
pub use orchestrator::{SyncConfig, SyncOrchestrator, DEFAULT_SYNC_BATCH_SIZE};
