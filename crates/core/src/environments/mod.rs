//! Environments module - domain models and repository trait.

mod environments_constants;
mod environments_model;
mod environments_traits;

pub use environments_constants::*;
pub use environments_model::{Environment, EnvironmentSyncOutcome, RemoteEnvironment};
pub use environments_traits::EnvironmentRepositoryTrait;
