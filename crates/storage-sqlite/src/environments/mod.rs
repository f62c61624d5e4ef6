//! SQLite storage implementation for environments.

mod model;
mod repository;

pub use model::{EnvironmentChangesetDB, EnvironmentDB};
pub use repository::EnvironmentRepository;
