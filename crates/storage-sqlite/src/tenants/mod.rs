//! SQLite storage implementation for tenants and their cached tokens.

mod model;
mod repository;

pub use model::TenantDB;
pub use repository::TenantRepository;
