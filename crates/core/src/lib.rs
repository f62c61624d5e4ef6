//! bcportal Core - Domain entities, traits and reconciliation logic.
//!
//! This crate contains the business rules for keeping Business Central
//! tenants, environments and installed apps in sync with a local mirror.
//! It is database-agnostic and defines traits that are implemented by the
//! `storage-sqlite` crate (persistence) and the `connect` crate (HTTP).

pub mod customers;
pub mod environments;
pub mod errors;
pub mod installed_apps;
pub mod sync;
pub mod tenants;
pub mod tokens;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
