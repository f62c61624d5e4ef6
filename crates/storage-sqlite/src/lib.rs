//! SQLite storage implementation for bcportal.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `bcportal-core` and contains:
//! - Database connection pooling and management
//! - The single-writer actor and its bounded transactions
//! - Diesel migrations
//! - Repository implementations for customers, tenants, environments and installed apps
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! All other crates (`core`, `connect`) are database-agnostic and work with traits.
//!
//! ```text
//! core (domain)          connect (HTTP + sync)
//!       │                      │
//!       └──────────┬───────────┘
//!                  │
//!                  ▼
//!          storage-sqlite (this crate)
//!                  │
//!                  ▼
//!              SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;
pub mod utils;

// Repository implementations
pub mod customers;
pub mod environments;
pub mod installed_apps;
pub mod tenants;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    TransactionLimits, WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::StorageError;

pub use customers::CustomerRepository;
pub use environments::EnvironmentRepository;
pub use installed_apps::InstalledAppRepository;
pub use tenants::TenantRepository;

// Re-export from bcportal-core for convenience
pub use bcportal_core::errors::{DatabaseError, Error, Result};

#[cfg(test)]
pub(crate) mod test_support;
