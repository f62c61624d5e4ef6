//! Per-tenant token lifecycle.

mod service;

pub use service::{TokenService, TokenServiceConfig};

#[cfg(test)]
mod service_tests;
