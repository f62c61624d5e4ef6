//! Tenants module - domain models and repository trait.

mod tenants_model;
mod tenants_traits;

pub use tenants_model::{NewTenant, OAuthCredentials, OAuthField, Tenant};
pub use tenants_traits::TenantRepositoryTrait;
