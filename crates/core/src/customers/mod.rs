//! Customers module - the owners of tenants.

mod customers_model;
mod customers_traits;

pub use customers_model::{Customer, NewCustomer};
pub use customers_traits::CustomerRepositoryTrait;
