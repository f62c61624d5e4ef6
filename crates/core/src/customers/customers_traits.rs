use async_trait::async_trait;

use super::customers_model::{Customer, NewCustomer};
use crate::errors::Result;

/// Trait for customer repository operations
#[async_trait]
pub trait CustomerRepositoryTrait: Send + Sync {
    async fn create(&self, new_customer: NewCustomer) -> Result<Customer>;
    fn get_by_id(&self, customer_id: &str) -> Result<Option<Customer>>;
    fn list(&self) -> Result<Vec<Customer>>;
}
