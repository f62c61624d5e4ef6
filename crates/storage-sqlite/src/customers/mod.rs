//! SQLite storage implementation for customers.

mod model;
mod repository;

pub use model::CustomerDB;
pub use repository::CustomerRepository;
