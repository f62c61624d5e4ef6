//! SQLite-backed customer store.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use std::sync::Arc;

use bcportal_core::customers::{Customer, CustomerRepositoryTrait, NewCustomer};
use bcportal_core::Result;

use super::model::CustomerDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::customers;

pub struct CustomerRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl CustomerRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        CustomerRepository { pool, writer }
    }
}

#[async_trait]
impl CustomerRepositoryTrait for CustomerRepository {
    async fn create(&self, new_customer: NewCustomer) -> Result<Customer> {
        new_customer.validate()?;
        let now = Utc::now().naive_utc();
        let row = CustomerDB {
            id: new_customer.id_or_generate(),
            name: new_customer.name.trim().to_string(),
            created_at: now,
            updated_at: now,
        };

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Customer> {
                let result_db = diesel::insert_into(customers::table)
                    .values(&row)
                    .returning(CustomerDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(Customer::from(result_db))
            })
            .await
    }

    fn get_by_id(&self, customer_id: &str) -> Result<Option<Customer>> {
        let mut conn = get_connection(&self.pool)?;
        let row = customers::table
            .find(customer_id)
            .select(CustomerDB::as_select())
            .first::<CustomerDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(Customer::from))
    }

    fn list(&self) -> Result<Vec<Customer>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = customers::table
            .order(customers::name.asc())
            .select(CustomerDB::as_select())
            .load::<CustomerDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Customer::from).collect())
    }
}
