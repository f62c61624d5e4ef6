//! Tenant credentials and the cached OAuth token.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use log::debug;
use std::sync::Arc;

use bcportal_core::errors::{DatabaseError, Error};
use bcportal_core::sync::TenantSyncTarget;
use bcportal_core::tenants::{NewTenant, Tenant, TenantRepositoryTrait};
use bcportal_core::Result;

use super::model::TenantDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{customers, tenants};

pub struct TenantRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl TenantRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        TenantRepository { pool, writer }
    }
}

#[async_trait]
impl TenantRepositoryTrait for TenantRepository {
    async fn create(&self, new_tenant: NewTenant) -> Result<Tenant> {
        new_tenant.validate()?;
        let row = TenantDB::from_new(new_tenant, Utc::now().naive_utc());

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Tenant> {
                let result_db = diesel::insert_into(tenants::table)
                    .values(&row)
                    .returning(TenantDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(Tenant::from(result_db))
            })
            .await
    }

    fn get_by_id(&self, tenant_id: &str) -> Result<Option<Tenant>> {
        let mut conn = get_connection(&self.pool)?;
        let row = tenants::table
            .find(tenant_id)
            .select(TenantDB::as_select())
            .first::<TenantDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(Tenant::from))
    }

    fn list(&self) -> Result<Vec<Tenant>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = tenants::table
            .order(tenants::id.asc())
            .select(TenantDB::as_select())
            .load::<TenantDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Tenant::from).collect())
    }

    fn list_sync_targets(&self) -> Result<Vec<TenantSyncTarget>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = tenants::table
            .left_join(customers::table)
            .order(tenants::id.asc())
            .select((TenantDB::as_select(), customers::name.nullable()))
            .load::<(TenantDB, Option<String>)>(&mut conn)
            .map_err(StorageError::from)?;

        Ok(rows
            .into_iter()
            .filter_map(|(row, customer_name)| {
                let tenant = Tenant::from(row);
                if !tenant.is_configured() {
                    debug!("Skipping tenant {} without OAuth configuration", tenant.id);
                    return None;
                }
                Some(TenantSyncTarget {
                    id: tenant.id,
                    customer_name: customer_name.unwrap_or_default(),
                })
            })
            .collect())
    }

    async fn update_token(
        &self,
        tenant_id: &str,
        token: String,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let tenant_id = tenant_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                let updated = diesel::update(tenants::table.find(&tenant_id))
                    .set((
                        tenants::token.eq(Some(token)),
                        tenants::token_expires_at.eq(Some(expires_at.naive_utc())),
                        tenants::updated_at.eq(Utc::now().naive_utc()),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if updated == 0 {
                    return Err(Error::Database(DatabaseError::NotFound(format!(
                        "Tenant '{}' not found",
                        tenant_id
                    ))));
                }
                Ok(())
            })
            .await
    }
}
