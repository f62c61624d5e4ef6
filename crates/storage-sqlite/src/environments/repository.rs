//! Environment list per tenant, with remote sync and active sync targets.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use bcportal_core::environments::{
    Environment, EnvironmentRepositoryTrait, EnvironmentSyncOutcome, RemoteEnvironment,
    ENVIRONMENT_STATUS_SOFT_DELETED,
};
use bcportal_core::sync::EnvironmentSyncTarget;
use bcportal_core::Result;

use super::model::EnvironmentDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{customers, environments, tenants};

pub struct EnvironmentRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl EnvironmentRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        EnvironmentRepository { pool, writer }
    }
}

#[async_trait]
impl EnvironmentRepositoryTrait for EnvironmentRepository {
    fn get(&self, tenant_id: &str, name: &str) -> Result<Option<Environment>> {
        let mut conn = get_connection(&self.pool)?;
        let row = environments::table
            .find((tenant_id, name))
            .select(EnvironmentDB::as_select())
            .first::<EnvironmentDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(Environment::from))
    }

    fn list_by_tenant(&self, tenant_id: &str) -> Result<Vec<Environment>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = environments::table
            .filter(environments::tenant_id.eq(tenant_id))
            .order(environments::name.asc())
            .select(EnvironmentDB::as_select())
            .load::<EnvironmentDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Environment::from).collect())
    }

    fn list_active_sync_targets(&self) -> Result<Vec<EnvironmentSyncTarget>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = environments::table
            .inner_join(tenants::table.left_join(customers::table))
            .filter(environments::status.ne(ENVIRONMENT_STATUS_SOFT_DELETED))
            .order((environments::tenant_id.asc(), environments::name.asc()))
            .select((
                environments::tenant_id,
                environments::name,
                customers::name.nullable(),
            ))
            .load::<(String, String, Option<String>)>(&mut conn)
            .map_err(StorageError::from)?;

        Ok(rows
            .into_iter()
            .map(|(tenant_id, name, customer_name)| EnvironmentSyncTarget {
                tenant_id,
                name,
                customer_name: customer_name.unwrap_or_default(),
            })
            .collect())
    }

    async fn sync_from_remote(
        &self,
        tenant_id: &str,
        remote: Vec<RemoteEnvironment>,
    ) -> Result<EnvironmentSyncOutcome> {
        let tenant_id = tenant_id.to_string();
        self.writer
            .exec(
                move |conn: &mut SqliteConnection| -> Result<EnvironmentSyncOutcome> {
                    let now = Utc::now().naive_utc();
                    let existing: HashMap<String, String> = environments::table
                        .filter(environments::tenant_id.eq(&tenant_id))
                        .select((environments::name, environments::status))
                        .load::<(String, String)>(conn)
                        .map_err(StorageError::from)?
                        .into_iter()
                        .collect();

                    // Last record wins for duplicate names.
                    let mut latest: HashMap<String, EnvironmentDB> = HashMap::new();
                    for env in &remote {
                        if env.name.trim().is_empty() {
                            warn!("Skipping environment without a name for tenant {}", tenant_id);
                            continue;
                        }
                        latest.insert(
                            env.name.clone(),
                            EnvironmentDB::from_remote(&tenant_id, env, now),
                        );
                    }

                    let mut outcome = EnvironmentSyncOutcome::default();
                    for row in latest.values() {
                        diesel::insert_into(environments::table)
                            .values(row)
                            .on_conflict((environments::tenant_id, environments::name))
                            .do_update()
                            .set(row.changeset())
                            .execute(conn)
                            .map_err(StorageError::from)?;
                        if existing.contains_key(&row.name) {
                            outcome.updated += 1;
                        } else {
                            outcome.created += 1;
                        }
                    }

                    let reported: HashSet<&str> = latest.keys().map(String::as_str).collect();
                    for (name, status) in &existing {
                        if reported.contains(name.as_str())
                            || status == ENVIRONMENT_STATUS_SOFT_DELETED
                        {
                            continue;
                        }
                        diesel::update(environments::table.find((&tenant_id, name)))
                            .set((
                                environments::status.eq(ENVIRONMENT_STATUS_SOFT_DELETED),
                                environments::updated_at.eq(now),
                            ))
                            .execute(conn)
                            .map_err(StorageError::from)?;
                        outcome.soft_deleted += 1;
                    }

                    debug!(
                        "Environment sync for tenant {}: {} created, {} updated, {} soft-deleted",
                        tenant_id, outcome.created, outcome.updated, outcome.soft_deleted
                    );
                    Ok(outcome)
                },
            )
            .await
    }
}
