//! Installed-app mirror and its bounded reconcile transaction.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use log::debug;
use std::sync::Arc;

use bcportal_core::installed_apps::{
    plan_reconciliation, InstalledApp, InstalledAppRepositoryTrait, ReconcileOutcome, RemoteApp,
};
use bcportal_core::sync::ReconcileError;
use bcportal_core::{Error, Result};

use super::model::InstalledAppDB;
use crate::db::{get_connection, TransactionLimits, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{environments, installed_apps};
use crate::utils::chunk_for_sqlite;

pub struct InstalledAppRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
    limits: TransactionLimits,
}

impl InstalledAppRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        let limits = writer.limits();
        InstalledAppRepository {
            pool,
            writer,
            limits,
        }
    }

    /// Overrides the time budget of each reconcile transaction.
    pub fn with_limits(mut self, limits: TransactionLimits) -> Self {
        self.limits = limits;
        self
    }
}

fn environment_exists(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    environment_name: &str,
) -> Result<bool> {
    let count: i64 = environments::table
        .filter(environments::tenant_id.eq(tenant_id))
        .filter(environments::name.eq(environment_name))
        .count()
        .get_result(conn)
        .map_err(StorageError::from)?;
    Ok(count > 0)
}

fn load_scope(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    environment_name: &str,
) -> Result<Vec<InstalledApp>> {
    let rows = installed_apps::table
        .filter(installed_apps::tenant_id.eq(tenant_id))
        .filter(installed_apps::environment_name.eq(environment_name))
        .order(installed_apps::app_id.asc())
        .select(InstalledAppDB::as_select())
        .load::<InstalledAppDB>(conn)
        .map_err(StorageError::from)?;
    Ok(rows.into_iter().map(InstalledApp::from).collect())
}

#[async_trait]
impl InstalledAppRepositoryTrait for InstalledAppRepository {
    fn list_by_environment(
        &self,
        tenant_id: &str,
        environment_name: &str,
    ) -> Result<Vec<InstalledApp>> {
        let mut conn = get_connection(&self.pool)?;
        load_scope(&mut conn, tenant_id, environment_name)
    }

    async fn reconcile(
        &self,
        tenant_id: &str,
        environment_name: &str,
        remote_apps: Vec<RemoteApp>,
    ) -> Result<ReconcileOutcome> {
        let tenant_id = tenant_id.to_string();
        let environment_name = environment_name.to_string();

        self.writer
            .exec_with_limits(
                self.limits,
                move |conn: &mut SqliteConnection| -> Result<ReconcileOutcome> {
                    if !environment_exists(conn, &tenant_id, &environment_name)? {
                        return Err(Error::Reconcile(ReconcileError::environment_not_found(
                            &tenant_id,
                            &environment_name,
                        )));
                    }
                    let local = load_scope(conn, &tenant_id, &environment_name)?;
                    let plan = plan_reconciliation(&local, remote_apps);
                    if plan.is_noop() {
                        return Ok(plan.outcome());
                    }

                    for chunk in chunk_for_sqlite(&plan.to_delete) {
                        diesel::delete(
                            installed_apps::table
                                .filter(installed_apps::tenant_id.eq(&tenant_id))
                                .filter(installed_apps::environment_name.eq(&environment_name))
                                .filter(installed_apps::app_id.eq_any(chunk)),
                        )
                        .execute(conn)
                        .map_err(StorageError::from)?;
                    }

                    let now = Utc::now().naive_utc();
                    for app in plan.upserts() {
                        let row =
                            InstalledAppDB::from_remote(&tenant_id, &environment_name, app, now);
                        diesel::insert_into(installed_apps::table)
                            .values(&row)
                            .on_conflict((
                                installed_apps::tenant_id,
                                installed_apps::environment_name,
                                installed_apps::app_id,
                            ))
                            .do_update()
                            .set(row.changeset())
                            .execute(conn)
                            .map_err(StorageError::from)?;
                    }

                    let outcome = plan.outcome();
                    debug!(
                        "Reconciled {}/{}: {} created, {} updated, {} deleted, {} unchanged",
                        tenant_id,
                        environment_name,
                        outcome.created,
                        outcome.updated,
                        outcome.deleted,
                        outcome.unchanged
                    );
                    Ok(outcome)
                },
            )
            .await
    }
}
