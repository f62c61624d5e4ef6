//! Reconciliation planning for the installed-app mirror.
//!
//! The planner is a pure diff between the locally mirrored rows of one
//! environment and the collection the admin API just reported. Storage
//! implementations apply the resulting plan inside a single transaction.

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::installed_apps_model::{InstalledApp, RemoteApp};

/// The writes needed to make a local scope equal to a remote collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// App ids present locally but no longer reported remotely.
    pub to_delete: Vec<String>,
    /// Remote apps with no local row yet.
    pub to_create: Vec<RemoteApp>,
    /// Remote apps whose local row differs in at least one attribute.
    pub to_update: Vec<RemoteApp>,
    /// Remote apps whose local row already matches.
    pub unchanged: usize,
}

impl ReconcilePlan {
    pub fn is_noop(&self) -> bool {
        self.to_delete.is_empty() && self.to_create.is_empty() && self.to_update.is_empty()
    }

    /// Every remote app that must be written, creates first.
    pub fn upserts(&self) -> impl Iterator<Item = &RemoteApp> {
        self.to_create.iter().chain(self.to_update.iter())
    }

    pub fn outcome(&self) -> ReconcileOutcome {
        ReconcileOutcome {
            created: self.to_create.len(),
            updated: self.to_update.len(),
            deleted: self.to_delete.len(),
            unchanged: self.unchanged,
        }
    }
}

/// Counts produced by one reconciliation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileOutcome {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub unchanged: usize,
}

/// Diffs `local` against `remote`.
///
/// `local` must already be scoped to one `(tenant, environment)` pair.
/// Duplicate ids in `remote` collapse to their last occurrence, keeping the
/// position of the first one.
pub fn plan_reconciliation(local: &[InstalledApp], remote: Vec<RemoteApp>) -> ReconcilePlan {
    let mut order: Vec<String> = Vec::with_capacity(remote.len());
    let mut latest: HashMap<String, RemoteApp> = HashMap::with_capacity(remote.len());
    for app in remote {
        if latest.contains_key(&app.id) {
            warn!(
                "Admin API reported app {} more than once; keeping the last record",
                app.id
            );
        } else {
            order.push(app.id.clone());
        }
        latest.insert(app.id.clone(), app);
    }

    let remote_ids: HashSet<&str> = order.iter().map(String::as_str).collect();
    let mut to_delete: Vec<String> = local
        .iter()
        .filter(|row| !remote_ids.contains(row.app_id.as_str()))
        .map(|row| row.app_id.clone())
        .collect();
    to_delete.sort();
    to_delete.dedup();

    let local_by_id: HashMap<&str, &InstalledApp> =
        local.iter().map(|row| (row.app_id.as_str(), row)).collect();

    let mut plan = ReconcilePlan {
        to_delete,
        ..Default::default()
    };
    for id in &order {
        let Some(app) = latest.remove(id) else {
            continue;
        };
        match local_by_id.get(id.as_str()) {
            None => plan.to_create.push(app),
            Some(existing) if !existing.matches_remote(&app) => plan.to_update.push(app),
            Some(_) => plan.unchanged += 1,
        }
    }

    plan
}
