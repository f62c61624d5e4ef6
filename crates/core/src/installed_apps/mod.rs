//! Installed apps module - the local mirror of apps reported per environment.

mod installed_apps_model;
mod installed_apps_traits;
mod reconcile;

pub use installed_apps_model::{InstalledApp, RemoteApp};
pub use installed_apps_traits::InstalledAppRepositoryTrait;
pub use reconcile::{plan_reconciliation, ReconcileOutcome, ReconcilePlan};
