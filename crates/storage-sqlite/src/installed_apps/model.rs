//! Database models for installed apps.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use bcportal_core::installed_apps::{InstalledApp, RemoteApp};

#[derive(Queryable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::installed_apps)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InstalledAppDB {
    pub tenant_id: String,
    pub environment_name: String,
    pub app_id: String,
    pub name: String,
    pub version: String,
    pub publisher: Option<String>,
    pub published_as: Option<String>,
    pub state: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::installed_apps)]
#[diesel(treat_none_as_null = true)]
pub struct InstalledAppChangesetDB {
    pub name: String,
    pub version: String,
    pub publisher: Option<String>,
    pub published_as: Option<String>,
    pub state: Option<String>,
    pub updated_at: NaiveDateTime,
}

impl InstalledAppDB {
    pub fn from_remote(
        tenant_id: &str,
        environment_name: &str,
        app: &RemoteApp,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            environment_name: environment_name.to_string(),
            app_id: app.id.clone(),
            name: app.name.clone(),
            version: app.version.clone(),
            publisher: app.publisher.clone(),
            published_as: app.app_type.clone(),
            state: app.state.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn changeset(&self) -> InstalledAppChangesetDB {
        InstalledAppChangesetDB {
            name: self.name.clone(),
            version: self.version.clone(),
            publisher: self.publisher.clone(),
            published_as: self.published_as.clone(),
            state: self.state.clone(),
            updated_at: self.updated_at,
        }
    }
}

impl From<InstalledAppDB> for InstalledApp {
    fn from(db: InstalledAppDB) -> Self {
        Self {
            tenant_id: db.tenant_id,
            environment_name: db.environment_name,
            app_id: db.app_id,
            name: db.name,
            version: db.version,
            publisher: db.publisher,
            published_as: db.published_as,
            state: db.state,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
