//! Database models for environments.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use bcportal_core::environments::{Environment, RemoteEnvironment};

#[derive(Queryable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::environments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct EnvironmentDB {
    pub tenant_id: String,
    pub name: String,
    pub environment_type: Option<String>,
    pub status: String,
    pub application_version: Option<String>,
    pub platform_version: Option<String>,
    pub country_code: Option<String>,
    pub web_client_url: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Columns refreshed from the admin API on every environment-list sync.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::environments)]
#[diesel(treat_none_as_null = true)]
pub struct EnvironmentChangesetDB {
    pub environment_type: Option<String>,
    pub status: String,
    pub application_version: Option<String>,
    pub platform_version: Option<String>,
    pub country_code: Option<String>,
    pub web_client_url: Option<String>,
    pub updated_at: NaiveDateTime,
}

impl EnvironmentDB {
    pub fn from_remote(tenant_id: &str, remote: &RemoteEnvironment, now: NaiveDateTime) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            name: remote.name.clone(),
            environment_type: remote.environment_type.clone(),
            status: remote.status_or_active(),
            application_version: remote.application_version.clone(),
            platform_version: remote.platform_version.clone(),
            country_code: remote.country_code.clone(),
            web_client_url: remote.web_client_login_url.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn changeset(&self) -> EnvironmentChangesetDB {
        EnvironmentChangesetDB {
            environment_type: self.environment_type.clone(),
            status: self.status.clone(),
            application_version: self.application_version.clone(),
            platform_version: self.platform_version.clone(),
            country_code: self.country_code.clone(),
            web_client_url: self.web_client_url.clone(),
            updated_at: self.updated_at,
        }
    }
}

impl From<EnvironmentDB> for Environment {
    fn from(db: EnvironmentDB) -> Self {
        Self {
            tenant_id: db.tenant_id,
            name: db.name,
            environment_type: db.environment_type,
            status: db.status,
            application_version: db.application_version,
            platform_version: db.platform_version,
            country_code: db.country_code,
            web_client_url: db.web_client_url,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
