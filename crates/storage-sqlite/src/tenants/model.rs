//! Database models for tenants.

use chrono::NaiveDateTime;
use diesel::prelude::*;

/// Database model for tenants. `token_expires_at` is stored as naive UTC.
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Clone)]
#[diesel(table_name = crate::schema::tenants)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TenantDB {
    pub id: String,
    pub customer_id: Option<String>,
    pub description: Option<String>,
    pub grant_type: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub scope: Option<String>,
    pub token: Option<String>,
    pub token_expires_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<TenantDB> for bcportal_core::tenants::Tenant {
    fn from(db: TenantDB) -> Self {
        Self {
            id: db.id,
            customer_id: db.customer_id,
            description: db.description,
            grant_type: db.grant_type,
            client_id: db.client_id,
            client_secret: db.client_secret,
            scope: db.scope,
            token: db.token,
            token_expires_at: db.token_expires_at.map(|at| at.and_utc()),
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl TenantDB {
    pub fn from_new(new_tenant: bcportal_core::tenants::NewTenant, now: NaiveDateTime) -> Self {
        Self {
            id: new_tenant.id.trim().to_string(),
            customer_id: new_tenant.customer_id,
            description: new_tenant.description,
            grant_type: new_tenant.grant_type,
            client_id: new_tenant.client_id,
            client_secret: new_tenant.client_secret,
            scope: new_tenant.scope,
            token: None,
            token_expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
