use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    domain::value_objects::admin_logs::AuditEntry, infra::db::postgres::schema::admin_logs,
};

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = admin_logs)]
pub struct AdminLogEntity {
    pub id: Uuid,
    pub action: String,
    pub actor_id: String,
    pub target_id: Option<String>,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = admin_logs)]
pub struct InsertAdminLogEntity {
    pub action: String,
    pub actor_id: String,
    pub target_id: Option<String>,
    pub details: Option<String>,
}

impl From<AuditEntry> for InsertAdminLogEntity {
    fn from(value: AuditEntry) -> Self {
        Self {
            action: value.action,
            actor_id: value.actor_id,
            target_id: value.target_id,
            details: value.details,
        }
    }
}
