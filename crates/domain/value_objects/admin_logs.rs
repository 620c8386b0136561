use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::admin_logs::AdminLogEntity;

pub const DEFAULT_LOG_PAGE_SIZE: i64 = 50;
pub const MAX_LOG_PAGE_SIZE: i64 = 500;

/// A single action to be recorded. `actor_id` is a user id, `anonymous` or `system`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub action: String,
    pub actor_id: String,
    pub target_id: Option<String>,
    pub details: Option<String>,
}

impl AuditEntry {
    pub fn new(action: impl Into<String>, actor_id: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            actor_id: actor_id.into(),
            target_id: None,
            details: None,
        }
    }

    pub fn target(mut self, target_id: impl Into<String>) -> Self {
        self.target_id = Some(target_id.into());
        self
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct AdminLogFilter {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub action: Option<String>,
    pub actor_id: Option<String>,
    pub target_id: Option<String>,
}

impl AdminLogFilter {
    pub fn offset(&self) -> i64 {
        self.skip.unwrap_or(0).max(0)
    }

    pub fn page_size(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_LOG_PAGE_SIZE)
            .clamp(1, MAX_LOG_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AdminLogDto {
    pub id: Uuid,
    pub action: String,
    pub actor_id: String,
    pub target_id: Option<String>,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<AdminLogEntity> for AdminLogDto {
    fn from(value: AdminLogEntity) -> Self {
        Self {
            id: value.id,
            action: value.action,
            actor_id: value.actor_id,
            target_id: value.target_id,
            details: value.details,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AdminLogPageDto {
    pub total: i64,
    pub items: Vec<AdminLogDto>,
}
