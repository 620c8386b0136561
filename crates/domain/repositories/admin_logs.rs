use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::{
    entities::admin_logs::{AdminLogEntity, InsertAdminLogEntity},
    value_objects::admin_logs::AdminLogFilter,
};

#[automock]
#[async_trait]
pub trait AdminLogRepository {
    async fn create(&self, insert_admin_log_entity: InsertAdminLogEntity) -> Result<()>;

    /// Total matching rows plus the requested page, newest first.
    async fn list(&self, filter: AdminLogFilter) -> Result<(i64, Vec<AdminLogEntity>)>;
}
