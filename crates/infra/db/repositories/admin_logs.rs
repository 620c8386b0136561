use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, insert_into, pg::Pg, prelude::*};
use std::sync::Arc;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::admin_logs},
};
use domain::{
    entities::admin_logs::{AdminLogEntity, InsertAdminLogEntity},
    repositories::admin_logs::AdminLogRepository,
    value_objects::admin_logs::AdminLogFilter,
};

pub struct AdminLogPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl AdminLogPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

fn filtered(filter: &AdminLogFilter) -> admin_logs::BoxedQuery<'static, Pg> {
    let mut query = admin_logs::table.into_boxed();

    if let Some(action) = filter.action.clone() {
        query = query.filter(admin_logs::action.eq(action));
    }
    if let Some(actor_id) = filter.actor_id.clone() {
        query = query.filter(admin_logs::actor_id.eq(actor_id));
    }
    if let Some(target_id) = filter.target_id.clone() {
        query = query.filter(admin_logs::target_id.eq(target_id));
    }

    query
}

#[async_trait]
impl AdminLogRepository for AdminLogPostgres {
    async fn create(&self, insert_admin_log_entity: InsertAdminLogEntity) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        insert_into(admin_logs::table)
            .values(&insert_admin_log_entity)
            .execute(&mut conn)?;

        Ok(())
    }

    async fn list(&self, filter: AdminLogFilter) -> Result<(i64, Vec<AdminLogEntity>)> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let total = filtered(&filter).count().get_result::<i64>(&mut conn)?;

        let items = filtered(&filter)
            .order(admin_logs::created_at.desc())
            .offset(filter.offset())
            .limit(filter.page_size())
            .select(AdminLogEntity::as_select())
            .load::<AdminLogEntity>(&mut conn)?;

        Ok((total, items))
    }
}
