use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    domain::value_objects::enums::plan_codes::PlanCode,
    infra::db::postgres::schema::subscriptions,
};

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = subscriptions)]
pub struct SubscriptionEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub network: String,
    pub tx_hash: String,
    pub amount: f64,
    pub plan_code: String,
    pub status: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl SubscriptionEntity {
    pub fn plan_code(&self) -> anyhow::Result<PlanCode> {
        self.plan_code
            .parse()
            .map_err(|err| anyhow::anyhow!("subscription {} has an unreadable plan: {err}", self.id))
    }
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = subscriptions)]
pub struct InsertSubscriptionEntity {
    pub user_id: Uuid,
    pub network: String,
    pub tx_hash: String,
    pub amount: f64,
    pub plan_code: String,
    pub status: String,
    pub expires_at: DateTime<Utc>,
}
