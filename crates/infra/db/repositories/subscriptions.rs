use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, insert_into, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::{
        postgres::{postgres_connection::PgPoolSquad, schema::subscriptions},
        repositories::{TX_HASH_UNIQUE_CONSTRAINT, violates_unique},
    },
};
use domain::{
    entities::subscriptions::{InsertSubscriptionEntity, SubscriptionEntity},
    repositories::subscriptions::{CreateSubscriptionError, SubscriptionRepository},
    value_objects::enums::subscription_statuses::SubscriptionStatus,
};

pub struct SubscriptionPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SubscriptionPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl SubscriptionRepository for SubscriptionPostgres {
    async fn create(
        &self,
        insert_subscription_entity: InsertSubscriptionEntity,
    ) -> std::result::Result<SubscriptionEntity, CreateSubscriptionError> {
        let mut conn = Arc::clone(&self.db_pool)
            .get()
            .map_err(anyhow::Error::from)?;

        let result = insert_into(subscriptions::table)
            .values(&insert_subscription_entity)
            .returning(SubscriptionEntity::as_returning())
            .get_result::<SubscriptionEntity>(&mut conn);

        match result {
            Ok(entity) => Ok(entity),
            Err(err) if violates_unique(&err, TX_HASH_UNIQUE_CONSTRAINT) => {
                Err(CreateSubscriptionError::DuplicateTxHash)
            }
            Err(err) => Err(CreateSubscriptionError::Other(err.into())),
        }
    }

    async fn tx_hash_exists(&self, tx_hash: &str) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let existing = subscriptions::table
            .filter(subscriptions::tx_hash.eq(tx_hash))
            .select(subscriptions::id)
            .first::<Uuid>(&mut conn)
            .optional()?;

        Ok(existing.is_some())
    }

    async fn find_active_by_user_id(&self, user_id: Uuid) -> Result<Option<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = subscriptions::table
            .filter(subscriptions::user_id.eq(user_id))
            .filter(subscriptions::status.eq(SubscriptionStatus::Active.to_string()))
            .filter(subscriptions::expires_at.gt(Utc::now()))
            .order(subscriptions::expires_at.desc())
            .select(SubscriptionEntity::as_select())
            .first::<SubscriptionEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_latest_by_user_id(&self, user_id: Uuid) -> Result<Option<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = subscriptions::table
            .filter(subscriptions::user_id.eq(user_id))
            .order(subscriptions::created_at.desc())
            .select(SubscriptionEntity::as_select())
            .first::<SubscriptionEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_history_by_user_id(&self, user_id: Uuid) -> Result<Vec<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = subscriptions::table
            .filter(subscriptions::user_id.eq(user_id))
            .order(subscriptions::created_at.desc())
            .select(SubscriptionEntity::as_select())
            .load::<SubscriptionEntity>(&mut conn)?;

        Ok(results)
    }
}
