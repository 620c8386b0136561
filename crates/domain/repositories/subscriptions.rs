use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::subscriptions::{InsertSubscriptionEntity, SubscriptionEntity};

#[derive(Debug, thiserror::Error)]
pub enum CreateSubscriptionError {
    #[error("a subscription for this transaction hash already exists")]
    DuplicateTxHash,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[automock]
#[async_trait]
pub trait SubscriptionRepository {
    /// Fails with `DuplicateTxHash` when the storage-level unique constraint on `tx_hash` rejects the row.
    async fn create(
        &self,
        insert_subscription_entity: InsertSubscriptionEntity,
    ) -> std::result::Result<SubscriptionEntity, CreateSubscriptionError>;

    async fn tx_hash_exists(&self, tx_hash: &str) -> Result<bool>;

    async fn find_active_by_user_id(&self, user_id: Uuid) -> Result<Option<SubscriptionEntity>>;

    async fn find_latest_by_user_id(&self, user_id: Uuid) -> Result<Option<SubscriptionEntity>>;

    async fn list_history_by_user_id(&self, user_id: Uuid) -> Result<Vec<SubscriptionEntity>>;
}
