use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::users::{DiscordLinkChangeset, InsertUserEntity, UserEntity},
    value_objects::enums::{user_roles::UserRole, user_statuses::UserStatus},
};

#[derive(Debug, thiserror::Error)]
pub enum LinkDiscordError {
    #[error("discord account is already linked to another user")]
    AlreadyLinked,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[automock]
#[async_trait]
pub trait UserRepository {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserEntity>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>>;

    async fn find_by_username(&self, username: &str) -> Result<Option<UserEntity>>;

    async fn create(&self, insert_user_entity: InsertUserEntity) -> Result<UserEntity>;

    async fn list_all(&self) -> Result<Vec<UserEntity>>;

    async fn list_with_discord(&self) -> Result<Vec<UserEntity>>;

    async fn update_role(&self, user_id: Uuid, role: UserRole) -> Result<()>;

    async fn update_status(&self, user_id: Uuid, status: UserStatus) -> Result<()>;

    async fn set_discord_link(
        &self,
        user_id: Uuid,
        link: DiscordLinkChangeset,
    ) -> std::result::Result<UserEntity, LinkDiscordError>;

    async fn clear_discord_link(&self, user_id: Uuid) -> Result<()>;

    /// Returns false when no row matched.
    async fn delete(&self, user_id: Uuid) -> Result<bool>;
}
