use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, delete, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::{
        postgres::{postgres_connection::PgPoolSquad, schema::users},
        repositories::{DISCORD_ID_UNIQUE_CONSTRAINT, violates_unique},
    },
};
use domain::{
    entities::users::{DiscordLinkChangeset, InsertUserEntity, UserEntity},
    repositories::users::{LinkDiscordError, UserRepository},
    value_objects::enums::{user_roles::UserRole, user_statuses::UserStatus},
};

pub struct UserPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl UserPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl UserRepository for UserPostgres {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = users::table
            .filter(users::id.eq(user_id))
            .select(UserEntity::as_select())
            .first::<UserEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = users::table
            .filter(users::email.eq(email))
            .select(UserEntity::as_select())
            .first::<UserEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = users::table
            .filter(users::username.eq(username))
            .select(UserEntity::as_select())
            .first::<UserEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn create(&self, insert_user_entity: InsertUserEntity) -> Result<UserEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(users::table)
            .values(&insert_user_entity)
            .returning(UserEntity::as_returning())
            .get_result::<UserEntity>(&mut conn)?;

        Ok(result)
    }

    async fn list_all(&self) -> Result<Vec<UserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = users::table
            .order(users::created_at.desc())
            .select(UserEntity::as_select())
            .load::<UserEntity>(&mut conn)?;

        Ok(results)
    }

    async fn list_with_discord(&self) -> Result<Vec<UserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = users::table
            .filter(users::discord_id.is_not_null())
            .select(UserEntity::as_select())
            .load::<UserEntity>(&mut conn)?;

        Ok(results)
    }

    async fn update_role(&self, user_id: Uuid, role: UserRole) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(users::table)
            .filter(users::id.eq(user_id))
            .set(users::role.eq(role.to_string()))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn update_status(&self, user_id: Uuid, status: UserStatus) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(users::table)
            .filter(users::id.eq(user_id))
            .set(users::status.eq(status.to_string()))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn set_discord_link(
        &self,
        user_id: Uuid,
        link: DiscordLinkChangeset,
    ) -> std::result::Result<UserEntity, LinkDiscordError> {
        let mut conn = Arc::clone(&self.db_pool)
            .get()
            .map_err(anyhow::Error::from)?;

        let result = update(users::table)
            .filter(users::id.eq(user_id))
            .set(&link)
            .returning(UserEntity::as_returning())
            .get_result::<UserEntity>(&mut conn);

        match result {
            Ok(entity) => Ok(entity),
            Err(err) if violates_unique(&err, DISCORD_ID_UNIQUE_CONSTRAINT) => {
                Err(LinkDiscordError::AlreadyLinked)
            }
            Err(err) => Err(LinkDiscordError::Other(err.into())),
        }
    }

    async fn clear_discord_link(&self, user_id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(users::table)
            .filter(users::id.eq(user_id))
            .set(&DiscordLinkChangeset::default())
            .execute(&mut conn)?;

        Ok(())
    }

    async fn delete(&self, user_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let deleted = delete(users::table)
            .filter(users::id.eq(user_id))
            .execute(&mut conn)?;

        Ok(deleted > 0)
    }
}
