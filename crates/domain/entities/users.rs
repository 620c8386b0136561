use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    domain::value_objects::enums::{user_roles::UserRole, user_statuses::UserStatus},
    infra::db::postgres::schema::users,
};

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = users)]
pub struct UserEntity {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub status: String,
    pub discord_id: Option<String>,
    pub discord_username: Option<String>,
    pub discord_avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserEntity {
    pub fn role(&self) -> UserRole {
        UserRole::from_str(&self.role)
    }

    pub fn is_banned(&self) -> bool {
        UserStatus::from_str(&self.status) == UserStatus::Banned
    }
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = users)]
pub struct InsertUserEntity {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub status: String,
}

/// Discord columns written together when linking or unlinking an account.
#[derive(Debug, Clone, Default, PartialEq, AsChangeset)]
#[diesel(table_name = users, treat_none_as_null = true)]
pub struct DiscordLinkChangeset {
    pub discord_id: Option<String>,
    pub discord_username: Option<String>,
    pub discord_avatar_url: Option<String>,
}
