use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::users::UserEntity,
    value_objects::enums::{user_roles::UserRole, user_statuses::UserStatus},
};

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUserModel {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginModel {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LoginDto {
    pub user: UserDto,
    pub access_token: String,
    pub token_type: &'static str,
}

impl LoginDto {
    pub fn bearer(user: UserDto, access_token: String) -> Self {
        Self {
            user,
            access_token,
            token_type: "bearer",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserDto {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub discord_id: Option<String>,
    pub discord_username: Option<String>,
    pub discord_avatar_url: Option<String>,
    pub is_admin: bool,
    pub is_superadmin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<UserEntity> for UserDto {
    fn from(value: UserEntity) -> Self {
        let role = UserRole::from_str(&value.role);

        Self {
            id: value.id,
            role,
            is_admin: role.is_admin(),
            is_superadmin: role == UserRole::Superadmin,
            status: UserStatus::from_str(&value.status),
            email: value.email,
            username: value.username,
            discord_id: value.discord_id,
            discord_username: value.discord_username,
            discord_avatar_url: value.discord_avatar_url,
            created_at: value.created_at,
        }
    }
}

/// Profile fetched from Discord that gets attached to a local account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscordProfile {
    pub id: String,
    pub username: String,
    pub avatar_url: Option<String>,
}
