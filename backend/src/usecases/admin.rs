use std::sync::Arc;

use axum::http::StatusCode;
use crates::domain::{
    entities::users::UserEntity,
    repositories::{admin_logs::AdminLogRepository, users::UserRepository},
    value_objects::{
        admin_logs::{AdminLogDto, AdminLogFilter, AdminLogPageDto, AuditEntry},
        enums::{user_roles::UserRole, user_statuses::UserStatus},
        users::UserDto,
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::audit_log::AuditSink;

pub const BAN_USER_ACTION: &str = "admin_ban_user";
pub const UNBAN_USER_ACTION: &str = "admin_unban_user";
pub const MAKE_ADMIN_ACTION: &str = "admin_make_admin";
pub const DELETE_USER_ACTION: &str = "admin_delete_user";

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("User not found")]
    UserNotFound,
    #[error("Administrators cannot apply this action to themselves")]
    SelfAction,
    #[error("Only a superadmin can modify another superadmin")]
    Forbidden,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AdminError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AdminError::UserNotFound => StatusCode::NOT_FOUND,
            AdminError::SelfAction => StatusCode::BAD_REQUEST,
            AdminError::Forbidden => StatusCode::FORBIDDEN,
            AdminError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, AdminError>;

/// The administrator performing an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: UserRole,
}

pub struct AdminUseCase<U, L, A>
where
    U: UserRepository + Send + Sync + 'static,
    L: AdminLogRepository + Send + Sync + 'static,
    A: AuditSink + Send + Sync + 'static,
{
    user_repo: Arc<U>,
    admin_log_repo: Arc<L>,
    audit: Arc<A>,
}

impl<U, L, A> AdminUseCase<U, L, A>
where
    U: UserRepository + Send + Sync + 'static,
    L: AdminLogRepository + Send + Sync + 'static,
    A: AuditSink + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>, admin_log_repo: Arc<L>, audit: Arc<A>) -> Self {
        Self {
            user_repo,
            admin_log_repo,
            audit,
        }
    }

    pub async fn list_users(&self) -> UseCaseResult<Vec<UserDto>> {
        let users = self.user_repo.list_all().await.map_err(|err| {
            error!(db_error = ?err, "admin: failed to list users");
            AdminError::Internal(err)
        })?;

        Ok(users.into_iter().map(UserDto::from).collect())
    }

    pub async fn ban_user(&self, actor: Actor, user_id: Uuid) -> UseCaseResult<UserDto> {
        self.set_status(actor, user_id, UserStatus::Banned, BAN_USER_ACTION)
            .await
    }

    pub async fn unban_user(&self, actor: Actor, user_id: Uuid) -> UseCaseResult<UserDto> {
        self.set_status(actor, user_id, UserStatus::Active, UNBAN_USER_ACTION)
            .await
    }

    pub async fn make_admin(&self, actor: Actor, user_id: Uuid) -> UseCaseResult<UserDto> {
        let mut target = self.guarded_target(actor, user_id).await?;

        if !target.role().is_admin() {
            self.user_repo
                .update_role(user_id, UserRole::Admin)
                .await
                .map_err(|err| {
                    error!(%user_id, db_error = ?err, "admin: failed to update role");
                    AdminError::Internal(err)
                })?;
            target.role = UserRole::Admin.to_string();
        }

        self.record(actor, MAKE_ADMIN_ACTION, user_id, format!("role={}", target.role))
            .await;
        info!(actor_id = %actor.id, %user_id, "admin: user promoted to admin");

        Ok(UserDto::from(target))
    }

    pub async fn delete_user(&self, actor: Actor, user_id: Uuid) -> UseCaseResult<()> {
        let target = self.guarded_target(actor, user_id).await?;

        let deleted = self.user_repo.delete(user_id).await.map_err(|err| {
            error!(%user_id, db_error = ?err, "admin: failed to delete user");
            AdminError::Internal(err)
        })?;
        if !deleted {
            return Err(AdminError::UserNotFound);
        }

        self.record(actor, DELETE_USER_ACTION, user_id, format!("email={}", target.email))
            .await;
        info!(actor_id = %actor.id, %user_id, "admin: user deleted");

        Ok(())
    }

    pub async fn list_logs(&self, filter: AdminLogFilter) -> UseCaseResult<AdminLogPageDto> {
        let (total, rows) = self.admin_log_repo.list(filter).await.map_err(|err| {
            error!(db_error = ?err, "admin: failed to list audit logs");
            AdminError::Internal(err)
        })?;

        Ok(AdminLogPageDto {
            total,
            items: rows.into_iter().map(AdminLogDto::from).collect(),
        })
    }

    async fn set_status(
        &self,
        actor: Actor,
        user_id: Uuid,
        status: UserStatus,
        action: &'static str,
    ) -> UseCaseResult<UserDto> {
        let mut target = self.guarded_target(actor, user_id).await?;

        self.user_repo
            .update_status(user_id, status)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "admin: failed to update status");
                AdminError::Internal(err)
            })?;
        target.status = status.to_string();

        self.record(actor, action, user_id, format!("status={status}"))
            .await;
        info!(actor_id = %actor.id, %user_id, %status, "admin: user status changed");

        Ok(UserDto::from(target))
    }

    /// Loads the target and refuses self-actions and admins acting on a superadmin.
    async fn guarded_target(&self, actor: Actor, user_id: Uuid) -> UseCaseResult<UserEntity> {
        if actor.id == user_id {
            warn!(actor_id = %actor.id, "admin: refused self-action");
            return Err(AdminError::SelfAction);
        }

        let target = self
            .user_repo
            .find_by_id(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "admin: failed to load user");
                AdminError::Internal(err)
            })?
            .ok_or(AdminError::UserNotFound)?;

        if target.role() == UserRole::Superadmin && actor.role != UserRole::Superadmin {
            warn!(actor_id = %actor.id, %user_id, "admin: refused action on superadmin");
            return Err(AdminError::Forbidden);
        }

        Ok(target)
    }

    async fn record(&self, actor: Actor, action: &'static str, user_id: Uuid, details: String) {
        self.audit
            .record(
                AuditEntry::new(action, actor.id.to_string())
                    .target(user_id.to_string())
                    .details(details),
            )
            .await;
    }
}
