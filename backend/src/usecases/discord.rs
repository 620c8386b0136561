use std::sync::Arc;

use axum::http::StatusCode;
use crates::{
    discord::{
        oauth::{DiscordOAuth, DiscordOAuthError},
        role_sync::RoleSync,
    },
    domain::{
        entities::users::DiscordLinkChangeset,
        repositories::{
            subscriptions::SubscriptionRepository,
            users::{LinkDiscordError as LinkRepositoryError, UserRepository},
        },
        value_objects::{admin_logs::AuditEntry, users::UserDto},
    },
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::audit_log::AuditSink;
use crate::auth::{AuthError, TokenService};

pub const DISCORD_LINKED_ACTION: &str = "discord_linked";
pub const DISCORD_UNLINKED_ACTION: &str = "discord_unlinked";

#[derive(Debug, Error)]
pub enum DiscordLinkError {
    #[error("Discord login is not configured")]
    NotConfigured,
    #[error("Invalid or expired state")]
    InvalidState,
    #[error("Discord authorization failed: {0}")]
    Upstream(String),
    #[error("Discord account is already linked to another user")]
    AlreadyLinked,
    #[error("User not found")]
    UserNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl DiscordLinkError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DiscordLinkError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            DiscordLinkError::InvalidState => StatusCode::BAD_REQUEST,
            DiscordLinkError::Upstream(_) => StatusCode::BAD_GATEWAY,
            DiscordLinkError::AlreadyLinked => StatusCode::CONFLICT,
            DiscordLinkError::UserNotFound => StatusCode::NOT_FOUND,
            DiscordLinkError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DiscordOAuthError> for DiscordLinkError {
    fn from(err: DiscordOAuthError) -> Self {
        match err {
            DiscordOAuthError::NotConfigured => DiscordLinkError::NotConfigured,
            other => DiscordLinkError::Upstream(other.to_string()),
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, DiscordLinkError>;

#[derive(Debug, Serialize, PartialEq)]
pub struct DiscordLoginDto {
    pub url: String,
}

pub struct DiscordLinkUseCase<U, S, O, R, A>
where
    U: UserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    O: DiscordOAuth + Send + Sync + 'static,
    R: RoleSync + Send + Sync + 'static,
    A: AuditSink + Send + Sync + 'static,
{
    user_repo: Arc<U>,
    subscription_repo: Arc<S>,
    oauth: Arc<O>,
    role_sync: Arc<R>,
    audit: Arc<A>,
    tokens: TokenService,
}

impl<U, S, O, R, A> DiscordLinkUseCase<U, S, O, R, A>
where
    U: UserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    O: DiscordOAuth + Send + Sync + 'static,
    R: RoleSync + Send + Sync + 'static,
    A: AuditSink + Send + Sync + 'static,
{
    pub fn new(
        user_repo: Arc<U>,
        subscription_repo: Arc<S>,
        oauth: Arc<O>,
        role_sync: Arc<R>,
        audit: Arc<A>,
        tokens: TokenService,
    ) -> Self {
        Self {
            user_repo,
            subscription_repo,
            oauth,
            role_sync,
            audit,
            tokens,
        }
    }

    pub fn login_url(&self, user_id: Uuid) -> UseCaseResult<DiscordLoginDto> {
        let state = self
            .tokens
            .issue_link_state(user_id)
            .map_err(|err| DiscordLinkError::Internal(anyhow::anyhow!(err)))?;
        let url = self.oauth.authorize_url(&state)?;

        Ok(DiscordLoginDto { url })
    }

    /// Completes the OAuth round trip and attaches the Discord account to the user named in `state`.
    pub async fn callback(&self, code: &str, state: &str) -> UseCaseResult<UserDto> {
        let user_id = self.tokens.verify_link_state(state).map_err(|err| match err {
            AuthError::Internal(err) => DiscordLinkError::Internal(err),
            _ => DiscordLinkError::InvalidState,
        })?;

        let profile = self.oauth.fetch_profile(code).await.map_err(|err| {
            warn!(%user_id, error = %err, "discord: oauth exchange failed");
            DiscordLinkError::from(err)
        })?;

        let user = self
            .user_repo
            .set_discord_link(
                user_id,
                DiscordLinkChangeset {
                    discord_id: Some(profile.id.clone()),
                    discord_username: Some(profile.username.clone()),
                    discord_avatar_url: profile.avatar_url.clone(),
                },
            )
            .await
            .map_err(|err| match err {
                LinkRepositoryError::AlreadyLinked => DiscordLinkError::AlreadyLinked,
                LinkRepositoryError::Other(err) => {
                    error!(%user_id, db_error = ?err, "discord: failed to store link");
                    DiscordLinkError::Internal(err)
                }
            })?;

        info!(%user_id, discord_id = %profile.id, "discord: account linked");

        match self.subscription_repo.find_active_by_user_id(user_id).await {
            Ok(Some(_)) => {
                self.role_sync.grant_subscriber_role(&profile.id).await;
            }
            Ok(None) => {}
            Err(err) => {
                error!(%user_id, db_error = ?err, "discord: failed to check subscription after linking");
            }
        }

        self.audit
            .record(
                AuditEntry::new(DISCORD_LINKED_ACTION, user_id.to_string())
                    .target(user_id.to_string())
                    .details(format!("discord_id={}", profile.id)),
            )
            .await;

        Ok(UserDto::from(user))
    }

    pub async fn unlink(&self, user_id: Uuid) -> UseCaseResult<()> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(DiscordLinkError::UserNotFound)?;

        let Some(discord_id) = user.discord_id else {
            return Ok(());
        };

        self.user_repo
            .clear_discord_link(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "discord: failed to clear link");
                DiscordLinkError::Internal(err)
            })?;

        self.role_sync.revoke_subscriber_role(&discord_id).await;

        self.audit
            .record(
                AuditEntry::new(DISCORD_UNLINKED_ACTION, user_id.to_string())
                    .target(user_id.to_string())
                    .details(format!("discord_id={discord_id}")),
            )
            .await;

        info!(%user_id, "discord: account unlinked");
        Ok(())
    }
}
