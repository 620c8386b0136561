mod password;
mod tokens;

pub use password::{hash_password, verify_password};
pub use tokens::{AccessClaims, LinkStateClaims, TokenService};

use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use crates::domain::{
    entities::users::UserEntity, repositories::users::UserRepository,
    value_objects::enums::user_roles::UserRole,
};
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use crate::axum_http::error_responses::error_response;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingHeader,
    #[error("Invalid Authorization header format")]
    InvalidHeader,
    #[error("Token expired")]
    TokenExpired,
    #[error("Invalid token")]
    InvalidToken,
    #[error("User not found")]
    UserNotFound,
    #[error("User is banned")]
    Banned,
    #[error("Admin access required")]
    AdminRequired,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingHeader
            | AuthError::InvalidHeader
            | AuthError::TokenExpired
            | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::Banned | AuthError::AdminRequired => StatusCode::FORBIDDEN,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), self.to_string())
    }
}

/// Shared by the extractors; installed on the router as an `Extension`.
pub struct AuthState {
    pub tokens: TokenService,
    pub users: Arc<dyn UserRepository + Send + Sync>,
}

impl AuthState {
    pub fn new(tokens: TokenService, users: Arc<dyn UserRepository + Send + Sync>) -> Self {
        Self { tokens, users }
    }

    /// Resolves a bearer token to an active (non-banned) user.
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<AuthUser, AuthError> {
        let token = bearer_token(headers)?;
        let user_id = self.tokens.verify_access_token(token)?;

        let user = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "auth: failed to load user");
                AuthError::Internal(err)
            })?
            .ok_or(AuthError::UserNotFound)?;

        if user.is_banned() {
            return Err(AuthError::Banned);
        }

        Ok(AuthUser {
            user_id,
            role: user.role(),
            user,
        })
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidHeader)?;

    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::InvalidHeader)?;

    Ok(token)
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: UserRole,
    pub user: UserEntity,
}

#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

fn auth_state(parts: &Parts) -> Result<Arc<AuthState>, AuthError> {
    parts
        .extensions
        .get::<Arc<AuthState>>()
        .cloned()
        .ok_or_else(|| AuthError::Internal(anyhow::anyhow!("auth state extension is not installed")))
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let state = auth_state(parts)?;
        state.authenticate(&parts.headers).await
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        if !auth.role.is_admin() {
            return Err(AuthError::AdminRequired);
        }

        Ok(AdminUser(auth))
    }
}

#[cfg(test)]
mod tests;
