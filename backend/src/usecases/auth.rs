use std::sync::Arc;

use axum::http::StatusCode;
use crates::domain::{
    entities::users::InsertUserEntity,
    repositories::users::UserRepository,
    value_objects::{
        enums::{user_roles::UserRole, user_statuses::UserStatus},
        users::{LoginModel, LoginDto, RegisterUserModel, UserDto},
    },
};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::auth::{AuthError, TokenService, hash_password, verify_password};

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Error)]
pub enum AuthUseCaseError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("User already exists")]
    EmailTaken,
    #[error("Username already taken")]
    UsernameTaken,
    #[error("Incorrect email or password")]
    InvalidCredentials,
    #[error("User is banned")]
    Banned,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AuthUseCaseError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthUseCaseError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AuthUseCaseError::EmailTaken | AuthUseCaseError::UsernameTaken => StatusCode::CONFLICT,
            AuthUseCaseError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthUseCaseError::Banned => StatusCode::FORBIDDEN,
            AuthUseCaseError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AuthError> for AuthUseCaseError {
    fn from(err: AuthError) -> Self {
        AuthUseCaseError::Internal(anyhow::anyhow!(err))
    }
}

pub type UseCaseResult<T> = std::result::Result<T, AuthUseCaseError>;

pub struct AuthUseCase<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    user_repo: Arc<U>,
    tokens: TokenService,
}

impl<U> AuthUseCase<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>, tokens: TokenService) -> Self {
        Self { user_repo, tokens }
    }

    pub async fn register(&self, model: RegisterUserModel) -> UseCaseResult<UserDto> {
        let email = model.email.trim().to_lowercase();
        let username = model.username.trim().to_string();

        if !email.contains('@') {
            return Err(AuthUseCaseError::InvalidInput("email is invalid".to_string()));
        }
        if username.is_empty() {
            return Err(AuthUseCaseError::InvalidInput("username is required".to_string()));
        }
        if model.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthUseCaseError::InvalidInput(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AuthUseCaseError::EmailTaken);
        }
        if self.user_repo.find_by_username(&username).await?.is_some() {
            return Err(AuthUseCaseError::UsernameTaken);
        }

        let password_hash = hash_password(&model.password)?;

        let user = self
            .user_repo
            .create(InsertUserEntity {
                email,
                username,
                password_hash,
                role: UserRole::User.to_string(),
                status: UserStatus::Active.to_string(),
            })
            .await
            .map_err(|err| {
                error!(db_error = ?err, "auth: failed to create user");
                AuthUseCaseError::Internal(err)
            })?;

        info!(user_id = %user.id, "auth: user registered");
        Ok(UserDto::from(user))
    }

    pub async fn login(&self, model: LoginModel) -> UseCaseResult<LoginDto> {
        let email = model.email.trim().to_lowercase();

        let Some(user) = self.user_repo.find_by_email(&email).await? else {
            return Err(AuthUseCaseError::InvalidCredentials);
        };

        if !verify_password(&model.password, &user.password_hash) {
            warn!(user_id = %user.id, "auth: wrong password");
            return Err(AuthUseCaseError::InvalidCredentials);
        }
        if user.is_banned() {
            return Err(AuthUseCaseError::Banned);
        }

        let token = self.tokens.issue_access_token(user.id)?;
        info!(user_id = %user.id, "auth: user logged in");

        Ok(LoginDto::bearer(UserDto::from(user), token))
    }
}
