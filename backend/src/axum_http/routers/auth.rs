use crate::{
    auth::{AuthUser, TokenService},
    axum_http::error_responses::AppError,
    usecases::auth::AuthUseCase,
};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use crates::{
    domain::{
        repositories::users::UserRepository,
        value_objects::users::{LoginModel, RegisterUserModel, UserDto},
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad, repositories::users::UserPostgres,
    },
};
use std::sync::Arc;
use tracing::info;

pub fn routes(db_pool: Arc<PgPoolSquad>, tokens: TokenService) -> Router {
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let usecase = AuthUseCase::new(Arc::new(user_repository), tokens);

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
        .with_state(Arc::new(usecase))
}

pub async fn register<U>(
    State(usecase): State<Arc<AuthUseCase<U>>>,
    Json(model): Json<RegisterUserModel>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
{
    match usecase.register(model).await {
        Ok(user) => (StatusCode::CREATED, Json(user)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn login<U>(
    State(usecase): State<Arc<AuthUseCase<U>>>,
    Json(model): Json<LoginModel>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
{
    match usecase.login(model).await {
        Ok(login) => Json(login).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn me(AuthUser { user_id, user, .. }: AuthUser) -> impl IntoResponse {
    info!(%user_id, "auth: profile request received");
    Json(UserDto::from(user))
}
