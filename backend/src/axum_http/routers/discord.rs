use crate::{
    auth::{AuthUser, TokenService},
    axum_http::error_responses::AppError,
    usecases::{audit_log::AuditSink, discord::DiscordLinkUseCase},
};
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use crates::{
    discord::{oauth::DiscordOAuth, role_sync::RoleSync},
    domain::repositories::{subscriptions::SubscriptionRepository, users::UserRepository},
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{subscriptions::SubscriptionPostgres, users::UserPostgres},
    },
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
}

pub fn routes<O, R, A>(
    db_pool: Arc<PgPoolSquad>,
    oauth: Arc<O>,
    role_sync: Arc<R>,
    audit: Arc<A>,
    tokens: TokenService,
) -> Router
where
    O: DiscordOAuth + Send + Sync + 'static,
    R: RoleSync + Send + Sync + 'static,
    A: AuditSink + Send + Sync + 'static,
{
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let subscription_repository = SubscriptionPostgres::new(Arc::clone(&db_pool));

    let usecase = DiscordLinkUseCase::new(
        Arc::new(user_repository),
        Arc::new(subscription_repository),
        oauth,
        role_sync,
        audit,
        tokens,
    );

    Router::new()
        .route("/login", get(login_url))
        .route("/callback", get(callback))
        .route("/unlink", post(unlink))
        .with_state(Arc::new(usecase))
}

pub async fn login_url<U, S, O, R, A>(
    State(usecase): State<Arc<DiscordLinkUseCase<U, S, O, R, A>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    O: DiscordOAuth + Send + Sync + 'static,
    R: RoleSync + Send + Sync + 'static,
    A: AuditSink + Send + Sync + 'static,
{
    match usecase.login_url(user_id) {
        Ok(login) => Json(login).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn callback<U, S, O, R, A>(
    State(usecase): State<Arc<DiscordLinkUseCase<U, S, O, R, A>>>,
    Query(query): Query<CallbackQuery>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    O: DiscordOAuth + Send + Sync + 'static,
    R: RoleSync + Send + Sync + 'static,
    A: AuditSink + Send + Sync + 'static,
{
    let (Some(code), Some(state)) = (query.code, query.state) else {
        return AppError::BadRequest("code and state are required".to_string()).into_response();
    };

    match usecase.callback(&code, &state).await {
        Ok(user) => Json(user).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn unlink<U, S, O, R, A>(
    State(usecase): State<Arc<DiscordLinkUseCase<U, S, O, R, A>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    O: DiscordOAuth + Send + Sync + 'static,
    R: RoleSync + Send + Sync + 'static,
    A: AuditSink + Send + Sync + 'static,
{
    info!(%user_id, "discord: unlink request received");
    match usecase.unlink(user_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}
