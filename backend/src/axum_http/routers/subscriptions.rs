use crate::{
    auth::AuthUser,
    axum_http::error_responses::AppError,
    usecases::{audit_log::AuditSink, subscriptions::SubscriptionUseCase},
};
use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use crates::{
    discord::role_sync::RoleSync,
    domain::{
        repositories::{subscriptions::SubscriptionRepository, users::UserRepository},
        value_objects::{networks::NetworkWallets, subscriptions::ConfirmSubscriptionRequest},
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{subscriptions::SubscriptionPostgres, users::UserPostgres},
    },
    payments::ChainVerifier,
};
use std::sync::Arc;
use tracing::info;

pub fn routes<V, R, A>(
    db_pool: Arc<PgPoolSquad>,
    chain_verifier: Arc<V>,
    role_sync: Arc<R>,
    audit: Arc<A>,
    wallets: Arc<NetworkWallets>,
) -> Router
where
    V: ChainVerifier + Send + Sync + 'static,
    R: RoleSync + Send + Sync + 'static,
    A: AuditSink + Send + Sync + 'static,
{
    let subscription_repository = SubscriptionPostgres::new(Arc::clone(&db_pool));
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));

    let usecase = SubscriptionUseCase::new(
        Arc::new(subscription_repository),
        Arc::new(user_repository),
        chain_verifier,
        role_sync,
        audit,
        wallets,
    );

    Router::new()
        .route("/plans", get(plans_and_networks))
        .route("/confirm", post(confirm_subscription))
        .route("/me", get(current_subscription))
        .route("/history", get(history))
        .with_state(Arc::new(usecase))
}

pub async fn plans_and_networks<S, U, V, R, A>(
    State(usecase): State<Arc<SubscriptionUseCase<S, U, V, R, A>>>,
) -> impl IntoResponse
where
    S: SubscriptionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    V: ChainVerifier + Send + Sync + 'static,
    R: RoleSync + Send + Sync + 'static,
    A: AuditSink + Send + Sync + 'static,
{
    Json(usecase.plans_and_networks())
}

pub async fn confirm_subscription<S, U, V, R, A>(
    State(usecase): State<Arc<SubscriptionUseCase<S, U, V, R, A>>>,
    AuthUser { user_id, .. }: AuthUser,
    Json(request): Json<ConfirmSubscriptionRequest>,
) -> impl IntoResponse
where
    S: SubscriptionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    V: ChainVerifier + Send + Sync + 'static,
    R: RoleSync + Send + Sync + 'static,
    A: AuditSink + Send + Sync + 'static,
{
    info!(%user_id, network = %request.network, "subscriptions: confirm request received");
    match usecase.confirm_subscription(user_id, request).await {
        Ok(subscription) => Json(subscription).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn current_subscription<S, U, V, R, A>(
    State(usecase): State<Arc<SubscriptionUseCase<S, U, V, R, A>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> impl IntoResponse
where
    S: SubscriptionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    V: ChainVerifier + Send + Sync + 'static,
    R: RoleSync + Send + Sync + 'static,
    A: AuditSink + Send + Sync + 'static,
{
    match usecase.current_subscription(user_id).await {
        Ok(current) => Json(current).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn history<S, U, V, R, A>(
    State(usecase): State<Arc<SubscriptionUseCase<S, U, V, R, A>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> impl IntoResponse
where
    S: SubscriptionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    V: ChainVerifier + Send + Sync + 'static,
    R: RoleSync + Send + Sync + 'static,
    A: AuditSink + Send + Sync + 'static,
{
    match usecase.history(user_id).await {
        Ok(rows) => Json(rows).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}
