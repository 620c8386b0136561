use crate::{
    auth::AdminUser,
    axum_http::error_responses::AppError,
    usecases::{
        admin::{Actor, AdminUseCase},
        audit_log::AuditSink,
    },
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use crates::{
    domain::{
        repositories::{admin_logs::AdminLogRepository, users::UserRepository},
        value_objects::admin_logs::AdminLogFilter,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{admin_logs::AdminLogPostgres, users::UserPostgres},
    },
};
use std::sync::Arc;
use uuid::Uuid;

pub fn routes<A>(db_pool: Arc<PgPoolSquad>, audit: Arc<A>) -> Router
where
    A: AuditSink + Send + Sync + 'static,
{
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let admin_log_repository = AdminLogPostgres::new(Arc::clone(&db_pool));

    let usecase = AdminUseCase::new(
        Arc::new(user_repository),
        Arc::new(admin_log_repository),
        audit,
    );

    Router::new()
        .route("/users", get(list_users))
        .route("/users/:user_id", delete(delete_user))
        .route("/users/:user_id/ban", post(ban_user))
        .route("/users/:user_id/unban", post(unban_user))
        .route("/users/:user_id/make-admin", post(make_admin))
        .route("/logs", get(list_logs))
        .with_state(Arc::new(usecase))
}

fn actor(AdminUser(auth): &AdminUser) -> Actor {
    Actor {
        id: auth.user_id,
        role: auth.role,
    }
}

pub async fn list_users<U, L, A>(
    State(usecase): State<Arc<AdminUseCase<U, L, A>>>,
    _admin: AdminUser,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    L: AdminLogRepository + Send + Sync + 'static,
    A: AuditSink + Send + Sync + 'static,
{
    match usecase.list_users().await {
        Ok(users) => Json(users).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn ban_user<U, L, A>(
    State(usecase): State<Arc<AdminUseCase<U, L, A>>>,
    admin: AdminUser,
    Path(user_id): Path<Uuid>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    L: AdminLogRepository + Send + Sync + 'static,
    A: AuditSink + Send + Sync + 'static,
{
    match usecase.ban_user(actor(&admin), user_id).await {
        Ok(user) => Json(user).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn unban_user<U, L, A>(
    State(usecase): State<Arc<AdminUseCase<U, L, A>>>,
    admin: AdminUser,
    Path(user_id): Path<Uuid>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    L: AdminLogRepository + Send + Sync + 'static,
    A: AuditSink + Send + Sync + 'static,
{
    match usecase.unban_user(actor(&admin), user_id).await {
        Ok(user) => Json(user).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn make_admin<U, L, A>(
    State(usecase): State<Arc<AdminUseCase<U, L, A>>>,
    admin: AdminUser,
    Path(user_id): Path<Uuid>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    L: AdminLogRepository + Send + Sync + 'static,
    A: AuditSink + Send + Sync + 'static,
{
    match usecase.make_admin(actor(&admin), user_id).await {
        Ok(user) => Json(user).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn delete_user<U, L, A>(
    State(usecase): State<Arc<AdminUseCase<U, L, A>>>,
    admin: AdminUser,
    Path(user_id): Path<Uuid>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    L: AdminLogRepository + Send + Sync + 'static,
    A: AuditSink + Send + Sync + 'static,
{
    match usecase.delete_user(actor(&admin), user_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn list_logs<U, L, A>(
    State(usecase): State<Arc<AdminUseCase<U, L, A>>>,
    _admin: AdminUser,
    Query(filter): Query<AdminLogFilter>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    L: AdminLogRepository + Send + Sync + 'static,
    A: AuditSink + Send + Sync + 'static,
{
    match usecase.list_logs(filter).await {
        Ok(page) => Json(page).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}
