use std::{sync::Arc, time::Instant};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use crates::domain::value_objects::admin_logs::AuditEntry;

use crate::{
    auth::{TokenService, bearer_token},
    usecases::audit_log::AuditSink,
};

pub const HTTP_REQUEST_ACTION: &str = "http_request";
pub const ANONYMOUS_ACTOR: &str = "anonymous";

pub struct RequestAuditState {
    pub tokens: TokenService,
    pub audit: Arc<dyn AuditSink + Send + Sync>,
}

/// Records every request as an `http_request` audit entry once the response is ready.
/// The write happens off the request path.
pub async fn request_audit(
    State(state): State<Arc<RequestAuditState>>,
    request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let actor = bearer_token(request.headers())
        .ok()
        .and_then(|token| state.tokens.verify_access_token(token).ok())
        .map(|user_id| user_id.to_string())
        .unwrap_or_else(|| ANONYMOUS_ACTOR.to_string());

    let response = next.run(request).await;

    let details = format!(
        "method={}, path={}, status={}, duration={:.4}",
        method,
        path,
        response.status().as_u16(),
        started.elapsed().as_secs_f64()
    );
    let audit = Arc::clone(&state.audit);
    tokio::spawn(async move {
        audit
            .record(AuditEntry::new(HTTP_REQUEST_ACTION, actor).details(details))
            .await;
    });

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::audit_log::MockAuditSink;
    use axum::{Router, body::Body, http::StatusCode, middleware, routing::get};
    use tokio::sync::mpsc;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn app(tokens: TokenService, audit: MockAuditSink) -> Router {
        let state = Arc::new(RequestAuditState {
            tokens,
            audit: Arc::new(audit),
        });

        Router::new()
            .route("/api/v1/health-check", get(|| async { "ok" }))
            .fallback(|| async { StatusCode::NOT_FOUND })
            .layer(middleware::from_fn_with_state(state, request_audit))
    }

    fn capturing_audit() -> (MockAuditSink, mpsc::UnboundedReceiver<AuditEntry>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut audit = MockAuditSink::new();
        audit.expect_record().returning(move |entry| {
            let _ = tx.send(entry);
        });
        (audit, rx)
    }

    #[tokio::test]
    async fn anonymous_request_is_recorded() {
        let (audit, mut rx) = capturing_audit();
        let tokens = TokenService::new("supersecretjwtsecretforunittesting123", 60);

        let response = app(tokens, audit)
            .oneshot(
                axum::http::Request::builder()
                    .uri("/api/v1/health-check")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let entry = rx.recv().await.unwrap();
        assert_eq!(entry.action, HTTP_REQUEST_ACTION);
        assert_eq!(entry.actor_id, ANONYMOUS_ACTOR);
        let details = entry.details.unwrap();
        assert!(details.starts_with("method=GET, path=/api/v1/health-check, status=200"));
    }

    #[tokio::test]
    async fn bearer_user_becomes_actor() {
        let (audit, mut rx) = capturing_audit();
        let tokens = TokenService::new("supersecretjwtsecretforunittesting123", 60);
        let user_id = Uuid::new_v4();
        let token = tokens.issue_access_token(user_id).unwrap();

        app(tokens, audit)
            .oneshot(
                axum::http::Request::builder()
                    .uri("/api/v1/missing")
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let entry = rx.recv().await.unwrap();
        assert_eq!(entry.actor_id, user_id.to_string());
        assert!(entry.details.unwrap().contains("status=404"));
    }
}
