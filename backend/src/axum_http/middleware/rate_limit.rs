use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::rate_limiter::{Admission, RateLimiter, resolve_caller_ip};

pub const FORWARDED_FOR: &str = "x-forwarded-for";

pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let forwarded_for = request
        .headers()
        .get(FORWARDED_FOR)
        .and_then(|value| value.to_str().ok());
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let caller_ip = resolve_caller_ip(forwarded_for, peer);

    match limiter.check_at(&caller_ip, request.uri().path(), std::time::Instant::now()) {
        Admission::Rejected { retry_after } => too_many_requests(retry_after.as_secs().max(1)),
        Admission::Admitted | Admission::Unlimited => next.run(request).await,
    }
}

fn too_many_requests(retry_after_secs: u64) -> Response {
    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(json!({ "detail": "Too Many Requests" })),
    )
        .into_response();
    response
        .headers_mut()
        .insert(RETRY_AFTER, HeaderValue::from(retry_after_secs));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limiter::RouteClass;
    use axum::{Router, body::Body, middleware, routing::get};
    use tower::ServiceExt;

    fn app() -> Router {
        let limiter = Arc::new(RateLimiter::new(vec![RouteClass::new(
            "auth",
            vec!["/api/v1/auth"],
            1,
        )]));

        Router::new()
            .route("/api/v1/auth/login", get(|| async { "ok" }))
            .route("/api/v1/health-check", get(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(limiter, rate_limit))
    }

    fn request(path: &str) -> Request {
        axum::http::Request::builder()
            .uri(path)
            .header(FORWARDED_FOR, "198.51.100.4")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn second_auth_call_gets_429_with_retry_after() {
        let app = app();

        let first = app.clone().oneshot(request("/api/v1/auth/login")).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app.oneshot(request("/api/v1/auth/login")).await.unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(second.headers().contains_key(RETRY_AFTER));
    }

    #[tokio::test]
    async fn unclassified_routes_are_not_limited() {
        let app = app();

        for _ in 0..5 {
            let response = app
                .clone()
                .oneshot(request("/api/v1/health-check"))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
    }
}
