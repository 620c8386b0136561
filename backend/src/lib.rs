pub mod auth;
pub mod axum_http;
pub mod config;
pub mod rate_limiter;
pub mod usecases;
