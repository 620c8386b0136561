use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::{
    auth::AuthError,
    usecases::{
        admin::AdminError, auth::AuthUseCaseError, discord::DiscordLinkError,
        subscriptions::SubscriptionError,
    },
};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

/// JSON error body. Server errors never expose their details.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let message = if status.is_server_error() {
        "Internal server error".to_string()
    } else {
        message.into()
    };

    let body = Json(ErrorResponse {
        code: status.as_u16(),
        message,
    });

    (status, body).into_response()
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{message}")]
    Status { status: StatusCode, message: String },

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(status: StatusCode, message: impl Into<String>) -> Self {
        AppError::Status {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(msg) => error_response(StatusCode::BAD_REQUEST, msg),
            AppError::Status { status, message } => error_response(status, message),
            AppError::Internal(_) => error_response(StatusCode::INTERNAL_SERVER_ERROR, ""),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::status(err.status_code(), err.to_string())
    }
}

impl From<AuthUseCaseError> for AppError {
    fn from(err: AuthUseCaseError) -> Self {
        AppError::status(err.status_code(), err.to_string())
    }
}

impl From<SubscriptionError> for AppError {
    fn from(err: SubscriptionError) -> Self {
        AppError::status(err.status_code(), err.to_string())
    }
}

impl From<DiscordLinkError> for AppError {
    fn from(err: DiscordLinkError) -> Self {
        AppError::status(err.status_code(), err.to_string())
    }
}

impl From<AdminError> for AppError {
    fn from(err: AdminError) -> Self {
        AppError::status(err.status_code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_hide_details() {
        let response = AppError::status(StatusCode::INTERNAL_SERVER_ERROR, "db password leaked")
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn client_errors_keep_status() {
        let response = AppError::status(StatusCode::CONFLICT, "duplicate").into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
