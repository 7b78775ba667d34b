//! 중앙화된 에러 처리 모듈.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::{inbox::InboxError, radar_items::RadarItemsError};

/// Error type returned by HTTP handlers.
#[derive(Error, Debug)]
pub enum AppError {
    /// Bad request error (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Unauthorized error (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Forbidden error (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Not found error (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Data service error
    #[error("Database error: {0}")]
    Database(#[from] RadarItemsError),

    /// Inbox queue error
    #[error("Inbox error: {0}")]
    Inbox(#[from] InboxError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Database(
                RadarItemsError::Unavailable | RadarItemsError::Database(sqlx::Error::PoolClosed),
            ) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Database unavailable".to_string(),
            ),
            Self::Database(e) => {
                tracing::error!("Database error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                )
            }
            Self::Inbox(e) => {
                tracing::warn!("Inbox rejected email: {e}");
                (StatusCode::SERVICE_UNAVAILABLE, e.to_string())
            }
        };

        // Report error to Sentry for server errors
        if status.is_server_error() {
            sentry::capture_error(&self);
        }

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_bad_request_display() {
        let error = AppError::BadRequest("no body".to_string());
        assert_eq!(error.to_string(), "Bad request: no body");
    }

    #[test]
    fn test_app_error_forbidden_display() {
        let error = AppError::Forbidden("sender not allowed".to_string());
        assert_eq!(error.to_string(), "Forbidden: sender not allowed");
    }

    #[test]
    fn test_app_error_database_display() {
        let error = AppError::Database(RadarItemsError::Unavailable);
        assert_eq!(error.to_string(), "Database error: Database unavailable");
    }

    #[tokio::test]
    async fn test_forbidden_into_response() {
        let response = AppError::Forbidden("nope".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_degraded_database_is_unavailable() {
        let response = AppError::Database(RadarItemsError::Unavailable).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_closed_pool_is_unavailable() {
        let response =
            AppError::Database(RadarItemsError::Database(sqlx::Error::PoolClosed)).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_full_inbox_is_unavailable() {
        let response = AppError::Inbox(InboxError::Full).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_error_response_is_json() {
        use axum::body::to_bytes;

        let response = AppError::NotFound("radar item 7".to_string()).into_response();

        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(parsed["error"], "radar item 7");
    }

    #[tokio::test]
    async fn test_all_error_types_produce_error_status() {
        let errors: Vec<AppError> = vec![
            AppError::BadRequest("bad".to_string()),
            AppError::Unauthorized("unauth".to_string()),
            AppError::Forbidden("forbidden".to_string()),
            AppError::NotFound("not found".to_string()),
            AppError::Database(RadarItemsError::Unavailable),
            AppError::Inbox(InboxError::Closed),
        ];

        for error in errors {
            let response = error.into_response();
            assert!(response.status().is_client_error() || response.status().is_server_error());
        }
    }
}
