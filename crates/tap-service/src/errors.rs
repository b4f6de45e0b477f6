//! Tap service error types.
//!
//! All errors map to HTTP status codes via the `IntoResponse` impl. Bodies use
//! the flat `{"error": "<message>"}` shape the Mini App frontend consumes.
//! Internal details (database errors, Bot API failures) are logged
//! server-side and replaced by generic messages.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Message returned for every initData rejection, whatever the reason.
pub const INVALID_INIT_DATA_MESSAGE: &str = "Invalid Telegram initData";

/// Tap service error type.
///
/// Maps to HTTP status codes:
/// - BadRequest: 400 Bad Request
/// - Unauthenticated: 403 Forbidden
/// - NotFound: 404 Not Found
/// - Database, ServiceUnavailable, Internal: 500 Internal Server Error
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid Telegram initData")]
    Unauthenticated,

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Database(_) | ApiError::ServiceUnavailable(_) | ApiError::Internal => 500,
            ApiError::BadRequest(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::Unauthenticated => 403,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Database(err) => {
                // Log actual error server-side, return generic message to client
                tracing::error!(target: "tap.database", error = %err, "Database operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal database error occurred".to_string(),
                )
            }
            ApiError::BadRequest(reason) => (StatusCode::BAD_REQUEST, reason),
            ApiError::NotFound(reason) => (StatusCode::NOT_FOUND, reason),
            ApiError::Unauthenticated => {
                (StatusCode::FORBIDDEN, INVALID_INIT_DATA_MESSAGE.to_string())
            }
            ApiError::ServiceUnavailable(reason) => {
                tracing::warn!(target: "tap.availability", reason = %reason, "Upstream unavailable");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to connect to Telegram API".to_string(),
                )
            }
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal error occurred".to_string(),
            ),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Convert sqlx errors to ApiError
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Database(err.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;

    async fn read_body_json(body: Body) -> serde_json::Value {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_display_variants() {
        assert_eq!(
            ApiError::Database("locked".to_string()).to_string(),
            "Database error: locked"
        );
        assert_eq!(
            ApiError::BadRequest("UserId is required".to_string()).to_string(),
            "Bad request: UserId is required"
        );
        assert_eq!(ApiError::Unauthenticated.to_string(), INVALID_INIT_DATA_MESSAGE);
        assert_eq!(ApiError::Internal.to_string(), "Internal server error");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::Database("x".to_string()).status_code(), 500);
        assert_eq!(ApiError::BadRequest("x".to_string()).status_code(), 400);
        assert_eq!(ApiError::NotFound("x".to_string()).status_code(), 404);
        assert_eq!(ApiError::Unauthenticated.status_code(), 403);
        assert_eq!(
            ApiError::ServiceUnavailable("x".to_string()).status_code(),
            500
        );
        assert_eq!(ApiError::Internal.status_code(), 500);
    }

    #[tokio::test]
    async fn test_into_response_unauthenticated() {
        let response = ApiError::Unauthenticated.into_response();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json, serde_json::json!({"error": "Invalid Telegram initData"}));
    }

    #[tokio::test]
    async fn test_into_response_database_error_is_generic() {
        let response = ApiError::Database("database is locked".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["error"], "An internal database error occurred");
    }

    #[tokio::test]
    async fn test_into_response_not_found() {
        let response = ApiError::NotFound("User not found".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["error"], "User not found");
    }

    #[tokio::test]
    async fn test_into_response_bad_request() {
        let response = ApiError::BadRequest("GamerId is required".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["error"], "GamerId is required");
    }

    #[tokio::test]
    async fn test_into_response_service_unavailable() {
        let response =
            ApiError::ServiceUnavailable("connection refused".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["error"], "Failed to connect to Telegram API");
    }
}
