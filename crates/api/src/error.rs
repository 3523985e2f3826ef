//! Error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use clubhouse_core::{ask::AskError, content::ContentError};
use clubhouse_shared::AppError;

/// Message returned whenever the LLM provider cannot answer.
pub const BUSY_MESSAGE: &str = "The service is busy. Please try again later.";

const INTERNAL_MESSAGE: &str = "An error occurred";

/// Handler error rendered as `{"error", "message", "status": "error"}`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Text shown to the client.
    fn client_message(&self) -> &str {
        match &self.0 {
            AppError::NotFound(msg) | AppError::Validation(msg) | AppError::PayloadTooLarge(msg) => {
                msg
            }
            AppError::ServiceUnavailable(_) => BUSY_MESSAGE,
            AppError::Database(_) | AppError::Storage(_) | AppError::Internal(_) => {
                INTERNAL_MESSAGE
            }
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<ContentError> for ApiError {
    fn from(err: ContentError) -> Self {
        Self(err.into())
    }
}

impl From<AskError> for ApiError {
    fn from(err: AskError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            error!(error = %self.0, "Request failed");
        }

        (
            status,
            Json(json!({
                "error": self.0.error_code(),
                "message": self.client_message(),
                "status": "error",
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use rstest::rstest;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_shows_message() {
        let err = ApiError::from(ContentError::validation("content and author are required"));
        let (status, body) = body_json(err).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");
        assert_eq!(body["message"], "content and author are required");
        assert_eq!(body["status"], "error");
    }

    #[rstest]
    #[case(AppError::Database("connection refused at 10.0.0.3".into()))]
    #[case(AppError::Storage("bucket credentials rejected".into()))]
    #[case(AppError::Internal("poisoned".into()))]
    #[tokio::test]
    async fn test_server_errors_hide_details(#[case] err: AppError) {
        let (status, body) = body_json(ApiError(err)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], INTERNAL_MESSAGE);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_generic_busy() {
        let err = ApiError::from(AskError::Status {
            status: 401,
            body: "invalid api key".into(),
        });
        let (status, body) = body_json(err).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "SERVICE_BUSY");
        assert_eq!(body["message"], BUSY_MESSAGE);
    }
}
