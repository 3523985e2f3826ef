//! Golf Q&A proxy.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use clubhouse_core::ask::{AskError, validate_question};
use clubhouse_shared::AppError;

use crate::{AppState, error::ApiError};

/// Request body for `/api/ask`.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    /// The user's question.
    #[serde(default)]
    pub question: String,
}

/// Successful answer.
#[derive(Debug, Serialize)]
pub struct AskResponse {
    /// Answer text.
    pub answer: String,
    /// Always `"success"`.
    pub status: &'static str,
    /// Seconds spent, formatted with two decimals.
    pub response_time: String,
}

/// Creates the Q&A routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/ask", post(ask))
}

/// POST `/api/ask`
async fn ask(
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, ApiError> {
    let started = Instant::now();
    let request_id = Uuid::new_v4();

    let Json(payload) = payload.map_err(|rejection| {
        ApiError(AppError::Validation(format!(
            "a JSON body with a question is required: {}",
            rejection.body_text()
        )))
    })?;

    let question = validate_question(&payload.question)?;

    match state.answers.ask(question).await {
        Ok(answer) => {
            let elapsed = started.elapsed().as_secs_f64();
            info!(
                request_id = %request_id,
                latency_secs = elapsed,
                model = state.answers.model(),
                total_tokens = answer.usage.total_tokens,
                prompt_tokens = answer.usage.prompt_tokens,
                completion_tokens = answer.usage.completion_tokens,
                "Question answered"
            );
            Ok(Json(AskResponse {
                answer: answer.text,
                status: "success",
                response_time: format!("{elapsed:.2}"),
            }))
        }
        Err(e) => {
            let elapsed = started.elapsed().as_secs_f64();
            match &e {
                AskError::NotConfigured => {
                    warn!(request_id = %request_id, "LLM API key is not configured");
                }
                other => error!(
                    request_id = %request_id,
                    latency_secs = elapsed,
                    kind = other.kind(),
                    error = %other,
                    "LLM request failed"
                ),
            }
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::BUSY_MESSAGE, test_support::offline_state};
    use axum::{
        body::Body,
        http::{Request, StatusCode, header::CONTENT_TYPE},
    };
    use http_body_util::BodyExt;
    use rstest::rstest;
    use tower::ServiceExt;

    async fn post_json(body: &str) -> (StatusCode, serde_json::Value) {
        let uploads = tempfile::tempdir().unwrap();
        let app = routes().with_state(offline_state(&uploads));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/ask")
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_owned()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[rstest]
    #[case(r#"{"question": "   "}"#)]
    #[case(r"{}")]
    #[tokio::test]
    async fn test_blank_question_rejected(#[case] body: &str) {
        let (status, json) = post_json(body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "question is required");
    }

    #[rstest]
    #[case(Some("text/plain"), "question=hi")]
    #[case(Some("application/json"), "{not json")]
    #[case(None, "")]
    #[tokio::test]
    async fn test_non_json_body_uses_error_envelope(
        #[case] content_type: Option<&str>,
        #[case] body: &str,
    ) {
        let uploads = tempfile::tempdir().unwrap();
        let app = routes().with_state(offline_state(&uploads));

        let mut request = Request::builder().method("POST").uri("/api/ask");
        if let Some(content_type) = content_type {
            request = request.header(CONTENT_TYPE, content_type);
        }
        let response = app
            .oneshot(request.body(Body::from(body.to_owned())).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], "VALIDATION_ERROR");
        assert_eq!(json["status"], "error");
    }

    #[tokio::test]
    async fn test_overlong_question_rejected() {
        let body = serde_json::json!({ "question": "a".repeat(1001) }).to_string();
        let (status, json) = post_json(&body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_missing_api_key_is_busy() {
        let (status, json) = post_json(r#"{"question": "Driver or 3-wood on a tight par 4?"}"#).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["error"], "SERVICE_BUSY");
        assert_eq!(json["message"], BUSY_MESSAGE);
    }
}
