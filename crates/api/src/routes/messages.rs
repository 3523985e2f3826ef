//! Direct messaging routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};

use clubhouse_core::content::{MessageService, NewMessage};
use clubhouse_db::MessageRepository;

use crate::{AppState, error::ApiError, extractors::ContentForm};

/// Creates the messaging routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/messages/api/messages", post(send_message))
        .route("/messages/api/conversations/{user}", get(conversation))
        .route("/messages/api/contacts", get(contacts))
        .route("/messages/api/messages/read/{user}", post(mark_read))
}

/// Query naming the current user as sender.
#[derive(Debug, Default, Deserialize)]
pub struct SenderQuery {
    /// Current user.
    #[serde(default)]
    pub sender: String,
}

/// Query naming the current user as receiver.
#[derive(Debug, Default, Deserialize)]
pub struct ReceiverQuery {
    /// Current user.
    #[serde(default)]
    pub receiver: String,
}

fn message_service(state: &AppState) -> MessageService<MessageRepository> {
    let repo = MessageRepository::new((*state.db).clone());
    MessageService::new(Arc::new(repo), state.storage.clone(), state.hub.clone())
}

/// POST `/messages/api/messages`
async fn send_message(
    State(state): State<AppState>,
    mut form: ContentForm,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let files = form.take_files();
    let input = NewMessage {
        content: form.text("content").to_owned(),
        sender: form.text("sender").to_owned(),
        receiver: form.text("receiver").to_owned(),
    };

    let message = message_service(&state).send_message(input, files).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": message, "status": "success" })),
    ))
}

/// GET `/messages/api/conversations/{user}?sender=<me>`
///
/// Marks `user`'s unread messages to the caller as read.
async fn conversation(
    State(state): State<AppState>,
    Path(user): Path<String>,
    Query(query): Query<SenderQuery>,
) -> Result<Json<Value>, ApiError> {
    let messages = message_service(&state)
        .open_conversation(&query.sender, &user)
        .await?;
    Ok(Json(json!({ "messages": messages, "status": "success" })))
}

/// GET `/messages/api/contacts?sender=<me>`
async fn contacts(
    State(state): State<AppState>,
    Query(query): Query<SenderQuery>,
) -> Result<Json<Value>, ApiError> {
    let contacts = message_service(&state).contacts(&query.sender).await?;
    Ok(Json(json!({ "contacts": contacts, "status": "success" })))
}

/// POST `/messages/api/messages/read/{user}`
///
/// The receiver comes from the form body, falling back to the query string.
async fn mark_read(
    State(state): State<AppState>,
    Path(user): Path<String>,
    Query(query): Query<ReceiverQuery>,
    form: ContentForm,
) -> Result<Json<Value>, ApiError> {
    let receiver = match form.text("receiver") {
        "" => query.receiver.as_str(),
        from_form => from_form,
    };

    let updated = message_service(&state).mark_read(&user, receiver).await?;
    Ok(Json(json!({
        "updated": updated,
        "message": format!("{updated} messages marked as read"),
        "status": "success",
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Part, multipart_request, offline_state};
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use rstest::rstest;
    use tower::ServiceExt;

    async fn json_body(response: axum::response::Response) -> Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[rstest]
    #[case("/messages/api/conversations/aoki", "sender is required")]
    #[case("/messages/api/conversations/aoki?sender=%20", "sender is required")]
    #[case("/messages/api/contacts", "sender is required")]
    #[tokio::test]
    async fn test_missing_sender_rejected(#[case] uri: &str, #[case] message: &str) {
        let uploads = tempfile::tempdir().unwrap();
        let app = routes().with_state(offline_state(&uploads));

        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["message"], message);
    }

    #[tokio::test]
    async fn test_send_message_requires_receiver() {
        let uploads = tempfile::tempdir().unwrap();
        let app = routes().with_state(offline_state(&uploads));

        let response = app
            .oneshot(multipart_request(
                "POST",
                "/messages/api/messages",
                &[
                    Part::text("content", "Tee time moved to 8:10"),
                    Part::text("sender", "aoki"),
                ],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"], "VALIDATION_ERROR");
        assert_eq!(json["message"], "receiver is required");
    }

    #[tokio::test]
    async fn test_mark_read_requires_receiver() {
        let uploads = tempfile::tempdir().unwrap();
        let app = routes().with_state(offline_state(&uploads));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/messages/api/messages/read/aoki")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["message"], "receiver is required");
    }
}
