//! Bulletin board routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde_json::{Value, json};
use tracing::info;

use clubhouse_core::content::{BoardService, NewComment, NewPost};
use clubhouse_db::BoardRepository;

use crate::{AppState, error::ApiError, extractors::ContentForm};

/// Creates the board routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/board/api/posts", get(list_posts).post(create_post))
        .route("/board/api/posts/{post_id}", get(get_post).delete(delete_post))
        .route("/board/api/posts/{post_id}/comments", post(add_comment))
        // Alias for clients that cannot send DELETE
        .route("/board/api/posts/{post_id}/delete", post(delete_post))
}

fn board_service(state: &AppState) -> BoardService<BoardRepository> {
    let repo = BoardRepository::new((*state.db).clone());
    BoardService::new(Arc::new(repo), state.storage.clone(), state.hub.clone())
}

/// GET `/board/api/posts`
async fn list_posts(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let posts = board_service(&state).list_posts().await?;
    Ok(Json(json!({ "posts": posts, "status": "success" })))
}

/// GET `/board/api/posts/{post_id}`
async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    let post = board_service(&state).get_post(post_id).await?;
    Ok(Json(json!({ "post": post, "status": "success" })))
}

/// POST `/board/api/posts`
async fn create_post(
    State(state): State<AppState>,
    mut form: ContentForm,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let files = form.take_files();
    let input = NewPost {
        content: form.text("content").to_owned(),
        author: form.text("author").to_owned(),
    };

    let post = board_service(&state).create_post(input, files).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "post": post, "status": "success" })),
    ))
}

/// POST `/board/api/posts/{post_id}/comments`
async fn add_comment(
    State(state): State<AppState>,
    Path(post_id): Path<i32>,
    mut form: ContentForm,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let files = form.take_files();
    let input = NewComment {
        content: form.text("content").to_owned(),
        author: form.text("author").to_owned(),
    };

    let comment = board_service(&state)
        .add_comment(post_id, input, files)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "comment": comment, "status": "success" })),
    ))
}

/// DELETE `/board/api/posts/{post_id}` and POST `/board/api/posts/{post_id}/delete`
async fn delete_post(
    State(state): State<AppState>,
    Path(post_id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    info!(post_id, "Delete post requested");
    board_service(&state).delete_post(post_id).await?;
    Ok(Json(json!({ "message": "Post deleted", "status": "success" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Part, multipart_request, offline_state};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn json_body(response: axum::response::Response) -> Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_create_post_requires_content_and_author() {
        let uploads = tempfile::tempdir().unwrap();
        let state = offline_state(&uploads);
        let hub = state.hub.clone();
        let (_id, mut events) = hub.connect();
        let app = routes().with_state(state);

        let response = app
            .oneshot(multipart_request(
                "POST",
                "/board/api/posts",
                &[
                    Part::text("content", "  "),
                    Part::file("files", "scorecard.pdf", b"%PDF"),
                ],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"], "VALIDATION_ERROR");
        assert_eq!(json["message"], "content and author are required");
        assert_eq!(json["status"], "error");

        // Nothing stored, nothing announced
        assert_eq!(std::fs::read_dir(uploads.path()).unwrap().count(), 0);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_non_numeric_post_id_rejected() {
        let uploads = tempfile::tempdir().unwrap();
        let app = routes().with_state(offline_state(&uploads));

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/board/api/posts/latest")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
