//! Attachment download routes.

use std::fmt::Write as _;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{Path, State},
    http::{
        HeaderValue, StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE},
    },
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use tracing::debug;

use clubhouse_core::content::{AttachmentService, Download};
use clubhouse_db::AttachmentRepository;

use crate::{AppState, error::ApiError};

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Creates the attachment routes.
///
/// Board and messaging pages each link to their own prefix; both resolve
/// the same attachment table.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/board/api/attachments/{attachment_id}", get(download))
        .route("/messages/api/attachments/{attachment_id}", get(download))
}

/// GET `/board/api/attachments/{id}` and `/messages/api/attachments/{id}`
async fn download(
    State(state): State<AppState>,
    Path(attachment_id): Path<i32>,
) -> Result<Response, ApiError> {
    let repo = AttachmentRepository::new((*state.db).clone());
    let service = AttachmentService::new(Arc::new(repo), state.storage.clone());

    match service.download(attachment_id).await? {
        Download::Content { attachment, data } => {
            debug!(attachment_id, size = data.len(), "Serving attachment");
            let content_type = attachment
                .content_type
                .as_deref()
                .and_then(|value| HeaderValue::from_str(value).ok())
                .unwrap_or_else(|| HeaderValue::from_static(FALLBACK_CONTENT_TYPE));

            Ok((
                StatusCode::OK,
                [
                    (CONTENT_TYPE, content_type),
                    (CONTENT_DISPOSITION, content_disposition(&attachment.filename)),
                    (CONTENT_LENGTH, HeaderValue::from(data.len())),
                ],
                Body::from(data),
            )
                .into_response())
        }
        Download::Redirect { url, .. } => Ok(Redirect::temporary(&url).into_response()),
    }
}

/// `attachment` disposition with an ASCII `filename` and an RFC 5987
/// `filename*` carrying the original UTF-8 name.
fn content_disposition(filename: &str) -> HeaderValue {
    let ascii: String = filename
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let mut value = format!("attachment; filename=\"{ascii}\"");
    if !filename.is_ascii() {
        value.push_str("; filename*=UTF-8''");
        for byte in filename.bytes() {
            if byte.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&byte) {
                value.push(char::from(byte));
            } else {
                let _ = write!(value, "%{byte:02X}");
            }
        }
    }

    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("scorecard.pdf", "attachment; filename=\"scorecard.pdf\"")]
    #[case("round 1.png", "attachment; filename=\"round 1.png\"")]
    #[case(
        "スコア.pdf",
        "attachment; filename=\"___.pdf\"; filename*=UTF-8''%E3%82%B9%E3%82%B3%E3%82%A2.pdf"
    )]
    fn test_content_disposition(#[case] filename: &str, #[case] expected: &str) {
        assert_eq!(content_disposition(filename), expected);
    }
}
