//! Request extractors.

use std::collections::HashMap;

use axum::{
    Form,
    extract::{FromRequest, Multipart, Request, multipart::MultipartError},
    http::{StatusCode, header::CONTENT_TYPE},
};

use clubhouse_core::storage::UploadedFile;
use clubhouse_shared::AppError;

use crate::error::ApiError;

/// Multipart field names that carry uploads.
const FILE_FIELDS: [&str; 2] = ["files", "files[]"];

/// Text fields and uploaded files of a board or message form.
///
/// Accepts `multipart/form-data` and `application/x-www-form-urlencoded`.
/// A request without a body yields an empty form so handlers can report
/// the missing fields themselves.
#[derive(Debug, Default)]
pub struct ContentForm {
    fields: HashMap<String, String>,
    files: Vec<UploadedFile>,
}

impl ContentForm {
    /// Value of a text field, empty when absent.
    #[must_use]
    pub fn text(&self, name: &str) -> &str {
        self.fields.get(name).map_or("", String::as_str)
    }

    /// Number of uploaded file parts.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Take the uploaded files, leaving the text fields in place.
    pub fn take_files(&mut self) -> Vec<UploadedFile> {
        std::mem::take(&mut self.files)
    }

    async fn read_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            if FILE_FIELDS.contains(&name.as_str()) {
                let filename = field.file_name().unwrap_or_default().to_owned();
                let content_type = field.content_type().map(str::to_owned);
                let data = field.bytes().await.map_err(multipart_error)?;
                form.files.push(UploadedFile::new(filename, content_type, data));
            } else {
                let value = field.text().await.map_err(multipart_error)?;
                form.fields.entry(name).or_insert(value);
            }
        }

        Ok(form)
    }
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError(AppError::PayloadTooLarge(err.body_text()))
    } else {
        ApiError(AppError::Validation(err.body_text()))
    }
}

impl<S> FromRequest<S> for ContentForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|rejection| ApiError(AppError::Validation(rejection.body_text())))?;
            Self::read_multipart(multipart).await
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|rejection| {
                    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                        ApiError(AppError::PayloadTooLarge(rejection.body_text()))
                    } else {
                        ApiError(AppError::Validation(rejection.body_text()))
                    }
                })?;
            Ok(Self {
                fields,
                files: Vec::new(),
            })
        } else if content_type.is_empty() {
            Ok(Self::default())
        } else {
            Err(ApiError(AppError::Validation(format!(
                "unsupported content type: {content_type}"
            ))))
        }
    }
}
