//! Content error types.

use thiserror::Error;

use clubhouse_shared::AppError;

use crate::storage::StorageError;

/// Content operation errors.
#[derive(Debug, Error)]
pub enum ContentError {
    /// Required input missing or invalid.
    #[error("{0}")]
    Validation(String),

    /// Entity not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind.
        entity: &'static str,
        /// Requested identifier.
        id: String,
    },

    /// Storage operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl ContentError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }
}

impl From<ContentError> for AppError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::Validation(msg) => Self::Validation(msg),
            ContentError::NotFound { .. } => Self::NotFound(err.to_string()),
            ContentError::Storage(StorageError::FileTooLarge { .. }) => {
                Self::PayloadTooLarge(err.to_string())
            }
            ContentError::Storage(StorageError::NotFound { .. }) => {
                Self::NotFound("attachment file not found".to_string())
            }
            ContentError::Storage(e) => Self::Storage(e.to_string()),
            ContentError::Repository(msg) => Self::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_mapping() {
        let validation: AppError = ContentError::validation("content and author are required").into();
        assert_eq!(validation.status_code(), 400);
        assert_eq!(
            validation.to_string(),
            "Validation error: content and author are required"
        );

        let not_found: AppError = ContentError::not_found("post", 7).into();
        assert_eq!(not_found.status_code(), 404);

        let too_large: AppError =
            ContentError::Storage(StorageError::file_too_large(20, 10)).into();
        assert_eq!(too_large.status_code(), 413);

        let missing_blob: AppError =
            ContentError::Storage(StorageError::not_found("board/x.pdf")).into();
        assert_eq!(missing_blob.status_code(), 404);

        let db: AppError = ContentError::repository("connection refused").into();
        assert_eq!(db.status_code(), 500);
    }
}
