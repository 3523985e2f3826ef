//! Storage error types.

use thiserror::Error;

/// Storage operation errors.
///
/// The first three variants describe remote-side failures; the storage
/// service recovers from all of them by writing to local storage instead.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Remote backend has no usable credentials or configuration.
    #[error("storage backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Network error or timeout talking to the remote backend.
    #[error("transient upload failure: {0}")]
    TransientUploadFailure(String),

    /// Remote backend refused the write for quota or rate reasons.
    #[error("storage quota exceeded: {0}")]
    QuotaExceeded(String),

    /// File size exceeds maximum allowed.
    #[error("file size {size} bytes exceeds maximum allowed {max} bytes")]
    FileTooLarge {
        /// Actual file size.
        size: u64,
        /// Maximum allowed size.
        max: u64,
    },

    /// Blob not found in storage.
    #[error("file not found: {key}")]
    NotFound {
        /// Storage key that was not found.
        key: String,
    },

    /// Storage provider configuration error.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// OpenDAL operation error.
    #[error("storage operation failed: {0}")]
    Operation(String),
}

impl StorageError {
    /// Create a file too large error.
    #[must_use]
    pub fn file_too_large(size: u64, max: u64) -> Self {
        Self::FileTooLarge { size, max }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Short label used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::BackendUnavailable(_) => "backend_unavailable",
            Self::TransientUploadFailure(_) => "transient_upload_failure",
            Self::QuotaExceeded(_) => "quota_exceeded",
            Self::FileTooLarge { .. } => "file_too_large",
            Self::NotFound { .. } => "not_found",
            Self::Configuration(_) => "configuration",
            Self::Operation(_) => "operation",
        }
    }

    /// Classify an error returned by the remote operator.
    #[must_use]
    pub fn from_remote(err: &opendal::Error) -> Self {
        match err.kind() {
            opendal::ErrorKind::ConfigInvalid | opendal::ErrorKind::PermissionDenied => {
                Self::BackendUnavailable(err.to_string())
            }
            opendal::ErrorKind::RateLimited => Self::QuotaExceeded(err.to_string()),
            opendal::ErrorKind::NotFound => Self::not_found(err.to_string()),
            _ => Self::TransientUploadFailure(err.to_string()),
        }
    }
}

impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        match err.kind() {
            opendal::ErrorKind::NotFound => Self::NotFound {
                key: err.to_string(),
            },
            _ => Self::Operation(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_classification() {
        let denied = opendal::Error::new(opendal::ErrorKind::PermissionDenied, "no credentials");
        assert!(matches!(
            StorageError::from_remote(&denied),
            StorageError::BackendUnavailable(_)
        ));

        let limited = opendal::Error::new(opendal::ErrorKind::RateLimited, "slow down");
        assert!(matches!(
            StorageError::from_remote(&limited),
            StorageError::QuotaExceeded(_)
        ));

        let unexpected = opendal::Error::new(opendal::ErrorKind::Unexpected, "connection reset");
        assert!(matches!(
            StorageError::from_remote(&unexpected),
            StorageError::TransientUploadFailure(_)
        ));
    }

    #[test]
    fn test_local_not_found_conversion() {
        let err = opendal::Error::new(opendal::ErrorKind::NotFound, "board/x.pdf");
        assert!(matches!(
            StorageError::from(err),
            StorageError::NotFound { .. }
        ));
    }
}
