//! Storage value types.

use bytes::Bytes;
use clubhouse_shared::StorageBackendKind;

/// Where a stored blob lives.
///
/// Each variant carries exactly the locator fields its backend needs, so a
/// remote blob without an object id or view URL cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobLocation {
    /// Local filesystem, path relative to the upload root.
    Local {
        /// Relative path under the upload root.
        path: String,
    },
    /// Remote object store.
    Remote {
        /// Provider-assigned object identifier.
        object_id: String,
        /// Provider-issued view URL.
        view_url: String,
    },
}

impl BlobLocation {
    /// The backend tag for this location.
    #[must_use]
    pub const fn backend(&self) -> StorageBackendKind {
        match self {
            Self::Local { .. } => StorageBackendKind::Local,
            Self::Remote { .. } => StorageBackendKind::Remote,
        }
    }

    /// Rebuild a location from its persisted columns.
    ///
    /// Returns `None` when the columns required by the tag are missing.
    #[must_use]
    pub fn from_parts(
        backend: StorageBackendKind,
        path: Option<String>,
        object_id: Option<String>,
        view_url: Option<String>,
    ) -> Option<Self> {
        match backend {
            StorageBackendKind::Local => path.map(|path| Self::Local { path }),
            StorageBackendKind::Remote => match (object_id, view_url) {
                (Some(object_id), Some(view_url)) => Some(Self::Remote {
                    object_id,
                    view_url,
                }),
                _ => None,
            },
        }
    }

    /// Local path, if stored locally.
    #[must_use]
    pub fn local_path(&self) -> Option<&str> {
        match self {
            Self::Local { path } => Some(path),
            Self::Remote { .. } => None,
        }
    }

    /// Remote object id, if stored remotely.
    #[must_use]
    pub fn remote_object_id(&self) -> Option<&str> {
        match self {
            Self::Remote { object_id, .. } => Some(object_id),
            Self::Local { .. } => None,
        }
    }

    /// Remote view URL, if stored remotely.
    #[must_use]
    pub fn remote_view_url(&self) -> Option<&str> {
        match self {
            Self::Remote { view_url, .. } => Some(view_url),
            Self::Local { .. } => None,
        }
    }
}

/// Longest declared media type kept with an attachment.
pub const MAX_CONTENT_TYPE_LEN: usize = 255;

/// Trimmed declared media type, or `None` when blank or too long to persist.
#[must_use]
pub fn declared_content_type(content_type: Option<String>) -> Option<String> {
    let trimmed = content_type?.trim().to_string();
    (!trimmed.is_empty() && trimmed.len() <= MAX_CONTENT_TYPE_LEN).then_some(trimmed)
}

/// A file received from a client, not yet stored.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied filename (untrusted).
    pub filename: String,
    /// Client-declared media type (untrusted).
    pub content_type: Option<String>,
    /// File contents.
    pub data: Bytes,
}

impl UploadedFile {
    /// Create an uploaded file.
    #[must_use]
    pub fn new(
        filename: impl Into<String>,
        content_type: Option<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type,
            data: data.into(),
        }
    }
}

/// Result of a successful store.
#[derive(Debug, Clone)]
pub struct StoredBlob {
    /// Where the blob ended up.
    pub location: BlobLocation,
    /// Sanitized original filename.
    pub filename: String,
    /// Declared media type.
    pub content_type: Option<String>,
    /// Size in bytes.
    pub size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_local_requires_path() {
        assert_eq!(
            BlobLocation::from_parts(
                StorageBackendKind::Local,
                Some("board/a.pdf".into()),
                None,
                None
            ),
            Some(BlobLocation::Local {
                path: "board/a.pdf".into()
            })
        );
        assert_eq!(
            BlobLocation::from_parts(StorageBackendKind::Local, None, Some("x".into()), None),
            None
        );
    }

    #[test]
    fn test_from_parts_remote_requires_both_fields() {
        assert!(
            BlobLocation::from_parts(
                StorageBackendKind::Remote,
                None,
                Some("board/a.pdf".into()),
                None
            )
            .is_none()
        );

        let location = BlobLocation::from_parts(
            StorageBackendKind::Remote,
            None,
            Some("board/a.pdf".into()),
            Some("https://cdn.example.com/board/a.pdf".into()),
        )
        .expect("remote location");
        assert_eq!(location.backend(), StorageBackendKind::Remote);
        assert_eq!(location.remote_object_id(), Some("board/a.pdf"));
        assert_eq!(location.local_path(), None);
    }
}
