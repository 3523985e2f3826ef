//! Attachment lookup and download.

use std::sync::Arc;

use bytes::Bytes;
use tracing::warn;

use super::error::ContentError;
use super::repository::AttachmentRepository;
use super::types::Attachment;
use crate::storage::{BlobLocation, StorageError, StorageService};

/// Result of resolving an attachment download.
#[derive(Debug, Clone)]
pub enum Download {
    /// Blob contents served directly.
    Content {
        /// Attachment metadata.
        attachment: Attachment,
        /// Blob bytes.
        data: Bytes,
    },
    /// Blob is only reachable through its remote view URL.
    Redirect {
        /// Attachment metadata.
        attachment: Attachment,
        /// Provider view URL.
        url: String,
    },
}

/// Attachment lookups for the download routes.
pub struct AttachmentService<R: AttachmentRepository> {
    repo: Arc<R>,
    storage: Arc<StorageService>,
}

impl<R: AttachmentRepository> AttachmentService<R> {
    /// Create a new attachment service.
    #[must_use]
    pub fn new(repo: Arc<R>, storage: Arc<StorageService>) -> Self {
        Self { repo, storage }
    }

    /// Get attachment by ID.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::NotFound`] if no such attachment exists.
    pub async fn get(&self, id: i32) -> Result<Attachment, ContentError> {
        self.repo
            .find_attachment(id)
            .await?
            .ok_or_else(|| ContentError::not_found("attachment", id))
    }

    /// Resolve an attachment to its bytes or a redirect.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::NotFound`] if the row or the blob is missing.
    pub async fn download(&self, id: i32) -> Result<Download, ContentError> {
        let attachment = self.get(id).await?;

        match self.storage.read(&attachment.location).await {
            Ok(data) => Ok(Download::Content { attachment, data }),
            Err(StorageError::NotFound { .. }) => {
                Err(ContentError::not_found("attachment file", id))
            }
            Err(e) => match &attachment.location {
                BlobLocation::Remote { view_url, .. } => {
                    warn!(attachment_id = id, error = %e, "Remote read failed, redirecting");
                    let url = view_url.clone();
                    Ok(Download::Redirect { attachment, url })
                }
                BlobLocation::Local { .. } => Err(e.into()),
            },
        }
    }
}
