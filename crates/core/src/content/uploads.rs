//! Blob handling shared by the mutation services.

use tracing::warn;

use super::error::ContentError;
use crate::storage::{BlobLocation, StorageService, StoredBlob, UploadedFile};

/// Folder for post and comment attachments.
pub const BOARD_FOLDER: &str = "board";

/// Folder for direct message attachments.
pub const MESSAGES_FOLDER: &str = "messages";

/// Store every upload with a filename.
///
/// Parts without a filename are skipped. If any file cannot be stored, the
/// blobs already stored for this request are removed before returning.
pub(crate) async fn store_uploads(
    storage: &StorageService,
    folder: &str,
    files: Vec<UploadedFile>,
) -> Result<Vec<StoredBlob>, ContentError> {
    let mut stored = Vec::with_capacity(files.len());

    for file in files {
        if file.filename.trim().is_empty() {
            continue;
        }
        match storage.store(folder, file).await {
            Ok(blob) => stored.push(blob),
            Err(e) => {
                let locations: Vec<BlobLocation> =
                    stored.into_iter().map(|b| b.location).collect();
                discard_blobs(storage, &locations).await;
                return Err(e.into());
            }
        }
    }

    Ok(stored)
}

/// Best-effort removal of blobs whose rows were never written.
pub(crate) async fn discard_blobs(storage: &StorageService, locations: &[BlobLocation]) {
    for location in locations {
        if !storage.delete(location).await {
            warn!(
                backend = location.backend().as_str(),
                "Orphaned blob left behind after failed write"
            );
        }
    }
}
