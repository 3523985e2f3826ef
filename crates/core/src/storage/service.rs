//! Storage service selecting between local and remote backends.

use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use tracing::{debug, warn};

use clubhouse_shared::{StorageBackendKind, StorageSettings};

use super::error::StorageError;
use super::filename::{sanitize_filename, storage_key};
use super::local::LocalStorage;
use super::remote::RemoteStorage;
use super::types::{BlobLocation, StoredBlob, UploadedFile, declared_content_type};

/// Storage service for attachment blobs.
///
/// The backend for new uploads is fixed at construction. The local backend
/// always exists: when `remote` is preferred, every remote failure falls back
/// to it so an upload is never lost.
#[derive(Debug)]
pub struct StorageService {
    local: LocalStorage,
    remote: Option<RemoteStorage>,
    preferred: StorageBackendKind,
    max_file_size: u64,
    fallbacks: AtomicU64,
}

impl StorageService {
    /// Create a storage service from configuration.
    ///
    /// A remote backend is built whenever its credentials are present, so
    /// blobs stored remotely earlier stay readable after switching to `local`.
    ///
    /// # Errors
    ///
    /// Returns an error if the local backend cannot be initialized.
    pub fn from_settings(settings: &StorageSettings) -> Result<Self, StorageError> {
        let local = LocalStorage::new(&settings.upload_root)?;

        let remote = match RemoteStorage::from_config(&settings.remote) {
            Ok(remote) => Some(remote),
            Err(e) => {
                if settings.backend == StorageBackendKind::Remote {
                    warn!(
                        error = %e,
                        "Remote storage selected but unavailable, uploads will be stored locally"
                    );
                }
                None
            }
        };

        Ok(Self {
            local,
            remote,
            preferred: settings.backend,
            max_file_size: settings.max_file_size,
            fallbacks: AtomicU64::new(0),
        })
    }

    /// Create a service that only stores locally.
    #[must_use]
    pub fn local_only(local: LocalStorage, max_file_size: u64) -> Self {
        Self {
            local,
            remote: None,
            preferred: StorageBackendKind::Local,
            max_file_size,
            fallbacks: AtomicU64::new(0),
        }
    }

    /// Store an uploaded file under `folder`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is too large or the local write fails.
    /// Remote failures never surface here.
    pub async fn store(&self, folder: &str, file: UploadedFile) -> Result<StoredBlob, StorageError> {
        let size = file.data.len() as u64;
        if size > self.max_file_size {
            return Err(StorageError::file_too_large(size, self.max_file_size));
        }

        let filename = sanitize_filename(&file.filename);
        let key = storage_key(folder, &filename);
        let content_type = declared_content_type(file.content_type);

        if self.preferred == StorageBackendKind::Remote {
            match self.store_remote(&key, file.data.clone()).await {
                Ok(view_url) => {
                    debug!(key = %key, size, "Stored blob remotely");
                    return Ok(StoredBlob {
                        location: BlobLocation::Remote {
                            object_id: key,
                            view_url,
                        },
                        filename,
                        content_type,
                        size,
                    });
                }
                Err(e) => {
                    self.fallbacks.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        error = %e,
                        kind = e.kind(),
                        key = %key,
                        "Remote upload failed, falling back to local storage"
                    );
                }
            }
        }

        self.local.write(&key, file.data).await?;
        debug!(key = %key, size, "Stored blob locally");

        Ok(StoredBlob {
            location: BlobLocation::Local { path: key },
            filename,
            content_type,
            size,
        })
    }

    async fn store_remote(&self, key: &str, data: Bytes) -> Result<String, StorageError> {
        let Some(remote) = &self.remote else {
            return Err(StorageError::BackendUnavailable(
                "remote storage is not configured".to_string(),
            ));
        };
        remote.write(key, data).await
    }

    /// Delete a blob.
    ///
    /// Failures are logged and reported as `false`; they never propagate.
    pub async fn delete(&self, location: &BlobLocation) -> bool {
        let result = match location {
            BlobLocation::Local { path } => self.local.delete(path).await,
            BlobLocation::Remote { object_id, .. } => match &self.remote {
                Some(remote) => remote.delete(object_id).await,
                None => Err(StorageError::BackendUnavailable(
                    "remote storage is not configured".to_string(),
                )),
            },
        };

        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    error = %e,
                    backend = location.backend().as_str(),
                    "Failed to delete blob"
                );
                false
            }
        }
    }

    /// Read a blob's contents.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if the blob is missing and
    /// [`StorageError::BackendUnavailable`] for remote blobs when no remote
    /// backend is configured.
    pub async fn read(&self, location: &BlobLocation) -> Result<Bytes, StorageError> {
        match location {
            BlobLocation::Local { path } => self.local.read(path).await,
            BlobLocation::Remote { object_id, .. } => match &self.remote {
                Some(remote) => remote.read(object_id).await,
                None => Err(StorageError::BackendUnavailable(
                    "remote storage is not configured".to_string(),
                )),
            },
        }
    }

    /// Check whether a locally stored blob still exists.
    ///
    /// Remote blobs are reported as present.
    pub async fn exists(&self, location: &BlobLocation) -> bool {
        match location {
            BlobLocation::Local { path } => self.local.exists(path).await,
            BlobLocation::Remote { .. } => true,
        }
    }

    /// Backend used for new uploads.
    #[must_use]
    pub fn preferred_backend(&self) -> StorageBackendKind {
        self.preferred
    }

    /// Number of uploads that fell back from remote to local storage.
    #[must_use]
    pub fn fallback_count(&self) -> u64 {
        self.fallbacks.load(Ordering::Relaxed)
    }

    /// The local backend.
    #[must_use]
    pub fn local(&self) -> &LocalStorage {
        &self.local
    }
}

/// URL a client uses to fetch an attachment.
///
/// Local blobs go through the download route; remote blobs use the
/// provider-issued view URL.
#[must_use]
pub fn access_url(location: &BlobLocation, attachment_id: i32) -> String {
    match location {
        BlobLocation::Local { .. } => format!("/board/api/attachments/{attachment_id}"),
        BlobLocation::Remote { view_url, .. } => view_url.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::types::MAX_CONTENT_TYPE_LEN;
    use clubhouse_shared::RemoteStorageConfig;

    fn settings(root: &std::path::Path, backend: StorageBackendKind) -> StorageSettings {
        StorageSettings {
            backend,
            upload_root: root.to_string_lossy().into_owned(),
            max_file_size: 1024,
            remote: RemoteStorageConfig::default(),
        }
    }

    #[tokio::test]
    async fn test_store_local_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = StorageService::from_settings(&settings(dir.path(), StorageBackendKind::Local))
            .expect("service");

        let stored = service
            .store(
                "board",
                UploadedFile::new("hole 7.txt", Some("text/plain".into()), "dogleg left"),
            )
            .await
            .expect("store");

        assert_eq!(stored.filename, "hole_7.txt");
        assert_eq!(stored.size, 11);
        assert_eq!(stored.location.backend(), StorageBackendKind::Local);
        assert_eq!(
            service.read(&stored.location).await.expect("read"),
            Bytes::from_static(b"dogleg left")
        );
    }

    #[tokio::test]
    async fn test_remote_without_credentials_falls_back_to_local() {
        let dir = tempfile::tempdir().expect("tempdir");
        let service =
            StorageService::from_settings(&settings(dir.path(), StorageBackendKind::Remote))
                .expect("service");

        let stored = service
            .store(
                "messages",
                UploadedFile::new("card.pdf", Some("application/pdf".into()), "%PDF"),
            )
            .await
            .expect("upload must not be lost");

        let path = stored.location.local_path().expect("stored locally");
        assert!(service.local().path_of(path).exists());
        assert_eq!(service.fallback_count(), 1);
        assert_eq!(service.preferred_backend(), StorageBackendKind::Remote);
    }

    #[tokio::test]
    async fn test_store_rejects_oversized_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = StorageService::from_settings(&settings(dir.path(), StorageBackendKind::Local))
            .expect("service");

        let err = service
            .store("board", UploadedFile::new("big.bin", None, vec![0u8; 2048]))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::FileTooLarge { .. }));
    }

    #[tokio::test]
    async fn test_delete_removes_local_blob() {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = StorageService::from_settings(&settings(dir.path(), StorageBackendKind::Local))
            .expect("service");

        let stored = service
            .store("board", UploadedFile::new("a.txt", None, "a"))
            .await
            .expect("store");
        assert!(service.exists(&stored.location).await);

        assert!(service.delete(&stored.location).await);
        assert!(!service.exists(&stored.location).await);
    }

    #[tokio::test]
    async fn test_delete_remote_without_backend_reports_false() {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = StorageService::from_settings(&settings(dir.path(), StorageBackendKind::Local))
            .expect("service");

        let location = BlobLocation::Remote {
            object_id: "board/x.pdf".into(),
            view_url: "https://files.example.com/board/x.pdf".into(),
        };
        assert!(!service.delete(&location).await);
    }

    #[tokio::test]
    async fn test_store_drops_unusable_content_type() {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = StorageService::from_settings(&settings(dir.path(), StorageBackendKind::Local))
            .expect("service");

        let long_type = format!("application/{}", "x".repeat(MAX_CONTENT_TYPE_LEN));
        let stored = service
            .store("board", UploadedFile::new("a.bin", Some(long_type), "a"))
            .await
            .expect("store");
        assert_eq!(stored.content_type, None);

        let stored = service
            .store("board", UploadedFile::new("b.txt", Some(" text/plain ".into()), "b"))
            .await
            .expect("store");
        assert_eq!(stored.content_type.as_deref(), Some("text/plain"));

        let stored = service
            .store("board", UploadedFile::new("c.txt", Some("   ".into()), "c"))
            .await
            .expect("store");
        assert_eq!(stored.content_type, None);
    }

    #[test]
    fn test_access_url() {
        let local = BlobLocation::Local {
            path: "board/abc_a.pdf".into(),
        };
        assert_eq!(access_url(&local, 42), "/board/api/attachments/42");

        let remote = BlobLocation::Remote {
            object_id: "board/abc_a.pdf".into(),
            view_url: "https://files.example.com/board/abc_a.pdf".into(),
        };
        assert_eq!(
            access_url(&remote, 42),
            "https://files.example.com/board/abc_a.pdf"
        );
    }
}
