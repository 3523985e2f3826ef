//! Local filesystem backend.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use opendal::{ErrorKind, Operator, services};

use super::error::StorageError;

/// Blob storage under a local upload root.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    operator: Operator,
    root: PathBuf,
}

impl LocalStorage {
    /// Create a local backend rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is not valid UTF-8 or the operator cannot
    /// be built.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        let builder = services::Fs::default().root(
            root.to_str()
                .ok_or_else(|| StorageError::configuration("invalid upload root path"))?,
        );

        let operator = Operator::new(builder)
            .map_err(|e| StorageError::configuration(e.to_string()))?
            .finish();

        Ok(Self { operator, root })
    }

    /// Write a blob under `key`, creating parent folders.
    pub async fn write(&self, key: &str, data: Bytes) -> Result<(), StorageError> {
        self.operator.write(key, data).await?;
        Ok(())
    }

    /// Read a blob.
    pub async fn read(&self, key: &str) -> Result<Bytes, StorageError> {
        let buffer = self.operator.read(key).await?;
        Ok(buffer.to_bytes())
    }

    /// Delete a blob.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.operator.delete(key).await?;
        Ok(())
    }

    /// Check if a blob exists.
    pub async fn exists(&self, key: &str) -> bool {
        match self.operator.stat(key).await {
            Ok(_) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(_) => false,
        }
    }

    /// Absolute filesystem path of a key.
    #[must_use]
    pub fn path_of(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    /// The upload root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_read_delete() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = LocalStorage::new(dir.path()).expect("local storage");

        storage
            .write("board/abc_card.png", Bytes::from_static(b"\x89PNG"))
            .await
            .expect("write");
        assert!(storage.path_of("board/abc_card.png").exists());
        assert_eq!(
            storage.read("board/abc_card.png").await.expect("read"),
            Bytes::from_static(b"\x89PNG")
        );

        storage.delete("board/abc_card.png").await.expect("delete");
        assert!(!storage.exists("board/abc_card.png").await);
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = LocalStorage::new(dir.path()).expect("local storage");

        let err = storage.read("board/missing.pdf").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }
}
