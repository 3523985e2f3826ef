//! Remote S3-compatible backend.

use std::time::Duration;

use bytes::Bytes;
use opendal::{Operator, services};

use clubhouse_shared::RemoteStorageConfig;

use super::error::StorageError;

/// Blob storage in a remote S3-compatible bucket.
///
/// Every call is bounded by the configured timeout; expiry is reported as a
/// [`StorageError::TransientUploadFailure`].
#[derive(Debug, Clone)]
pub struct RemoteStorage {
    operator: Operator,
    public_base_url: String,
    timeout: Duration,
}

impl RemoteStorage {
    /// Create a remote backend from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::BackendUnavailable`] when any credential or
    /// location field is missing.
    pub fn from_config(config: &RemoteStorageConfig) -> Result<Self, StorageError> {
        let (
            Some(endpoint),
            Some(bucket),
            Some(access_key_id),
            Some(secret_access_key),
            Some(public_base_url),
        ) = (
            config.endpoint.as_deref(),
            config.bucket.as_deref(),
            config.access_key_id.as_deref(),
            config.secret_access_key.as_deref(),
            config.public_base_url.as_deref(),
        )
        else {
            return Err(StorageError::BackendUnavailable(
                "remote storage credentials are not configured".to_string(),
            ));
        };

        let builder = services::S3::default()
            .endpoint(endpoint)
            .bucket(bucket)
            .access_key_id(access_key_id)
            .secret_access_key(secret_access_key)
            .region(config.region.as_deref().unwrap_or("auto"));

        let operator = Operator::new(builder)
            .map_err(|e| StorageError::BackendUnavailable(e.to_string()))?
            .finish();

        Ok(Self {
            operator,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    /// Upload a blob and return its view URL.
    pub async fn write(&self, key: &str, data: Bytes) -> Result<String, StorageError> {
        match tokio::time::timeout(self.timeout, self.operator.write(key, data)).await {
            Ok(Ok(_)) => Ok(self.view_url(key)),
            Ok(Err(e)) => Err(StorageError::from_remote(&e)),
            Err(_) => Err(self.timed_out()),
        }
    }

    /// Download a blob.
    pub async fn read(&self, key: &str) -> Result<Bytes, StorageError> {
        match tokio::time::timeout(self.timeout, self.operator.read(key)).await {
            Ok(Ok(buffer)) => Ok(buffer.to_bytes()),
            Ok(Err(e)) => Err(StorageError::from_remote(&e)),
            Err(_) => Err(self.timed_out()),
        }
    }

    /// Delete a blob.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        match tokio::time::timeout(self.timeout, self.operator.delete(key)).await {
            Ok(result) => result.map_err(|e| StorageError::from_remote(&e)),
            Err(_) => Err(self.timed_out()),
        }
    }

    /// Public view URL for a key.
    #[must_use]
    pub fn view_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base_url)
    }

    fn timed_out(&self) -> StorageError {
        StorageError::TransientUploadFailure(format!(
            "remote call timed out after {}s",
            self.timeout.as_secs()
        ))
    }
}
