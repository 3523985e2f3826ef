//! Attachment blob storage using Apache OpenDAL.
//!
//! Two backends sit behind [`StorageService`]:
//! - Local filesystem under a configured upload root
//! - Remote S3-compatible object store (Cloudflare R2, AWS S3, ...)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        StorageService                           │
//! │      store(folder, file)  │  read(location)  │  delete(location) │
//! ├──────────────────────────────┬──────────────────────────────────┤
//! │   RemoteStorage (S3)         │   LocalStorage (Fs)              │
//! │   preferred when configured  │   always available, fallback     │
//! └──────────────────────────────┴──────────────────────────────────┘
//! ```

mod error;
mod filename;
mod local;
mod remote;
mod service;
mod types;

pub use error::StorageError;
pub use filename::{MAX_FILENAME_LEN, sanitize_filename, storage_key};
pub use local::LocalStorage;
pub use remote::RemoteStorage;
pub use service::{StorageService, access_url};
pub use types::{
    BlobLocation, MAX_CONTENT_TYPE_LEN, StoredBlob, UploadedFile, declared_content_type,
};
