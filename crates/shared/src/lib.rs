//! Shared errors and configuration for Clubhouse.
//!
//! This crate provides common types used across all other crates:
//! - Application-wide error types
//! - Layered configuration management

pub mod config;
pub mod error;

pub use config::{
    AppConfig, DatabaseConfig, LlmConfig, RealtimeConfig, RemoteStorageConfig, ServerConfig,
    StorageBackendKind, StorageSettings,
};
pub use error::{AppError, AppResult};
