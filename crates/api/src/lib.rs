//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - Board, messaging, attachment and Q&A routes
//! - The WebSocket endpoint for real-time notifications
//! - Multipart form extraction
//! - Error responses

pub mod error;
pub mod extractors;
pub mod realtime;
pub mod routes;

use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit};
use clubhouse_core::{ask::PerplexityClient, realtime::NotificationHub, storage::StorageService};
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Attachment blob storage.
    pub storage: Arc<StorageService>,
    /// Real-time connection registry.
    pub hub: Arc<NotificationHub>,
    /// LLM provider client for `/api/ask`.
    pub answers: Arc<PerplexityClient>,
    /// Upper bound on request body size in bytes.
    pub max_request_bytes: usize,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::app_routes())
        .merge(realtime::routes())
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(state.max_request_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
