//! Clubhouse server
//!
//! Main entry point for the golf club community backend.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clubhouse_api::{AppState, create_router};
use clubhouse_core::{ask::PerplexityClient, realtime::NotificationHub, storage::StorageService};
use clubhouse_db::connect;
use clubhouse_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clubhouse=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;

    let db = connect(&config.database).await?;
    info!("Connected to database");

    let storage = StorageService::from_settings(&config.storage)
        .context("failed to configure attachment storage")?;
    info!(
        backend = storage.preferred_backend().as_str(),
        upload_root = %config.storage.upload_root,
        max_file_size = config.storage.max_file_size,
        "Attachment storage configured"
    );

    let answers = PerplexityClient::new(config.llm.clone())?;
    if answers.is_configured() {
        info!(model = answers.model(), "LLM provider configured");
    } else {
        warn!("LLM API key is not set; /api/ask will answer 503");
    }

    let state = AppState {
        db: Arc::new(db),
        storage: Arc::new(storage),
        hub: Arc::new(NotificationHub::new(config.realtime.queue_capacity)),
        answers: Arc::new(answers),
        max_request_bytes: config.server.max_request_bytes,
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
