//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod ask;
pub mod attachments;
pub mod board;
pub mod health;
pub mod messages;

/// Creates the router with every HTTP route.
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(ask::routes())
        .merge(board::routes())
        .merge(messages::routes())
        .merge(attachments::routes())
}
