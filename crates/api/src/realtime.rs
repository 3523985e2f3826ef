//! WebSocket endpoint for real-time notifications.
//!
//! Each socket gets a hub connection. A writer task drains the connection's
//! queue into the socket while the reader loop handles `join`/`leave` frames.

use std::sync::Arc;

use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
    routing::get,
};
use futures::{SinkExt, StreamExt};
use tracing::{debug, info};

use clubhouse_core::realtime::{ClientCommand, ConnectionId, NotificationHub};

use crate::AppState;

/// Creates the WebSocket route.
pub fn routes() -> Router<AppState> {
    Router::new().route("/ws", get(upgrade))
}

/// GET `/ws`
async fn upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(state.hub, socket))
}

async fn handle_socket(hub: Arc<NotificationHub>, socket: WebSocket) {
    let (id, mut outbound) = hub.connect();
    info!(connection_id = id, "Client connected");

    let (mut ws_tx, mut ws_rx) = socket.split();

    let writer = tokio::spawn(async move {
        while let Some(frame) = outbound.recv().await {
            if ws_tx.send(Message::Text(frame.to_string().into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(msg)) = ws_rx.next().await {
        match msg {
            Message::Text(text) => handle_frame(&hub, id, text.as_str()),
            Message::Close(_) => break,
            _ => {}
        }
    }

    hub.disconnect(id);
    writer.abort();
    info!(connection_id = id, "Client disconnected");
}

/// Apply one client frame. Unknown or malformed frames are ignored.
fn handle_frame(hub: &NotificationHub, id: ConnectionId, text: &str) {
    match serde_json::from_str::<ClientCommand>(text) {
        Ok(ClientCommand::Join { username }) => {
            let username = username.trim();
            if username.is_empty() {
                return;
            }
            hub.join(id, username);
            debug!(connection_id = id, room = username, "Joined room");
        }
        Ok(ClientCommand::Leave { username }) => {
            hub.leave(id, username.trim());
            debug!(connection_id = id, room = %username, "Left room");
        }
        Err(e) => debug!(connection_id = id, error = %e, "Ignoring client frame"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_and_leave_frames() {
        let hub = NotificationHub::new(4);
        let (id, _rx) = hub.connect();

        handle_frame(&hub, id, r#"{"event":"join","username":"aoki"}"#);
        assert_eq!(hub.room_size("aoki"), 1);

        handle_frame(&hub, id, r#"{"event":"join","username":"aoki"}"#);
        assert_eq!(hub.room_size("aoki"), 1);

        handle_frame(&hub, id, r#"{"event":"leave","username":"aoki"}"#);
        assert_eq!(hub.room_size("aoki"), 0);
    }

    #[test]
    fn test_unknown_frames_ignored() {
        let hub = NotificationHub::new(4);
        let (id, _rx) = hub.connect();

        handle_frame(&hub, id, "not json");
        handle_frame(&hub, id, r#"{"event":"shout","username":"aoki"}"#);
        handle_frame(&hub, id, r#"{"event":"join","username":"   "}"#);

        assert_eq!(hub.room_size("aoki"), 0);
        assert_eq!(hub.room_size(""), 0);
        assert_eq!(hub.connection_count(), 1);
    }
}
