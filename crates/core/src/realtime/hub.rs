//! Connection registry and event fan-out.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, error, warn};

use super::events::ServerEvent;

/// Identifier of a live client connection.
pub type ConnectionId = u64;

/// Outcome of publishing one event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Frames queued for a client.
    pub delivered: usize,
    /// Frames dropped because a client's queue was full.
    pub dropped: usize,
    /// Connections removed because their receiver was gone.
    pub pruned: usize,
}

/// Registry of connected clients and the rooms they joined.
#[derive(Debug)]
pub struct NotificationHub {
    capacity: usize,
    next_id: AtomicU64,
    connections: DashMap<ConnectionId, mpsc::Sender<Arc<str>>>,
    rooms: DashMap<String, HashSet<ConnectionId>>,
}

impl NotificationHub {
    /// Create a hub with the given per-connection queue capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            next_id: AtomicU64::new(1),
            connections: DashMap::new(),
            rooms: DashMap::new(),
        }
    }

    /// Register a connection and return its outbound queue.
    pub fn connect(&self) -> (ConnectionId, mpsc::Receiver<Arc<str>>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.capacity);
        self.connections.insert(id, tx);
        debug!(connection_id = id, "Client connected");
        (id, rx)
    }

    /// Remove a connection from the registry and from every room.
    pub fn disconnect(&self, id: ConnectionId) {
        if self.connections.remove(&id).is_none() {
            return;
        }
        for mut members in self.rooms.iter_mut() {
            members.remove(&id);
        }
        self.rooms.retain(|_, members| !members.is_empty());
        debug!(connection_id = id, "Client disconnected");
    }

    /// Add a connection to a room.
    ///
    /// Returns `false` if it was already a member or is not connected.
    pub fn join(&self, id: ConnectionId, room: &str) -> bool {
        if !self.connections.contains_key(&id) {
            return false;
        }
        let joined = self.rooms.entry(room.to_string()).or_default().insert(id);

        // Undo the insert if a concurrent disconnect already swept the rooms.
        if !self.connections.contains_key(&id) {
            if let Some(mut members) = self.rooms.get_mut(room) {
                members.remove(&id);
            }
            self.rooms.remove_if(room, |_, members| members.is_empty());
            return false;
        }

        if joined {
            debug!(connection_id = id, room, "Joined room");
        }
        joined
    }

    /// Remove a connection from a room.
    ///
    /// Returns `false` if it was not a member.
    pub fn leave(&self, id: ConnectionId, room: &str) -> bool {
        let left = match self.rooms.get_mut(room) {
            Some(mut members) => members.remove(&id),
            None => return false,
        };
        self.rooms.remove_if(room, |_, members| members.is_empty());
        if left {
            debug!(connection_id = id, room, "Left room");
        }
        left
    }

    /// Number of live connections.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Number of connections in a room.
    #[must_use]
    pub fn room_size(&self, room: &str) -> usize {
        self.rooms.get(room).map_or(0, |members| members.len())
    }

    /// Publish an event to every connection, then to its room if it has one.
    ///
    /// Never blocks and never fails: full queues drop the frame and closed
    /// queues prune the connection.
    pub fn publish(&self, event: &ServerEvent) -> Delivery {
        let mut delivery = Delivery::default();
        let mut closed = Vec::new();

        let frame = match event.to_frame(None) {
            Ok(frame) => Arc::<str>::from(frame),
            Err(e) => {
                error!(error = %e, event = event.name(), "Failed to serialize event");
                return delivery;
            }
        };

        let targets: Vec<ConnectionId> = self.connections.iter().map(|c| *c.key()).collect();
        for id in targets {
            self.send_to(id, &frame, &mut delivery, &mut closed);
        }

        if let Some(room) = event.room() {
            let members: Vec<ConnectionId> = self
                .rooms
                .get(room)
                .map(|m| m.iter().copied().collect())
                .unwrap_or_default();

            if !members.is_empty() {
                match event.to_frame(Some(room)) {
                    Ok(room_frame) => {
                        let room_frame = Arc::<str>::from(room_frame);
                        for id in members {
                            self.send_to(id, &room_frame, &mut delivery, &mut closed);
                        }
                    }
                    Err(e) => {
                        error!(error = %e, event = event.name(), room, "Failed to serialize event");
                    }
                }
            }
        }

        for id in closed {
            self.disconnect(id);
            delivery.pruned += 1;
        }

        if delivery.dropped > 0 {
            warn!(
                event = event.name(),
                dropped = delivery.dropped,
                "Dropped events for slow clients"
            );
        }
        debug!(
            event = event.name(),
            delivered = delivery.delivered,
            pruned = delivery.pruned,
            "Published event"
        );

        delivery
    }

    fn send_to(
        &self,
        id: ConnectionId,
        frame: &Arc<str>,
        delivery: &mut Delivery,
        closed: &mut Vec<ConnectionId>,
    ) {
        let Some(sender) = self.connections.get(&id).map(|s| s.clone()) else {
            return;
        };
        match sender.try_send(Arc::clone(frame)) {
            Ok(()) => delivery.delivered += 1,
            Err(TrySendError::Full(_)) => delivery.dropped += 1,
            Err(TrySendError::Closed(_)) => {
                if !closed.contains(&id) {
                    closed.push(id);
                }
            }
        }
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new(64)
    }
}
