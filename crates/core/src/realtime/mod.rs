//! Real-time notification fan-out.
//!
//! [`NotificationHub`] keeps one bounded outbound queue per connected client
//! and a set of named rooms keyed by user name. Events are published to every
//! connection and, for direct-message events, once more to the addressed room.

mod events;
mod hub;

pub use events::{ClientCommand, ServerEvent};
pub use hub::{ConnectionId, Delivery, NotificationHub};
