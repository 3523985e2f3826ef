//! Wire format of real-time events.

use serde::Deserialize;
use serde_json::{Value, json};

use crate::content::{Comment, Message, Post, ReadReceipt};

/// Event pushed from the server to connected clients.
#[derive(Debug, Clone)]
pub enum ServerEvent {
    /// A post was created.
    NewPost(Post),
    /// A comment was added to a post.
    NewComment {
        /// Parent post.
        post_id: i32,
        /// The new comment.
        comment: Comment,
    },
    /// A post and everything under it was deleted.
    DeletePost {
        /// Deleted post.
        post_id: i32,
    },
    /// A direct message was sent.
    NewMessage(Message),
    /// Messages were marked as read by their receiver.
    ReadMessages(ReadReceipt),
}

impl ServerEvent {
    /// Event name on the wire.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NewPost(_) => "new_post",
            Self::NewComment { .. } => "new_comment",
            Self::DeletePost { .. } => "delete_post",
            Self::NewMessage(_) => "new_message",
            Self::ReadMessages(_) => "read_messages",
        }
    }

    /// Room that receives an extra copy of this event, if any.
    ///
    /// New messages go to the receiver; read receipts go back to the sender.
    #[must_use]
    pub fn room(&self) -> Option<&str> {
        match self {
            Self::NewMessage(message) => Some(&message.receiver),
            Self::ReadMessages(receipt) => Some(&receipt.sender),
            _ => None,
        }
    }

    fn payload(&self) -> serde_json::Result<Value> {
        match self {
            Self::NewPost(post) => serde_json::to_value(post),
            Self::NewComment { post_id, comment } => Ok(json!({
                "post_id": post_id,
                "comment": serde_json::to_value(comment)?,
            })),
            Self::DeletePost { post_id } => Ok(json!({ "post_id": post_id })),
            Self::NewMessage(message) => serde_json::to_value(message),
            Self::ReadMessages(receipt) => serde_json::to_value(receipt),
        }
    }

    /// Serialize the `{"event", "room", "data"}` envelope.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be serialized.
    pub fn to_frame(&self, room: Option<&str>) -> serde_json::Result<String> {
        let envelope = json!({
            "event": self.name(),
            "room": room,
            "data": self.payload()?,
        });
        serde_json::to_string(&envelope)
    }
}

/// Frame sent by a client over the real-time channel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Subscribe to the room named after a user.
    Join {
        /// Room name.
        username: String,
    },
    /// Unsubscribe from a user's room.
    Leave {
        /// Room name.
        username: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn message() -> Message {
        Message {
            id: 3,
            content: "Front nine at 7?".into(),
            sender: "ana".into(),
            receiver: "ben".into(),
            created_at: Utc::now(),
            is_read: false,
            attachments: vec![],
        }
    }

    #[test]
    fn test_new_message_envelope() {
        let event = ServerEvent::NewMessage(message());
        assert_eq!(event.room(), Some("ben"));

        let frame: Value = serde_json::from_str(&event.to_frame(None).unwrap()).unwrap();
        assert_eq!(frame["event"], "new_message");
        assert!(frame["room"].is_null());
        assert_eq!(frame["data"]["sender"], "ana");
        assert_eq!(frame["data"]["attachments"], json!([]));

        let room_frame: Value =
            serde_json::from_str(&event.to_frame(event.room()).unwrap()).unwrap();
        assert_eq!(room_frame["room"], "ben");
    }

    #[test]
    fn test_read_receipt_goes_to_sender_room() {
        let event = ServerEvent::ReadMessages(ReadReceipt {
            sender: "ana".into(),
            receiver: "ben".into(),
            count: 2,
        });
        assert_eq!(event.name(), "read_messages");
        assert_eq!(event.room(), Some("ana"));

        let frame: Value = serde_json::from_str(&event.to_frame(None).unwrap()).unwrap();
        assert_eq!(frame["data"], json!({"sender": "ana", "receiver": "ben", "count": 2}));
    }

    #[test]
    fn test_delete_post_payload() {
        let event = ServerEvent::DeletePost { post_id: 12 };
        assert_eq!(event.room(), None);
        let frame: Value = serde_json::from_str(&event.to_frame(None).unwrap()).unwrap();
        assert_eq!(frame["data"], json!({"post_id": 12}));
    }

    #[test]
    fn test_client_command_parsing() {
        let join: ClientCommand =
            serde_json::from_str(r#"{"event":"join","username":"ana"}"#).unwrap();
        assert_eq!(
            join,
            ClientCommand::Join {
                username: "ana".into()
            }
        );

        let leave: ClientCommand =
            serde_json::from_str(r#"{"event":"leave","username":"ana"}"#).unwrap();
        assert!(matches!(leave, ClientCommand::Leave { .. }));

        assert!(serde_json::from_str::<ClientCommand>(r#"{"event":"shout"}"#).is_err());
    }
}
