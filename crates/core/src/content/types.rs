//! Content domain types: posts, comments, messages and their attachments.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use clubhouse_shared::StorageBackendKind;

use crate::storage::{BlobLocation, StoredBlob, access_url};

/// The single parent an attachment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentOwner {
    /// Attached to a post.
    Post(i32),
    /// Attached to a comment.
    Comment(i32),
    /// Attached to a direct message.
    Message(i32),
}

impl AttachmentOwner {
    /// Rebuild an owner from the three nullable foreign keys.
    ///
    /// Returns `None` unless exactly one is set.
    #[must_use]
    pub fn from_columns(
        post_id: Option<i32>,
        comment_id: Option<i32>,
        message_id: Option<i32>,
    ) -> Option<Self> {
        match (post_id, comment_id, message_id) {
            (Some(id), None, None) => Some(Self::Post(id)),
            (None, Some(id), None) => Some(Self::Comment(id)),
            (None, None, Some(id)) => Some(Self::Message(id)),
            _ => None,
        }
    }

    /// Post foreign key.
    #[must_use]
    pub const fn post_id(&self) -> Option<i32> {
        match self {
            Self::Post(id) => Some(*id),
            _ => None,
        }
    }

    /// Comment foreign key.
    #[must_use]
    pub const fn comment_id(&self) -> Option<i32> {
        match self {
            Self::Comment(id) => Some(*id),
            _ => None,
        }
    }

    /// Message foreign key.
    #[must_use]
    pub const fn message_id(&self) -> Option<i32> {
        match self {
            Self::Message(id) => Some(*id),
            _ => None,
        }
    }
}

/// A stored attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Unique identifier.
    pub id: i32,
    /// Owning entity.
    pub owner: AttachmentOwner,
    /// Sanitized original filename.
    pub filename: String,
    /// Client-declared media type.
    pub content_type: Option<String>,
    /// Size in bytes.
    pub file_size: i64,
    /// Upload timestamp.
    pub uploaded_at: DateTime<Utc>,
    /// Where the blob lives.
    pub location: BlobLocation,
}

impl Attachment {
    /// URL clients fetch this attachment from.
    #[must_use]
    pub fn access_url(&self) -> String {
        access_url(&self.location, self.id)
    }
}

/// Client-facing attachment descriptor.
#[derive(Serialize)]
struct AttachmentDescriptor<'a> {
    id: i32,
    filename: &'a str,
    file_type: Option<&'a str>,
    file_size: i64,
    uploaded_at: DateTime<Utc>,
    storage: StorageBackendKind,
    url: String,
    post_id: Option<i32>,
    comment_id: Option<i32>,
    message_id: Option<i32>,
}

impl Serialize for Attachment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        AttachmentDescriptor {
            id: self.id,
            filename: &self.filename,
            file_type: self.content_type.as_deref(),
            file_size: self.file_size,
            uploaded_at: self.uploaded_at,
            storage: self.location.backend(),
            url: self.access_url(),
            post_id: self.owner.post_id(),
            comment_id: self.owner.comment_id(),
            message_id: self.owner.message_id(),
        }
        .serialize(serializer)
    }
}

/// Attachment metadata ready to be inserted alongside its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttachment {
    /// Sanitized original filename.
    pub filename: String,
    /// Client-declared media type.
    pub content_type: Option<String>,
    /// Size in bytes.
    pub file_size: i64,
    /// Where the blob lives.
    pub location: BlobLocation,
}

impl From<StoredBlob> for NewAttachment {
    fn from(blob: StoredBlob) -> Self {
        Self {
            filename: blob.filename,
            content_type: blob.content_type,
            file_size: i64::try_from(blob.size).unwrap_or(i64::MAX),
            location: blob.location,
        }
    }
}

/// A bulletin board post with its comments and attachments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    /// Unique identifier.
    pub id: i32,
    /// Post body.
    pub content: String,
    /// Author name.
    pub author: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Comments, oldest first.
    pub comments: Vec<Comment>,
    /// Attachments owned directly by the post.
    pub attachments: Vec<Attachment>,
}

/// A comment on a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    /// Unique identifier.
    pub id: i32,
    /// Comment body.
    pub content: String,
    /// Author name.
    pub author: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Parent post.
    pub post_id: i32,
    /// Attachments owned by the comment.
    pub attachments: Vec<Attachment>,
}

/// A direct message between two named users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Unique identifier.
    pub id: i32,
    /// Message body.
    pub content: String,
    /// Sender name.
    pub sender: String,
    /// Receiver name.
    pub receiver: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Whether the receiver has read it.
    pub is_read: bool,
    /// Attachments owned by the message.
    pub attachments: Vec<Attachment>,
}

/// Input for creating a post.
#[derive(Debug, Clone)]
pub struct NewPost {
    /// Post body.
    pub content: String,
    /// Author name.
    pub author: String,
}

/// Input for commenting on a post.
#[derive(Debug, Clone)]
pub struct NewComment {
    /// Comment body.
    pub content: String,
    /// Author name.
    pub author: String,
}

/// Input for sending a direct message.
#[derive(Debug, Clone)]
pub struct NewMessage {
    /// Message body.
    pub content: String,
    /// Sender name.
    pub sender: String,
    /// Receiver name.
    pub receiver: String,
}

/// Per-correspondent summary in a user's contact list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactSummary {
    /// Correspondent name.
    pub username: String,
    /// Most recent message exchanged in either direction.
    pub latest_message: Option<Message>,
    /// Unread messages from this correspondent to the user.
    pub unread_count: u64,
}

/// Read receipt broadcast after messages are marked as read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadReceipt {
    /// Author of the messages that were read.
    pub sender: String,
    /// User who read them.
    pub receiver: String,
    /// Number of messages newly marked as read.
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some(1), None, None, Some(AttachmentOwner::Post(1)))]
    #[case(None, Some(2), None, Some(AttachmentOwner::Comment(2)))]
    #[case(None, None, Some(3), Some(AttachmentOwner::Message(3)))]
    #[case(None, None, None, None)]
    #[case(Some(1), Some(2), None, None)]
    #[case(Some(1), None, Some(3), None)]
    #[case(Some(1), Some(2), Some(3), None)]
    fn test_owner_requires_exactly_one_parent(
        #[case] post: Option<i32>,
        #[case] comment: Option<i32>,
        #[case] message: Option<i32>,
        #[case] expected: Option<AttachmentOwner>,
    ) {
        assert_eq!(AttachmentOwner::from_columns(post, comment, message), expected);
    }

    #[test]
    fn test_owner_sets_single_foreign_key() {
        let owner = AttachmentOwner::Comment(9);
        assert_eq!(owner.post_id(), None);
        assert_eq!(owner.comment_id(), Some(9));
        assert_eq!(owner.message_id(), None);
    }

    #[test]
    fn test_attachment_descriptor_serialization() {
        let attachment = Attachment {
            id: 5,
            owner: AttachmentOwner::Post(1),
            filename: "yardage.pdf".into(),
            content_type: Some("application/pdf".into()),
            file_size: 2048,
            uploaded_at: Utc::now(),
            location: BlobLocation::Local {
                path: "board/abc_yardage.pdf".into(),
            },
        };

        let value = serde_json::to_value(&attachment).expect("serialize");
        assert_eq!(value["id"], 5);
        assert_eq!(value["filename"], "yardage.pdf");
        assert_eq!(value["file_size"], 2048);
        assert_eq!(value["storage"], "local");
        assert_eq!(value["url"], "/board/api/attachments/5");
        assert_eq!(value["post_id"], 1);
        assert!(value["comment_id"].is_null());
        assert!(value.get("file_path").is_none());
    }
}
