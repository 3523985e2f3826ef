//! Bulletin board posts, comments, direct messages and their attachments.
//!
//! Every mutation follows the same order: validate, store blobs, write the
//! parent and attachment rows in one transaction, then publish an event.
//! Blobs whose rows never land are removed again.

pub mod attachments;
pub mod board;
pub mod error;
pub mod messages;
pub mod repository;
pub mod types;
pub mod uploads;
pub mod validation;


pub use attachments::{AttachmentService, Download};
pub use board::BoardService;
pub use error::ContentError;
pub use messages::{MessageService, summarize_contacts};
pub use repository::{AttachmentRepository, BoardRepository, MessageRepository};
pub use types::{
    Attachment, AttachmentOwner, Comment, ContactSummary, Message, NewAttachment, NewComment,
    NewMessage, NewPost, Post, ReadReceipt,
};
pub use uploads::{BOARD_FOLDER, MESSAGES_FOLDER};
pub use validation::MAX_NAME_LEN;
