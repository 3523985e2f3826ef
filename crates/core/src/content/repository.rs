//! Repository traits for content persistence.
//!
//! Implemented by the db crate. Every mutating call runs in a single
//! database transaction.

use super::error::ContentError;
use super::types::{
    Attachment, Comment, Message, NewAttachment, NewComment, NewMessage, NewPost, Post,
};

/// Persistence for posts, comments and their attachments.
pub trait BoardRepository: Send + Sync {
    /// All posts newest first, hydrated with comments and attachments.
    fn list_posts(&self) -> impl std::future::Future<Output = Result<Vec<Post>, ContentError>> + Send;

    /// Find one hydrated post.
    fn find_post(
        &self,
        id: i32,
    ) -> impl std::future::Future<Output = Result<Option<Post>, ContentError>> + Send;

    /// Check if a post exists.
    fn post_exists(&self, id: i32) -> impl std::future::Future<Output = Result<bool, ContentError>> + Send;

    /// Insert a post and its attachment rows in one transaction.
    fn create_post(
        &self,
        input: NewPost,
        attachments: Vec<NewAttachment>,
    ) -> impl std::future::Future<Output = Result<Post, ContentError>> + Send;

    /// Insert a comment and its attachment rows in one transaction.
    fn create_comment(
        &self,
        post_id: i32,
        input: NewComment,
        attachments: Vec<NewAttachment>,
    ) -> impl std::future::Future<Output = Result<Comment, ContentError>> + Send;

    /// Attachments owned by a post and by each of its comments.
    fn attachments_for_post_tree(
        &self,
        post_id: i32,
    ) -> impl std::future::Future<Output = Result<Vec<Attachment>, ContentError>> + Send;

    /// Delete comment attachments, post attachments, comments and the post,
    /// in that order, in one transaction.
    ///
    /// Returns `false` if the post did not exist.
    fn delete_post(&self, post_id: i32) -> impl std::future::Future<Output = Result<bool, ContentError>> + Send;
}

/// Persistence for direct messages.
pub trait MessageRepository: Send + Sync {
    /// Insert a message and its attachment rows in one transaction.
    fn create_message(
        &self,
        input: NewMessage,
        attachments: Vec<NewAttachment>,
    ) -> impl std::future::Future<Output = Result<Message, ContentError>> + Send;

    /// Every message sent or received by `user`, with attachments.
    fn messages_involving(
        &self,
        user: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Message>, ContentError>> + Send;

    /// Mark unread messages from `other` to `user` as read, then load the
    /// conversation between them oldest first, in one transaction.
    ///
    /// Returns the messages and the number of rows marked read.
    fn open_conversation(
        &self,
        user: &str,
        other: &str,
    ) -> impl std::future::Future<Output = Result<(Vec<Message>, u64), ContentError>> + Send;

    /// Mark unread messages from `sender` to `receiver` as read.
    ///
    /// Returns the number of rows affected.
    fn mark_read(
        &self,
        sender: &str,
        receiver: &str,
    ) -> impl std::future::Future<Output = Result<u64, ContentError>> + Send;
}

/// Attachment lookups.
pub trait AttachmentRepository: Send + Sync {
    /// Find attachment by ID.
    fn find_attachment(
        &self,
        id: i32,
    ) -> impl std::future::Future<Output = Result<Option<Attachment>, ContentError>> + Send;
}
