//! Direct messaging service.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use super::error::ContentError;
use super::repository::MessageRepository;
use super::types::{ContactSummary, Message, NewAttachment, NewMessage, ReadReceipt};
use super::uploads::{MESSAGES_FOLDER, discard_blobs, store_uploads};
use super::validation::{validate_message, validate_username};
use crate::realtime::{NotificationHub, ServerEvent};
use crate::storage::{BlobLocation, StorageService, UploadedFile};

/// Direct messages between named users.
pub struct MessageService<R: MessageRepository> {
    repo: Arc<R>,
    storage: Arc<StorageService>,
    hub: Arc<NotificationHub>,
}

impl<R: MessageRepository> MessageService<R> {
    /// Create a new message service.
    #[must_use]
    pub fn new(repo: Arc<R>, storage: Arc<StorageService>, hub: Arc<NotificationHub>) -> Self {
        Self { repo, storage, hub }
    }

    /// Send a message with attachments and notify the receiver.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Content, sender or receiver is missing
    /// - A file cannot be stored
    /// - The database write fails
    pub async fn send_message(
        &self,
        input: NewMessage,
        files: Vec<UploadedFile>,
    ) -> Result<Message, ContentError> {
        validate_message(&input)?;
        let input = NewMessage {
            content: input.content.trim().to_string(),
            sender: input.sender.trim().to_string(),
            receiver: input.receiver.trim().to_string(),
        };

        let blobs = store_uploads(&self.storage, MESSAGES_FOLDER, files).await?;
        let locations: Vec<BlobLocation> = blobs.iter().map(|b| b.location.clone()).collect();
        let attachments = blobs.into_iter().map(NewAttachment::from).collect();

        let message = match self.repo.create_message(input, attachments).await {
            Ok(message) => message,
            Err(e) => {
                discard_blobs(&self.storage, &locations).await;
                return Err(e);
            }
        };

        info!(
            message_id = message.id,
            sender = %message.sender,
            receiver = %message.receiver,
            attachments = message.attachments.len(),
            "Message sent"
        );
        self.hub.publish(&ServerEvent::NewMessage(message.clone()));

        Ok(message)
    }

    /// Everyone `user` has exchanged messages with.
    ///
    /// # Errors
    ///
    /// Returns an error if `user` is blank or the repository fails.
    pub async fn contacts(&self, user: &str) -> Result<Vec<ContactSummary>, ContentError> {
        validate_username("sender", user)?;
        let user = user.trim();
        let messages = self.repo.messages_involving(user).await?;
        Ok(summarize_contacts(user, &messages))
    }

    /// Mark messages from `other` as read and return the conversation.
    ///
    /// # Errors
    ///
    /// Returns an error if either name is blank or the repository fails.
    pub async fn open_conversation(
        &self,
        user: &str,
        other: &str,
    ) -> Result<Vec<Message>, ContentError> {
        validate_username("sender", user)?;
        validate_username("username", other)?;
        let (user, other) = (user.trim(), other.trim());

        let (messages, marked) = self.repo.open_conversation(user, other).await?;
        debug!(user, other, messages = messages.len(), marked, "Conversation opened");
        self.announce_read(other, user, marked);

        Ok(messages)
    }

    /// Mark every unread message from `sender` to `receiver` as read.
    ///
    /// Returns the number of messages updated; calling it again returns 0.
    ///
    /// # Errors
    ///
    /// Returns an error if either name is blank or the repository fails.
    pub async fn mark_read(&self, sender: &str, receiver: &str) -> Result<u64, ContentError> {
        validate_username("sender", sender)?;
        validate_username("receiver", receiver)?;
        let (sender, receiver) = (sender.trim(), receiver.trim());

        let updated = self.repo.mark_read(sender, receiver).await?;
        self.announce_read(sender, receiver, updated);

        Ok(updated)
    }

    fn announce_read(&self, sender: &str, receiver: &str, count: u64) {
        if count == 0 {
            return;
        }
        info!(sender, receiver, count, "Messages marked as read");
        self.hub.publish(&ServerEvent::ReadMessages(ReadReceipt {
            sender: sender.to_string(),
            receiver: receiver.to_string(),
            count,
        }));
    }
}

fn is_newer(candidate: &Message, current: &Message) -> bool {
    (candidate.created_at, candidate.id) > (current.created_at, current.id)
}

/// Build the contact list of `user` from every message they sent or received.
///
/// Sorted by most recent message, newest first; ties by name.
#[must_use]
pub fn summarize_contacts(user: &str, messages: &[Message]) -> Vec<ContactSummary> {
    let mut contacts: BTreeMap<&str, ContactSummary> = BTreeMap::new();

    for message in messages {
        let other = if message.sender == user {
            message.receiver.as_str()
        } else if message.receiver == user {
            message.sender.as_str()
        } else {
            continue;
        };

        let entry = contacts.entry(other).or_insert_with(|| ContactSummary {
            username: other.to_string(),
            latest_message: None,
            unread_count: 0,
        });

        if message.sender == other && message.receiver == user && !message.is_read {
            entry.unread_count += 1;
        }

        let replace = entry
            .latest_message
            .as_ref()
            .is_none_or(|current| is_newer(message, current));
        if replace {
            entry.latest_message = Some(message.clone());
        }
    }

    let mut contacts: Vec<ContactSummary> = contacts.into_values().collect();
    contacts.sort_by(|a, b| {
        let a_time = a.latest_message.as_ref().map(|m| m.created_at);
        let b_time = b.latest_message.as_ref().map(|m| m.created_at);
        match (a_time, b_time) {
            (Some(a_time), Some(b_time)) => b_time.cmp(&a_time),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
        .then_with(|| a.username.cmp(&b.username))
    });
    contacts
}
