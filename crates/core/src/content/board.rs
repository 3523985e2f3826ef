//! Bulletin board service.

use std::sync::Arc;

use tracing::{info, warn};

use super::error::ContentError;
use super::repository::BoardRepository;
use super::types::{Comment, NewAttachment, NewComment, NewPost, Post};
use super::uploads::{BOARD_FOLDER, discard_blobs, store_uploads};
use super::validation::{validate_comment, validate_post};
use crate::realtime::{NotificationHub, ServerEvent};
use crate::storage::{BlobLocation, StorageService, StoredBlob, UploadedFile};

/// Posts, comments and their attachments.
pub struct BoardService<R: BoardRepository> {
    repo: Arc<R>,
    storage: Arc<StorageService>,
    hub: Arc<NotificationHub>,
}

fn split_blobs(blobs: Vec<StoredBlob>) -> (Vec<BlobLocation>, Vec<NewAttachment>) {
    let locations = blobs.iter().map(|b| b.location.clone()).collect();
    let attachments = blobs.into_iter().map(NewAttachment::from).collect();
    (locations, attachments)
}

impl<R: BoardRepository> BoardService<R> {
    /// Create a new board service.
    #[must_use]
    pub fn new(repo: Arc<R>, storage: Arc<StorageService>, hub: Arc<NotificationHub>) -> Self {
        Self { repo, storage, hub }
    }

    /// All posts, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository fails.
    pub async fn list_posts(&self) -> Result<Vec<Post>, ContentError> {
        self.repo.list_posts().await
    }

    /// One post with its comments and attachments.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::NotFound`] if the post does not exist.
    pub async fn get_post(&self, id: i32) -> Result<Post, ContentError> {
        self.repo
            .find_post(id)
            .await?
            .ok_or_else(|| ContentError::not_found("post", id))
    }

    /// Create a post with attachments and announce it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Content or author is missing
    /// - A file cannot be stored
    /// - The database write fails
    pub async fn create_post(
        &self,
        input: NewPost,
        files: Vec<UploadedFile>,
    ) -> Result<Post, ContentError> {
        validate_post(&input)?;
        let input = NewPost {
            content: input.content.trim().to_string(),
            author: input.author.trim().to_string(),
        };

        let blobs = store_uploads(&self.storage, BOARD_FOLDER, files).await?;
        let (locations, attachments) = split_blobs(blobs);

        let post = match self.repo.create_post(input, attachments).await {
            Ok(post) => post,
            Err(e) => {
                discard_blobs(&self.storage, &locations).await;
                return Err(e);
            }
        };

        info!(
            post_id = post.id,
            author = %post.author,
            attachments = post.attachments.len(),
            "Post created"
        );
        self.hub.publish(&ServerEvent::NewPost(post.clone()));

        Ok(post)
    }

    /// Comment on a post and announce it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Content or author is missing
    /// - The post does not exist
    /// - A file cannot be stored
    /// - The database write fails
    pub async fn add_comment(
        &self,
        post_id: i32,
        input: NewComment,
        files: Vec<UploadedFile>,
    ) -> Result<Comment, ContentError> {
        validate_comment(&input)?;
        if !self.repo.post_exists(post_id).await? {
            return Err(ContentError::not_found("post", post_id));
        }
        let input = NewComment {
            content: input.content.trim().to_string(),
            author: input.author.trim().to_string(),
        };

        let blobs = store_uploads(&self.storage, BOARD_FOLDER, files).await?;
        let (locations, attachments) = split_blobs(blobs);

        let comment = match self.repo.create_comment(post_id, input, attachments).await {
            Ok(comment) => comment,
            Err(e) => {
                discard_blobs(&self.storage, &locations).await;
                return Err(e);
            }
        };

        info!(
            post_id,
            comment_id = comment.id,
            attachments = comment.attachments.len(),
            "Comment added"
        );
        self.hub.publish(&ServerEvent::NewComment {
            post_id,
            comment: comment.clone(),
        });

        Ok(comment)
    }

    /// Delete a post, its comments, their attachments and the blobs.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::NotFound`] if the post does not exist, or a
    /// repository error if the rows cannot be deleted.
    pub async fn delete_post(&self, post_id: i32) -> Result<(), ContentError> {
        if !self.repo.post_exists(post_id).await? {
            return Err(ContentError::not_found("post", post_id));
        }

        let attachments = self.repo.attachments_for_post_tree(post_id).await?;
        let mut failed = 0usize;
        for attachment in &attachments {
            if !self.storage.delete(&attachment.location).await {
                failed += 1;
            }
        }
        if failed > 0 {
            warn!(post_id, failed, "Some attachment blobs could not be removed");
        }

        if !self.repo.delete_post(post_id).await? {
            return Err(ContentError::not_found("post", post_id));
        }

        info!(post_id, attachments = attachments.len(), "Post deleted");
        self.hub.publish(&ServerEvent::DeletePost { post_id });

        Ok(())
    }
}
