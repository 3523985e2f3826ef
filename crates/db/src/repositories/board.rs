//! Board repository for posts, comments and their attachments.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use tracing::debug;

use super::hydrate::{
    attachments_where, comment_to_domain, db_err, hydrate_posts, insert_attachments,
    post_to_domain,
};
use crate::entities::{attachments, comments, posts};
use clubhouse_core::content::{
    Attachment, AttachmentOwner, BoardRepository as BoardRepoTrait, Comment, ContentError,
    NewAttachment, NewComment, NewPost, Post,
};

/// Board repository implementation.
#[derive(Debug, Clone)]
pub struct BoardRepository {
    db: DatabaseConnection,
}

impl BoardRepository {
    /// Create a new board repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

async fn comment_ids_of<C: ConnectionTrait>(conn: &C, post_id: i32) -> Result<Vec<i32>, ContentError> {
    comments::Entity::find()
        .select_only()
        .column(comments::Column::Id)
        .filter(comments::Column::PostId.eq(post_id))
        .into_tuple()
        .all(conn)
        .await
        .map_err(db_err)
}

impl BoardRepoTrait for BoardRepository {
    async fn list_posts(&self) -> Result<Vec<Post>, ContentError> {
        let models = posts::Entity::find()
            .order_by_desc(posts::Column::CreatedAt)
            .order_by_desc(posts::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        hydrate_posts(&self.db, models).await
    }

    async fn find_post(&self, id: i32) -> Result<Option<Post>, ContentError> {
        let Some(model) = posts::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        Ok(hydrate_posts(&self.db, vec![model]).await?.pop())
    }

    async fn post_exists(&self, id: i32) -> Result<bool, ContentError> {
        let count = posts::Entity::find_by_id(id)
            .count(&self.db)
            .await
            .map_err(db_err)?;

        Ok(count > 0)
    }

    async fn create_post(
        &self,
        input: NewPost,
        attachments: Vec<NewAttachment>,
    ) -> Result<Post, ContentError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let now = Utc::now();

        let post = posts::ActiveModel {
            id: NotSet,
            content: Set(input.content),
            author: Set(input.author),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        let attachments =
            insert_attachments(&txn, AttachmentOwner::Post(post.id), attachments).await?;

        txn.commit().await.map_err(db_err)?;

        Ok(post_to_domain(post, Vec::new(), attachments))
    }

    async fn create_comment(
        &self,
        post_id: i32,
        input: NewComment,
        attachments: Vec<NewAttachment>,
    ) -> Result<Comment, ContentError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let parent = posts::Entity::find_by_id(post_id)
            .count(&txn)
            .await
            .map_err(db_err)?;
        if parent == 0 {
            return Err(ContentError::not_found("post", post_id));
        }

        let comment = comments::ActiveModel {
            id: NotSet,
            content: Set(input.content),
            author: Set(input.author),
            created_at: Set(Utc::now().into()),
            post_id: Set(post_id),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        let attachments =
            insert_attachments(&txn, AttachmentOwner::Comment(comment.id), attachments).await?;

        txn.commit().await.map_err(db_err)?;

        Ok(comment_to_domain(comment, attachments))
    }

    async fn attachments_for_post_tree(
        &self,
        post_id: i32,
    ) -> Result<Vec<Attachment>, ContentError> {
        let comment_ids = comment_ids_of(&self.db, post_id).await?;

        let mut condition = Condition::any().add(attachments::Column::PostId.eq(post_id));
        if !comment_ids.is_empty() {
            condition = condition.add(attachments::Column::CommentId.is_in(comment_ids));
        }

        attachments_where(&self.db, condition).await
    }

    async fn delete_post(&self, post_id: i32) -> Result<bool, ContentError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let comment_ids = comment_ids_of(&txn, post_id).await?;
        let comment_count = comment_ids.len();

        let comment_attachments = if comment_ids.is_empty() {
            0
        } else {
            attachments::Entity::delete_many()
                .filter(attachments::Column::CommentId.is_in(comment_ids))
                .exec(&txn)
                .await
                .map_err(db_err)?
                .rows_affected
        };

        let post_attachments = attachments::Entity::delete_many()
            .filter(attachments::Column::PostId.eq(post_id))
            .exec(&txn)
            .await
            .map_err(db_err)?
            .rows_affected;

        comments::Entity::delete_many()
            .filter(comments::Column::PostId.eq(post_id))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        let deleted = posts::Entity::delete_by_id(post_id)
            .exec(&txn)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        debug!(
            post_id,
            comments = comment_count,
            comment_attachments,
            post_attachments,
            "Deleted post rows"
        );

        Ok(deleted.rows_affected > 0)
    }
}
