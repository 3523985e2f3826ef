//! Row to domain conversion shared by the repositories.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, ConnectionTrait, DbErr,
    EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{attachments, comments, messages, posts};
use clubhouse_core::content::{
    Attachment, AttachmentOwner, Comment, ContentError, Message, NewAttachment, Post,
};
use clubhouse_core::storage::BlobLocation;
use clubhouse_shared::StorageBackendKind;

pub(crate) fn db_err(err: DbErr) -> ContentError {
    ContentError::repository(err.to_string())
}

fn utc(ts: DateTimeWithTimeZone) -> chrono::DateTime<Utc> {
    ts.with_timezone(&Utc)
}

/// Convert an attachment row, rejecting rows that break the owner or
/// locator rules.
pub(crate) fn attachment_to_domain(model: attachments::Model) -> Result<Attachment, ContentError> {
    let owner = AttachmentOwner::from_columns(model.post_id, model.comment_id, model.message_id)
        .ok_or_else(|| {
            ContentError::repository(format!(
                "attachment {} must reference exactly one parent",
                model.id
            ))
        })?;

    let backend = StorageBackendKind::parse(&model.storage_backend).ok_or_else(|| {
        ContentError::repository(format!(
            "attachment {} has unknown storage backend '{}'",
            model.id, model.storage_backend
        ))
    })?;

    let location = BlobLocation::from_parts(
        backend,
        model.file_path,
        model.remote_object_id,
        model.remote_view_url,
    )
    .ok_or_else(|| {
        ContentError::repository(format!(
            "attachment {} is missing its {} locator",
            model.id,
            backend.as_str()
        ))
    })?;

    Ok(Attachment {
        id: model.id,
        owner,
        filename: model.filename,
        content_type: model.file_type,
        file_size: model.file_size,
        uploaded_at: utc(model.uploaded_at),
        location,
    })
}

fn attachment_active_model(owner: AttachmentOwner, input: NewAttachment) -> attachments::ActiveModel {
    let location = &input.location;
    attachments::ActiveModel {
        id: NotSet,
        filename: Set(input.filename),
        file_type: Set(input.content_type),
        file_size: Set(input.file_size),
        uploaded_at: Set(Utc::now().into()),
        storage_backend: Set(location.backend().as_str().to_string()),
        file_path: Set(location.local_path().map(str::to_string)),
        remote_object_id: Set(location.remote_object_id().map(str::to_string)),
        remote_view_url: Set(location.remote_view_url().map(str::to_string)),
        post_id: Set(owner.post_id()),
        comment_id: Set(owner.comment_id()),
        message_id: Set(owner.message_id()),
    }
}

/// Insert attachment rows for a freshly inserted parent.
pub(crate) async fn insert_attachments<C: ConnectionTrait>(
    conn: &C,
    owner: AttachmentOwner,
    inputs: Vec<NewAttachment>,
) -> Result<Vec<Attachment>, ContentError> {
    let mut inserted = Vec::with_capacity(inputs.len());
    for input in inputs {
        let model = attachment_active_model(owner, input)
            .insert(conn)
            .await
            .map_err(db_err)?;
        inserted.push(attachment_to_domain(model)?);
    }
    Ok(inserted)
}

/// Load attachments matching a condition, oldest first.
pub(crate) async fn attachments_where<C: ConnectionTrait>(
    conn: &C,
    condition: Condition,
) -> Result<Vec<Attachment>, ContentError> {
    attachments::Entity::find()
        .filter(condition)
        .order_by_asc(attachments::Column::Id)
        .all(conn)
        .await
        .map_err(db_err)?
        .into_iter()
        .map(attachment_to_domain)
        .collect()
}

pub(crate) fn comment_to_domain(model: comments::Model, attachments: Vec<Attachment>) -> Comment {
    Comment {
        id: model.id,
        content: model.content,
        author: model.author,
        created_at: utc(model.created_at),
        post_id: model.post_id,
        attachments,
    }
}

pub(crate) fn post_to_domain(
    model: posts::Model,
    comments: Vec<Comment>,
    attachments: Vec<Attachment>,
) -> Post {
    Post {
        id: model.id,
        content: model.content,
        author: model.author,
        created_at: utc(model.created_at),
        updated_at: utc(model.updated_at),
        comments,
        attachments,
    }
}

pub(crate) fn message_to_domain(model: messages::Model, attachments: Vec<Attachment>) -> Message {
    Message {
        id: model.id,
        content: model.content,
        sender: model.sender,
        receiver: model.receiver,
        created_at: utc(model.created_at),
        is_read: model.is_read,
        attachments,
    }
}

/// Attach comments and attachments to post rows, keeping row order.
pub(crate) async fn hydrate_posts<C: ConnectionTrait>(
    conn: &C,
    models: Vec<posts::Model>,
) -> Result<Vec<Post>, ContentError> {
    if models.is_empty() {
        return Ok(Vec::new());
    }

    let post_ids: Vec<i32> = models.iter().map(|p| p.id).collect();
    let comment_models = comments::Entity::find()
        .filter(comments::Column::PostId.is_in(post_ids.clone()))
        .order_by_asc(comments::Column::CreatedAt)
        .order_by_asc(comments::Column::Id)
        .all(conn)
        .await
        .map_err(db_err)?;
    let comment_ids: Vec<i32> = comment_models.iter().map(|c| c.id).collect();

    let mut condition = Condition::any().add(attachments::Column::PostId.is_in(post_ids));
    if !comment_ids.is_empty() {
        condition = condition.add(attachments::Column::CommentId.is_in(comment_ids));
    }

    let mut by_post: HashMap<i32, Vec<Attachment>> = HashMap::new();
    let mut by_comment: HashMap<i32, Vec<Attachment>> = HashMap::new();
    for attachment in attachments_where(conn, condition).await? {
        let owner = attachment.owner;
        match owner {
            AttachmentOwner::Post(id) => by_post.entry(id).or_default().push(attachment),
            AttachmentOwner::Comment(id) => by_comment.entry(id).or_default().push(attachment),
            AttachmentOwner::Message(_) => {}
        }
    }

    let mut comments_by_post: HashMap<i32, Vec<Comment>> = HashMap::new();
    for model in comment_models {
        let attachments = by_comment.remove(&model.id).unwrap_or_default();
        comments_by_post
            .entry(model.post_id)
            .or_default()
            .push(comment_to_domain(model, attachments));
    }

    Ok(models
        .into_iter()
        .map(|model| {
            let comments = comments_by_post.remove(&model.id).unwrap_or_default();
            let attachments = by_post.remove(&model.id).unwrap_or_default();
            post_to_domain(model, comments, attachments)
        })
        .collect())
}

/// Attach attachments to message rows, keeping row order.
pub(crate) async fn hydrate_messages<C: ConnectionTrait>(
    conn: &C,
    models: Vec<messages::Model>,
) -> Result<Vec<Message>, ContentError> {
    if models.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
    let mut by_message: HashMap<i32, Vec<Attachment>> = HashMap::new();
    let condition = Condition::all().add(attachments::Column::MessageId.is_in(ids));
    for attachment in attachments_where(conn, condition).await? {
        if let Some(id) = attachment.owner.message_id() {
            by_message.entry(id).or_default().push(attachment);
        }
    }

    Ok(models
        .into_iter()
        .map(|model| {
            let attachments = by_message.remove(&model.id).unwrap_or_default();
            message_to_domain(model, attachments)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> attachments::Model {
        attachments::Model {
            id: 1,
            filename: "card.pdf".into(),
            file_type: Some("application/pdf".into()),
            file_size: 10,
            uploaded_at: Utc::now().into(),
            storage_backend: "local".into(),
            file_path: Some("board/abc_card.pdf".into()),
            remote_object_id: None,
            remote_view_url: None,
            post_id: Some(3),
            comment_id: None,
            message_id: None,
        }
    }

    #[test]
    fn test_local_row_converts() {
        let attachment = attachment_to_domain(row()).unwrap();
        assert_eq!(attachment.owner, AttachmentOwner::Post(3));
        assert_eq!(attachment.location.local_path(), Some("board/abc_card.pdf"));
    }

    #[test]
    fn test_row_with_two_owners_is_rejected() {
        let model = attachments::Model {
            message_id: Some(4),
            ..row()
        };
        assert!(matches!(
            attachment_to_domain(model),
            Err(ContentError::Repository(_))
        ));
    }

    #[test]
    fn test_remote_row_without_view_url_is_rejected() {
        let model = attachments::Model {
            storage_backend: "remote".into(),
            file_path: None,
            remote_object_id: Some("board/abc_card.pdf".into()),
            ..row()
        };
        assert!(matches!(
            attachment_to_domain(model),
            Err(ContentError::Repository(_))
        ));
    }

    #[test]
    fn test_active_model_sets_single_foreign_key() {
        let input = NewAttachment {
            filename: "card.pdf".into(),
            content_type: None,
            file_size: 4,
            location: BlobLocation::Remote {
                object_id: "messages/abc_card.pdf".into(),
                view_url: "https://files.example.com/messages/abc_card.pdf".into(),
            },
        };
        let model = attachment_active_model(AttachmentOwner::Message(8), input);
        assert_eq!(model.message_id, Set(Some(8)));
        assert_eq!(model.post_id, Set(None));
        assert_eq!(model.storage_backend, Set("remote".to_string()));
        assert_eq!(model.file_path, Set(None));
    }
}
