//! Message repository for direct messages and their attachments.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use super::hydrate::{db_err, hydrate_messages, insert_attachments, message_to_domain};
use crate::entities::messages;
use clubhouse_core::content::{
    AttachmentOwner, ContentError, Message, MessageRepository as MessageRepoTrait, NewAttachment,
    NewMessage,
};

/// Message repository implementation.
#[derive(Debug, Clone)]
pub struct MessageRepository {
    db: DatabaseConnection,
}

impl MessageRepository {
    /// Create a new message repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

async fn mark_read_in<C: ConnectionTrait>(
    conn: &C,
    sender: &str,
    receiver: &str,
) -> Result<u64, ContentError> {
    let result = messages::Entity::update_many()
        .col_expr(messages::Column::IsRead, Expr::value(true))
        .filter(messages::Column::Sender.eq(sender))
        .filter(messages::Column::Receiver.eq(receiver))
        .filter(messages::Column::IsRead.eq(false))
        .exec(conn)
        .await
        .map_err(db_err)?;

    Ok(result.rows_affected)
}

fn between(a: &str, b: &str) -> Condition {
    Condition::any()
        .add(
            Condition::all()
                .add(messages::Column::Sender.eq(a))
                .add(messages::Column::Receiver.eq(b)),
        )
        .add(
            Condition::all()
                .add(messages::Column::Sender.eq(b))
                .add(messages::Column::Receiver.eq(a)),
        )
}

impl MessageRepoTrait for MessageRepository {
    async fn create_message(
        &self,
        input: NewMessage,
        attachments: Vec<NewAttachment>,
    ) -> Result<Message, ContentError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let message = messages::ActiveModel {
            id: NotSet,
            content: Set(input.content),
            sender: Set(input.sender),
            receiver: Set(input.receiver),
            created_at: Set(Utc::now().into()),
            is_read: Set(false),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        let attachments =
            insert_attachments(&txn, AttachmentOwner::Message(message.id), attachments).await?;

        txn.commit().await.map_err(db_err)?;

        Ok(message_to_domain(message, attachments))
    }

    async fn messages_involving(&self, user: &str) -> Result<Vec<Message>, ContentError> {
        let models = messages::Entity::find()
            .filter(
                Condition::any()
                    .add(messages::Column::Sender.eq(user))
                    .add(messages::Column::Receiver.eq(user)),
            )
            .order_by_asc(messages::Column::CreatedAt)
            .order_by_asc(messages::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        hydrate_messages(&self.db, models).await
    }

    async fn open_conversation(
        &self,
        user: &str,
        other: &str,
    ) -> Result<(Vec<Message>, u64), ContentError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let marked = mark_read_in(&txn, other, user).await?;

        let models = messages::Entity::find()
            .filter(between(user, other))
            .order_by_asc(messages::Column::CreatedAt)
            .order_by_asc(messages::Column::Id)
            .all(&txn)
            .await
            .map_err(db_err)?;
        let conversation = hydrate_messages(&txn, models).await?;

        txn.commit().await.map_err(db_err)?;

        Ok((conversation, marked))
    }

    async fn mark_read(&self, sender: &str, receiver: &str) -> Result<u64, ContentError> {
        mark_read_in(&self.db, sender, receiver).await
    }
}
