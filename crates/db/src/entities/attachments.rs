//! `SeaORM` Entity for attachments table.
//!
//! Exactly one of `post_id`, `comment_id` and `message_id` is set. Local
//! blobs carry `file_path`; remote blobs carry `remote_object_id` and
//! `remote_view_url`. Both rules are also enforced by CHECK constraints.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "attachments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub filename: String,
    pub file_type: Option<String>,
    pub file_size: i64,
    pub uploaded_at: DateTimeWithTimeZone,
    pub storage_backend: String,
    pub file_path: Option<String>,
    pub remote_object_id: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub remote_view_url: Option<String>,
    pub post_id: Option<i32>,
    pub comment_id: Option<i32>,
    pub message_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::posts::Entity",
        from = "Column::PostId",
        to = "super::posts::Column::Id",
        on_delete = "Cascade"
    )]
    Posts,
    #[sea_orm(
        belongs_to = "super::comments::Entity",
        from = "Column::CommentId",
        to = "super::comments::Column::Id",
        on_delete = "Cascade"
    )]
    Comments,
    #[sea_orm(
        belongs_to = "super::messages::Entity",
        from = "Column::MessageId",
        to = "super::messages::Column::Id",
        on_delete = "Cascade"
    )]
    Messages,
}

impl Related<super::posts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl Related<super::comments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl Related<super::messages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Messages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
