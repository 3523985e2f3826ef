//! Attachment repository for download lookups.

use sea_orm::{DatabaseConnection, EntityTrait};

use super::hydrate::{attachment_to_domain, db_err};
use crate::entities::attachments;
use clubhouse_core::content::{
    Attachment, AttachmentRepository as AttachmentRepoTrait, ContentError,
};

/// Attachment repository implementation.
#[derive(Debug, Clone)]
pub struct AttachmentRepository {
    db: DatabaseConnection,
}

impl AttachmentRepository {
    /// Create a new attachment repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl AttachmentRepoTrait for AttachmentRepository {
    async fn find_attachment(&self, id: i32) -> Result<Option<Attachment>, ContentError> {
        attachments::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(attachment_to_domain)
            .transpose()
    }
}
