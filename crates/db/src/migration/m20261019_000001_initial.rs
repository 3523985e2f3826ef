//! Initial schema: posts, comments, direct messages and attachments.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(SCHEMA_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS attachments, messages, comments, posts CASCADE;",
        )
        .await?;
        Ok(())
    }
}

const SCHEMA_SQL: &str = r"
-- ============================================================
-- BULLETIN BOARD
-- ============================================================
CREATE TABLE posts (
    id SERIAL PRIMARY KEY,
    content TEXT NOT NULL,
    author VARCHAR(100) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_post_content CHECK (length(btrim(content)) > 0),
    CONSTRAINT chk_post_author CHECK (length(btrim(author)) > 0)
);

CREATE INDEX idx_posts_created_at ON posts(created_at DESC);

CREATE TABLE comments (
    id SERIAL PRIMARY KEY,
    content TEXT NOT NULL,
    author VARCHAR(100) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    post_id INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
    CONSTRAINT chk_comment_content CHECK (length(btrim(content)) > 0),
    CONSTRAINT chk_comment_author CHECK (length(btrim(author)) > 0)
);

CREATE INDEX idx_comments_post ON comments(post_id, created_at);

-- ============================================================
-- DIRECT MESSAGES
-- ============================================================
CREATE TABLE messages (
    id SERIAL PRIMARY KEY,
    content TEXT NOT NULL,
    sender VARCHAR(100) NOT NULL,
    receiver VARCHAR(100) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    is_read BOOLEAN NOT NULL DEFAULT false,
    CONSTRAINT chk_message_content CHECK (length(btrim(content)) > 0)
);

CREATE INDEX idx_messages_sender ON messages(sender, created_at DESC);
CREATE INDEX idx_messages_receiver ON messages(receiver, created_at DESC);
CREATE INDEX idx_messages_unread ON messages(sender, receiver) WHERE NOT is_read;

-- ============================================================
-- ATTACHMENTS
-- ============================================================
CREATE TABLE attachments (
    id SERIAL PRIMARY KEY,
    filename VARCHAR(255) NOT NULL,
    file_type VARCHAR(255),
    file_size BIGINT NOT NULL,
    uploaded_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    storage_backend VARCHAR(16) NOT NULL DEFAULT 'local',
    file_path VARCHAR(512),
    remote_object_id VARCHAR(512),
    remote_view_url TEXT,
    post_id INTEGER REFERENCES posts(id) ON DELETE CASCADE,
    comment_id INTEGER REFERENCES comments(id) ON DELETE CASCADE,
    message_id INTEGER REFERENCES messages(id) ON DELETE CASCADE,

    CONSTRAINT chk_attachment_single_owner
        CHECK (num_nonnulls(post_id, comment_id, message_id) = 1),
    CONSTRAINT chk_attachment_backend
        CHECK (storage_backend IN ('local', 'remote')),
    CONSTRAINT chk_attachment_locator CHECK (
        (storage_backend = 'local' AND file_path IS NOT NULL)
        OR (storage_backend = 'remote'
            AND remote_object_id IS NOT NULL
            AND remote_view_url IS NOT NULL)
    ),
    CONSTRAINT chk_attachment_size CHECK (file_size >= 0)
);

CREATE INDEX idx_attachments_post ON attachments(post_id) WHERE post_id IS NOT NULL;
CREATE INDEX idx_attachments_comment ON attachments(comment_id) WHERE comment_id IS NOT NULL;
CREATE INDEX idx_attachments_message ON attachments(message_id) WHERE message_id IS NOT NULL;
";
