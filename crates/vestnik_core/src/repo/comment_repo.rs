//! Comment repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist reader comments and serve the per-news listing.
//!
//! # Invariants
//! - Listing order is deterministic: `created_at ASC, uuid ASC`.
//! - `news_uuid` and `author_uuid` never change; only `body` is mutable.
//! - Write paths call `Comment::validate()` before SQL mutations.

use crate::model::comment::{Comment, CommentId};
use crate::model::news::NewsId;
use crate::repo::{ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const COMMENT_SELECT_SQL: &str = "SELECT
    uuid,
    news_uuid,
    author_uuid,
    body,
    created_at
FROM comments";

/// Repository interface for comment records.
pub trait CommentRepository {
    /// Creates one comment and returns its stable id.
    fn insert(&self, comment: &Comment) -> RepoResult<CommentId>;
    /// Gets one comment by id.
    fn get(&self, id: CommentId) -> RepoResult<Option<Comment>>;
    /// Replaces the comment text.
    fn update_body(&self, id: CommentId, body: &str) -> RepoResult<()>;
    /// Removes one comment.
    fn delete(&self, id: CommentId) -> RepoResult<()>;
    /// Lists comments under one news item, oldest first.
    fn list_for_news(&self, news_uuid: NewsId) -> RepoResult<Vec<Comment>>;
    /// Counts all stored comments.
    fn count(&self) -> RepoResult<i64>;
}

/// SQLite-backed comment repository.
pub struct SqliteCommentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCommentRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            "comments",
            &["uuid", "news_uuid", "author_uuid", "body", "created_at"],
        )?;
        Ok(Self { conn })
    }
}

impl CommentRepository for SqliteCommentRepository<'_> {
    fn insert(&self, comment: &Comment) -> RepoResult<CommentId> {
        comment.validate()?;

        self.conn.execute(
            "INSERT INTO comments (uuid, news_uuid, author_uuid, body)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                comment.uuid.to_string(),
                comment.news_uuid.to_string(),
                comment.author_uuid.to_string(),
                comment.body.as_str(),
            ],
        )?;

        Ok(comment.uuid)
    }

    fn get(&self, id: CommentId) -> RepoResult<Option<Comment>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COMMENT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_comment_row(row)?));
        }
        Ok(None)
    }

    fn update_body(&self, id: CommentId, body: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE comments SET body = ?2 WHERE uuid = ?1;",
            params![id.to_string(), body],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn delete(&self, id: CommentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM comments WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn list_for_news(&self, news_uuid: NewsId) -> RepoResult<Vec<Comment>> {
        let mut stmt = self.conn.prepare(&format!(
            "{COMMENT_SELECT_SQL}
             WHERE news_uuid = ?1
             ORDER BY created_at ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([news_uuid.to_string()])?;
        let mut comments = Vec::new();
        while let Some(row) = rows.next()? {
            comments.push(parse_comment_row(row)?);
        }
        Ok(comments)
    }

    fn count(&self) -> RepoResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM comments;", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn parse_comment_row(row: &Row<'_>) -> RepoResult<Comment> {
    let uuid_text: String = row.get("uuid")?;
    let news_text: String = row.get("news_uuid")?;
    let author_text: String = row.get("author_uuid")?;
    let comment = Comment {
        uuid: parse_uuid(&uuid_text, "comments.uuid")?,
        news_uuid: parse_uuid(&news_text, "comments.news_uuid")?,
        author_uuid: parse_uuid(&author_text, "comments.author_uuid")?,
        body: row.get("body")?,
        created_at: row.get("created_at")?,
    };
    comment.validate()?;
    Ok(comment)
}
