//! Comment domain model.
//!
//! # Responsibility
//! - Define a reader comment attached to one news item.
//!
//! # Invariants
//! - `uuid`, `news_uuid` and `author_uuid` are never nil.
//! - A comment always belongs to exactly one news item and one author;
//!   neither link changes after creation.

use crate::model::actor::UserId;
use crate::model::news::NewsId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a comment record.
pub type CommentId = Uuid;

/// Reader comment below a news item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Stable global id.
    pub uuid: CommentId,
    /// News item the comment hangs off.
    pub news_uuid: NewsId,
    /// Comment author; only this user may edit or delete it.
    pub author_uuid: UserId,
    /// Comment text, subject to the banned-word filter.
    pub body: String,
    /// Epoch-ms creation timestamp, assigned by storage.
    pub created_at: i64,
}

impl Comment {
    /// Creates a comment with a generated stable id.
    pub fn new(news_uuid: NewsId, author_uuid: UserId, body: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            news_uuid,
            author_uuid,
            body: body.into(),
            created_at: 0,
        }
    }

    /// Checks record invariants prior to persistence.
    pub fn validate(&self) -> Result<(), CommentValidationError> {
        if self.uuid.is_nil() {
            return Err(CommentValidationError::NilUuid);
        }
        if self.news_uuid.is_nil() {
            return Err(CommentValidationError::NilNews);
        }
        if self.author_uuid.is_nil() {
            return Err(CommentValidationError::NilAuthor);
        }
        Ok(())
    }
}

/// Validation failures for comment records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentValidationError {
    NilUuid,
    NilNews,
    NilAuthor,
}

impl Display for CommentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilUuid => write!(f, "comment uuid must not be nil"),
            Self::NilNews => write!(f, "comment news uuid must not be nil"),
            Self::NilAuthor => write!(f, "comment author uuid must not be nil"),
        }
    }
}

impl Error for CommentValidationError {}
