//! Note domain model.
//!
//! # Responsibility
//! - Define the note record addressed publicly by its slug.
//! - Enforce the slug shape invariant before anything reaches storage.
//!
//! # Invariants
//! - `uuid` is stable and never nil.
//! - `slug` is non-empty, at most [`NOTE_SLUG_MAX_LEN`] bytes, and drawn
//!   from `[A-Za-z0-9_-]` only.
//! - `author_uuid` never changes after creation.

use crate::model::actor::UserId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a note record.
pub type NoteId = Uuid;

/// Maximum slug length in bytes.
pub const NOTE_SLUG_MAX_LEN: usize = 100;

/// Personal note owned by exactly one author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Stable global id.
    pub uuid: NoteId,
    /// Short human title.
    pub title: String,
    /// Free-form note text.
    pub body: String,
    /// Unique URL-safe identifier, see [`crate::policy::slug`].
    pub slug: String,
    /// Owning user; fixed for the lifetime of the note.
    pub author_uuid: UserId,
    /// Epoch-ms creation timestamp, assigned by storage.
    pub created_at: i64,
    /// Epoch-ms update timestamp, assigned by storage.
    pub updated_at: i64,
}

impl Note {
    /// Creates a note with a generated stable id.
    ///
    /// Timestamps start at zero and are assigned by the storage layer on
    /// insert; the caller-provided slug must already be resolved.
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        slug: impl Into<String>,
        author_uuid: UserId,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            title: title.into(),
            body: body.into(),
            slug: slug.into(),
            author_uuid,
            created_at: 0,
            updated_at: 0,
        }
    }

    /// Checks record invariants prior to persistence.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.uuid.is_nil() {
            return Err(NoteValidationError::NilUuid);
        }
        if self.author_uuid.is_nil() {
            return Err(NoteValidationError::NilAuthor);
        }
        validate_slug(&self.slug)
    }
}

/// Checks the slug shape invariant on its own.
///
/// Shared by [`Note::validate`] and the slug resolver, which must reject a
/// malformed requested slug before probing uniqueness.
pub fn validate_slug(slug: &str) -> Result<(), NoteValidationError> {
    if slug.is_empty() {
        return Err(NoteValidationError::EmptySlug);
    }
    if slug.len() > NOTE_SLUG_MAX_LEN {
        return Err(NoteValidationError::SlugTooLong { length: slug.len() });
    }
    for ch in slug.chars() {
        if !(ch.is_ascii_alphanumeric() || ch == '-' || ch == '_') {
            return Err(NoteValidationError::SlugInvalidChar { ch });
        }
    }
    Ok(())
}

/// Validation failures for note records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteValidationError {
    NilUuid,
    NilAuthor,
    EmptySlug,
    SlugTooLong { length: usize },
    SlugInvalidChar { ch: char },
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilUuid => write!(f, "note uuid must not be nil"),
            Self::NilAuthor => write!(f, "note author uuid must not be nil"),
            Self::EmptySlug => write!(f, "note slug must not be empty"),
            Self::SlugTooLong { length } => write!(
                f,
                "note slug length {length} exceeds maximum {NOTE_SLUG_MAX_LEN}"
            ),
            Self::SlugInvalidChar { ch } => {
                write!(f, "note slug contains unsupported character `{ch}`")
            }
        }
    }
}

impl Error for NoteValidationError {}
