//! News domain model.
//!
//! # Responsibility
//! - Define the publicly readable news record.
//!
//! # Invariants
//! - `uuid` is stable and never nil.
//! - `published_at` drives front-page ordering and is supplied by the
//!   caller, not by storage.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a news record.
pub type NewsId = Uuid;

/// Published news item, readable by anyone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    /// Stable global id.
    pub uuid: NewsId,
    /// Headline shown in listings.
    pub title: String,
    /// Article text.
    pub body: String,
    /// Epoch-ms publication timestamp; newest first on the front page.
    pub published_at: i64,
    /// Epoch-ms creation timestamp, assigned by storage.
    pub created_at: i64,
}

impl NewsItem {
    /// Creates a news item with a generated stable id.
    pub fn new(title: impl Into<String>, body: impl Into<String>, published_at: i64) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            title: title.into(),
            body: body.into(),
            published_at,
            created_at: 0,
        }
    }

    /// Checks record invariants prior to persistence.
    pub fn validate(&self) -> Result<(), NewsValidationError> {
        if self.uuid.is_nil() {
            return Err(NewsValidationError::NilUuid);
        }
        Ok(())
    }
}

/// Validation failures for news records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewsValidationError {
    NilUuid,
}

impl Display for NewsValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilUuid => write!(f, "news uuid must not be nil"),
        }
    }
}

impl Error for NewsValidationError {}

#[cfg(test)]
mod tests {
    use super::{NewsItem, NewsValidationError};
    use uuid::Uuid;

    #[test]
    fn new_item_passes_validation() {
        let item = NewsItem::new("Снег", "Выпал снег.", 1_700_000_000_000);
        assert!(!item.uuid.is_nil());
        item.validate().unwrap();
    }

    #[test]
    fn validate_rejects_nil_uuid() {
        let mut item = NewsItem::new("t", "b", 0);
        item.uuid = Uuid::nil();
        assert_eq!(item.validate(), Err(NewsValidationError::NilUuid));
    }
}
