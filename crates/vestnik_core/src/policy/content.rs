//! Banned-word content filter.
//!
//! # Responsibility
//! - Screen submitted comment text before anything is persisted.
//!
//! # Invariants
//! - Matching is case-sensitive substring containment.
//! - A single hit rejects the whole submission; the stored data stays
//!   untouched and the fixed warning is attached to the `body` field.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Words that may not appear in submitted text.
pub const BANNED_WORDS: [&str; 2] = ["редиска", "негодяй"];

/// Warning attached to the `body` field of a rejected submission.
pub const COMMENT_WARNING: &str = "Не ругайтесь!";

/// Substring filter over a fixed banned-word list.
#[derive(Debug, Clone)]
pub struct ContentFilter {
    banned: Vec<String>,
}

impl Default for ContentFilter {
    fn default() -> Self {
        Self::new(BANNED_WORDS.iter().map(|word| word.to_string()).collect())
    }
}

impl ContentFilter {
    /// Builds a filter over a caller-supplied banned list.
    pub fn new(banned: Vec<String>) -> Self {
        Self { banned }
    }

    /// Accepts clean text, rejects text containing any banned word.
    pub fn check(&self, text: &str) -> Result<(), ContentViolation> {
        for word in &self.banned {
            if text.contains(word.as_str()) {
                return Err(ContentViolation { word: word.clone() });
            }
        }
        Ok(())
    }
}

/// One banned word found in submitted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentViolation {
    /// The first banned word that matched.
    pub word: String,
}

impl Display for ContentViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "submitted text contains banned word `{}`", self.word)
    }
}

impl Error for ContentViolation {}
