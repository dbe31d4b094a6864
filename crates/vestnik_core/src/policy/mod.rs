//! Pure rule engine: access decisions, content screening, slug derivation.
//!
//! # Responsibility
//! - Decide who may see or mutate a resource.
//! - Screen submitted text against the banned-word list.
//! - Derive and validate unique URL slugs for notes.
//!
//! # Invariants
//! - Policy functions hold no connection state; persistence enters only
//!   through narrow read-only traits (`SlugIndex`).

pub mod access;
pub mod content;
pub mod slug;
