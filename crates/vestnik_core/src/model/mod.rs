//! Domain model for the news board and personal notes applications.
//!
//! # Responsibility
//! - Define the canonical records shared by repositories, policy functions
//!   and the web dispatch layer.
//! - Keep per-record invariants (stable ids, slug shape) in one place.
//!
//! # Invariants
//! - Every persisted record is identified by a non-nil UUID v4.
//! - A record's author never changes after creation.

pub mod actor;
pub mod comment;
pub mod news;
pub mod note;
