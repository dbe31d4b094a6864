//! Core domain logic for Vestnik.
//! Access rules, content filtering, slugs and visibility all live here;
//! front ends embed this crate instead of re-deriving any of it.

pub mod db;
pub mod logging;
pub mod model;
pub mod policy;
pub mod repo;
pub mod service;
pub mod web;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::actor::{Actor, User, UserId};
pub use model::comment::{Comment, CommentId};
pub use model::news::{NewsId, NewsItem};
pub use model::note::{Note, NoteId};
pub use policy::access::{AccessDecision, AccessRule};
pub use policy::content::ContentFilter;
pub use policy::slug::slugify;
pub use repo::{RepoError, RepoResult};
pub use service::comment_service::CommentService;
pub use service::news_service::{NewsConfig, NewsService};
pub use service::note_service::NoteService;
pub use web::request::{FormData, Method, Request};
pub use web::response::Response;

/// Liveness probe used by the smoke binary.
pub fn ping() -> &'static str {
    "pong"
}

/// Crate version baked in at compile time.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn probe_answers_with_pong_and_a_version() {
        assert_eq!(ping(), "pong");
        assert!(!core_version().is_empty());
    }
}
