//! Comment use-case service.
//!
//! # Responsibility
//! - Provide the create/update/delete/read flows for news comments.
//! - Run the content filter over every submitted body.
//!
//! # Invariants
//! - Creation requires an existing news item and an authenticated actor.
//! - Mutation and owner reads are gated by the access evaluator; foreign
//!   comments deny as missing.
//! - A banned-word rejection attaches the fixed warning to the `body`
//!   field and persists nothing.

use crate::model::actor::Actor;
use crate::model::comment::{Comment, CommentId};
use crate::model::news::NewsId;
use crate::policy::access::{evaluate, AccessRule};
use crate::policy::content::{ContentFilter, COMMENT_WARNING};
use crate::repo::comment_repo::CommentRepository;
use crate::repo::news_repo::NewsRepository;
use crate::repo::RepoError;
use crate::service::{gate, FieldError, FlowError, FlowResult};

/// Comment service facade over repository implementations.
pub struct CommentService<C: CommentRepository, N: NewsRepository> {
    comments: C,
    news: N,
    filter: ContentFilter,
}

impl<C: CommentRepository, N: NewsRepository> CommentService<C, N> {
    /// Creates a service with the default banned-word filter.
    pub fn new(comments: C, news: N) -> Self {
        Self {
            comments,
            news,
            filter: ContentFilter::default(),
        }
    }

    /// Creates one comment under an existing news item.
    pub fn create(&self, actor: &Actor, news_uuid: NewsId, body: &str) -> FlowResult<Comment> {
        gate(evaluate(actor, AccessRule::Authenticated, None))?;
        let author = actor.user_id().ok_or(FlowError::AuthRequired)?;

        let news = self.news.get(news_uuid)?.ok_or(FlowError::NotFound)?;
        check_body(&self.filter, body)?;

        let comment = Comment::new(news.uuid, author, body);
        self.comments.insert(&comment)?;
        self.read_back(comment.uuid)
    }

    /// Replaces the body of the actor's comment.
    pub fn update(&self, actor: &Actor, comment_uuid: CommentId, body: &str) -> FlowResult<Comment> {
        let existing = self.get_for(actor, comment_uuid)?;
        check_body(&self.filter, body)?;

        self.comments.update_body(existing.uuid, body)?;
        self.read_back(existing.uuid)
    }

    /// Removes the actor's comment; returns it for redirect targeting.
    pub fn delete(&self, actor: &Actor, comment_uuid: CommentId) -> FlowResult<Comment> {
        let existing = self.get_for(actor, comment_uuid)?;
        self.comments.delete(existing.uuid)?;
        Ok(existing)
    }

    /// Gets one comment, visible to its author only.
    pub fn get_for(&self, actor: &Actor, comment_uuid: CommentId) -> FlowResult<Comment> {
        gate(evaluate(actor, AccessRule::Authenticated, None))?;
        let comment = self
            .comments
            .get(comment_uuid)?
            .ok_or(FlowError::NotFound)?;
        gate(evaluate(actor, AccessRule::Owner, Some(comment.author_uuid)))?;
        Ok(comment)
    }

    fn read_back(&self, comment_uuid: CommentId) -> FlowResult<Comment> {
        match self.comments.get(comment_uuid)? {
            Some(comment) => Ok(comment),
            None => Err(FlowError::Repo(RepoError::InvalidData(format!(
                "written comment `{comment_uuid}` missing in read-back"
            )))),
        }
    }
}

fn check_body(filter: &ContentFilter, body: &str) -> Result<(), FlowError> {
    if filter.check(body).is_err() {
        return Err(FlowError::Rejected(vec![FieldError {
            field: "body",
            message: COMMENT_WARNING.to_string(),
        }]));
    }
    Ok(())
}
