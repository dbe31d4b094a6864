//! Use-case service facades over repositories and policy.
//!
//! # Responsibility
//! - Orchestrate the create/update/delete/read flows of both applications.
//! - Translate policy decisions and repository errors into one flow error
//!   taxonomy the web layer can map to responses.
//!
//! # Invariants
//! - A rejected flow persists nothing.
//! - Ownership denials surface as `NotFound`, never as a distinct
//!   "forbidden" outcome.

use crate::policy::access::AccessDecision;
use crate::policy::slug::SLUG_TAKEN_WARNING;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod comment_service;
pub mod news_service;
pub mod note_service;

pub type FlowResult<T> = Result<T, FlowError>;

/// One rejected form field with its user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Form field the message attaches to.
    pub field: &'static str,
    /// Exact message shown to the user.
    pub message: String,
}

/// Errors shared by all use-case flows.
#[derive(Debug)]
pub enum FlowError {
    /// The actor must sign in first.
    AuthRequired,
    /// The target does not exist for this actor.
    NotFound,
    /// The submission was rejected; nothing was persisted.
    Rejected(Vec<FieldError>),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for FlowError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthRequired => write!(f, "authentication required"),
            Self::NotFound => write!(f, "resource not found"),
            Self::Rejected(errors) => {
                write!(f, "submission rejected")?;
                for err in errors {
                    write!(f, "; {}: {}", err.field, err.message)?;
                }
                Ok(())
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for FlowError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::AuthRequired | Self::NotFound | Self::Rejected(_) => None,
        }
    }
}

impl From<RepoError> for FlowError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(_) => Self::NotFound,
            // Transactional backstop behind the resolver pre-check; both
            // reject the same way.
            RepoError::SlugTaken(slug) => Self::Rejected(vec![FieldError {
                field: "slug",
                message: format!("{slug}{SLUG_TAKEN_WARNING}"),
            }]),
            other => Self::Repo(other),
        }
    }
}

/// Maps an access decision to flow control.
pub(crate) fn gate(decision: AccessDecision) -> Result<(), FlowError> {
    match decision {
        AccessDecision::Allow => Ok(()),
        AccessDecision::RedirectToLogin => Err(FlowError::AuthRequired),
        AccessDecision::NotFound => Err(FlowError::NotFound),
    }
}
