//! Typed request/response surface for both applications.
//!
//! # Responsibility
//! - Model the HTTP-like boundary as in-memory values: an external web
//!   framework adapts real HTTP to [`request::Request`] and renders
//!   [`response::Response`] back out.
//! - Dispatch resolved routes to services and map flow errors to responses.
//!
//! # Invariants
//! - Policy outcomes (login redirect, not-found, form re-render) are
//!   returned as `Ok(Response)`; only infrastructure failures become `Err`.
//! - Redirect locations are produced through route reversal.

use crate::model::actor::Actor;
use crate::policy::access::{evaluate, AccessDecision, AccessRule};
use crate::repo::RepoError;
use response::Response;
use routes::login_redirect;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod news_app;
pub mod notes_app;
pub mod request;
pub mod response;
pub mod routes;

pub type AppResult<T> = Result<T, AppError>;

/// Infrastructure failures escaping a dispatch.
#[derive(Debug)]
pub enum AppError {
    /// Persistence-layer failure.
    Repo(RepoError),
    /// A redirect target could not be reversed from the route table.
    Route(&'static str),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Route(name) => write!(f, "route `{name}` cannot be reversed"),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Route(_) => None,
        }
    }
}

impl From<RepoError> for AppError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// The login redirect for one denied request.
pub(crate) fn login_redirect_response(path: &str) -> Response {
    Response::Redirect {
        location: login_redirect(path),
    }
}

/// Applies a route's table rule before any handler runs.
///
/// `Owner` rules are resolved later against the loaded resource; every
/// other rule is decided here, for GET and POST alike.
pub(crate) fn gate_route(actor: &Actor, rule: AccessRule, path: &str) -> Option<Response> {
    if rule == AccessRule::Owner {
        return None;
    }
    match evaluate(actor, rule, None) {
        AccessDecision::Allow => None,
        AccessDecision::RedirectToLogin => Some(login_redirect_response(path)),
        AccessDecision::NotFound => Some(Response::NotFound),
    }
}
