//! Outbound response model.
//!
//! # Responsibility
//! - Carry the closed outcome set of a dispatch: render, redirect or
//!   not-found, plus the render context keys templates consume.
//!
//! # Invariants
//! - The context key set is closed: `object_list`, `form`, `news`.
//! - `NotFound` covers both missing resources and ownership denials.

use crate::model::news::NewsItem;
use crate::model::note::Note;
use crate::service::news_service::NewsDetail;
use crate::service::FieldError;

/// Renderable pages and their template paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    NewsHome,
    NewsDetail,
    CommentEdit,
    CommentDelete,
    NotesHome,
    NotesList,
    NoteDetail,
    NoteForm,
    NoteDelete,
    NotesSuccess,
    Login,
    Logout,
    Signup,
}

impl Page {
    /// Template path the embedding framework renders for this page.
    pub fn template(&self) -> &'static str {
        match self {
            Self::NewsHome => "news/home.html",
            Self::NewsDetail => "news/detail.html",
            Self::CommentEdit => "news/edit.html",
            Self::CommentDelete => "news/delete.html",
            Self::NotesHome => "notes/home.html",
            Self::NotesList => "notes/list.html",
            Self::NoteDetail => "notes/detail.html",
            Self::NoteForm => "notes/form.html",
            Self::NoteDelete => "notes/delete.html",
            Self::NotesSuccess => "notes/success.html",
            Self::Login => "registration/login.html",
            Self::Logout => "registration/logout.html",
            Self::Signup => "registration/signup.html",
        }
    }
}

/// Which form a form context renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Note,
    Comment,
}

/// Form state shown on a rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormContext {
    pub kind: FormKind,
    /// Field-attached errors; empty on a fresh form.
    pub errors: Vec<FieldError>,
}

impl FormContext {
    /// A fresh form with no errors.
    pub fn fresh(kind: FormKind) -> Self {
        Self {
            kind,
            errors: Vec::new(),
        }
    }

    /// A re-rendered form carrying rejection messages.
    pub fn rejected(kind: FormKind, errors: Vec<FieldError>) -> Self {
        Self { kind, errors }
    }
}

/// Listing payload under the `object_list` context key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectList {
    News(Vec<NewsItem>),
    Notes(Vec<Note>),
}

/// Context a rendered page receives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderContext {
    pub object_list: Option<ObjectList>,
    pub form: Option<FormContext>,
    pub news: Option<NewsDetail>,
}

/// One dispatch outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Render `page` with `context`, HTTP 200.
    Render { page: Page, context: RenderContext },
    /// HTTP 302 to `location`.
    Redirect { location: String },
    /// HTTP 404; also covers ownership denials.
    NotFound,
}

impl Response {
    /// Renders a page with an empty context.
    pub fn page(page: Page) -> Self {
        Self::Render {
            page,
            context: RenderContext::default(),
        }
    }

    /// HTTP status the embedding framework sends for this response.
    pub fn status(&self) -> u16 {
        match self {
            Self::Render { .. } => 200,
            Self::Redirect { .. } => 302,
            Self::NotFound => 404,
        }
    }
}
