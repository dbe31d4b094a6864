//! Note use-case service.
//!
//! # Responsibility
//! - Provide the create/update/delete/read/list flows for personal notes.
//! - Run the slug resolver on every write.
//!
//! # Invariants
//! - Every flow is gated by the access evaluator; anonymous actors never
//!   reach the repository.
//! - A listing only ever contains notes owned by the requesting actor.
//! - Slug rejections surface as a `slug` field error with the exact
//!   user-facing message; nothing is persisted.

use crate::model::actor::Actor;
use crate::model::note::Note;
use crate::policy::access::{evaluate, AccessRule};
use crate::policy::slug::{self, SlugResolveError};
use crate::repo::note_repo::NoteRepository;
use crate::repo::RepoError;
use crate::service::{gate, FieldError, FlowError, FlowResult};

/// Submitted note form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteInput {
    pub title: String,
    pub body: String,
    /// Explicit slug; empty or absent means "derive from title".
    pub slug: Option<String>,
}

/// Note service facade over a repository implementation.
pub struct NoteService<R: NoteRepository> {
    repo: R,
}

impl<R: NoteRepository> NoteService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one note owned by the actor.
    pub fn create(&mut self, actor: &Actor, input: &NoteInput) -> FlowResult<Note> {
        gate(evaluate(actor, AccessRule::Authenticated, None))?;
        let author = actor.user_id().ok_or(FlowError::AuthRequired)?;

        let slug = resolve_slug(&self.repo, input, None)?;
        let note = Note::new(input.title.clone(), input.body.clone(), slug, author);
        self.repo.insert_if_slug_unique(&note)?;
        read_back(&self.repo, &note.slug)
    }

    /// Replaces title, body and slug of the actor's note.
    pub fn update(&mut self, actor: &Actor, slug: &str, input: &NoteInput) -> FlowResult<Note> {
        let existing = self.get_for(actor, slug)?;

        let new_slug = resolve_slug(&self.repo, input, Some(&existing))?;
        let mut updated = existing;
        updated.title = input.title.clone();
        updated.body = input.body.clone();
        updated.slug = new_slug;
        self.repo.update_if_slug_unique(&updated)?;
        read_back(&self.repo, &updated.slug)
    }

    /// Removes the actor's note.
    pub fn delete(&mut self, actor: &Actor, slug: &str) -> FlowResult<()> {
        let note = self.get_for(actor, slug)?;
        self.repo.delete(note.uuid)?;
        Ok(())
    }

    /// Gets one note, visible to its owner only.
    pub fn get_for(&self, actor: &Actor, slug: &str) -> FlowResult<Note> {
        gate(evaluate(actor, AccessRule::Authenticated, None))?;
        let note = self.repo.get_by_slug(slug)?.ok_or(FlowError::NotFound)?;
        gate(evaluate(actor, AccessRule::Owner, Some(note.author_uuid)))?;
        Ok(note)
    }

    /// Lists the actor's own notes, oldest first.
    pub fn list_notes(&self, actor: &Actor) -> FlowResult<Vec<Note>> {
        gate(evaluate(actor, AccessRule::Authenticated, None))?;
        let owner = actor.user_id().ok_or(FlowError::AuthRequired)?;
        Ok(self.repo.find_by_owner(owner)?)
    }
}

fn resolve_slug<R: NoteRepository>(
    repo: &R,
    input: &NoteInput,
    existing: Option<&Note>,
) -> FlowResult<String> {
    let exclude = existing.map(|note| note.uuid);
    match slug::resolve(repo, input.slug.as_deref(), &input.title, exclude) {
        Ok(slug) => Ok(slug),
        Err(SlugResolveError::Repo(err)) => Err(err.into()),
        Err(err) => Err(FlowError::Rejected(vec![FieldError {
            field: "slug",
            message: err.to_string(),
        }])),
    }
}

fn read_back<R: NoteRepository>(repo: &R, slug: &str) -> FlowResult<Note> {
    match repo.get_by_slug(slug)? {
        Some(note) => Ok(note),
        None => Err(FlowError::Repo(RepoError::InvalidData(format!(
            "written note `{slug}` missing in read-back"
        )))),
    }
}
