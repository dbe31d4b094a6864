//! Note repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist personal notes addressed by unique slugs.
//! - Own slug-uniqueness enforcement with atomic check-then-write semantics.
//!
//! # Invariants
//! - `slug` stays unique across all notes; collisions surface as `SlugTaken`
//!   and leave the store untouched.
//! - Uniqueness check and write run inside one immediate transaction.
//! - Owner listing is deterministic: `created_at ASC, uuid ASC`.
//! - `author_uuid` never changes; updates replace title, body and slug only.

use crate::model::actor::UserId;
use crate::model::note::{Note, NoteId};
use crate::repo::{ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row, TransactionBehavior};

const NOTE_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    body,
    slug,
    author_uuid,
    created_at,
    updated_at
FROM notes";

/// Read-only probe for slug availability.
///
/// Split out of [`NoteRepository`] so the slug resolver can be exercised
/// against lightweight fakes.
pub trait SlugIndex {
    /// Returns whether `slug` is already used by a note other than `exclude`.
    fn slug_exists(&self, slug: &str, exclude: Option<NoteId>) -> RepoResult<bool>;
}

/// Repository interface for note records.
pub trait NoteRepository: SlugIndex {
    /// Creates one note if its slug is free, all-or-nothing.
    fn insert_if_slug_unique(&mut self, note: &Note) -> RepoResult<NoteId>;
    /// Replaces title, body and slug of one note if the slug stays free.
    fn update_if_slug_unique(&mut self, note: &Note) -> RepoResult<()>;
    /// Gets one note by slug.
    fn get_by_slug(&self, slug: &str) -> RepoResult<Option<Note>>;
    /// Lists all notes of one owner, oldest first.
    fn find_by_owner(&self, owner: UserId) -> RepoResult<Vec<Note>>;
    /// Removes one note.
    fn delete(&self, id: NoteId) -> RepoResult<()>;
    /// Counts all stored notes.
    fn count(&self) -> RepoResult<i64>;
}

/// SQLite-backed note repository.
///
/// Holds a mutable connection because slug-unique writes need transactions.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            "notes",
            &[
                "uuid",
                "title",
                "body",
                "slug",
                "author_uuid",
                "created_at",
                "updated_at",
            ],
        )?;
        Ok(Self { conn })
    }
}

impl SlugIndex for SqliteNoteRepository<'_> {
    fn slug_exists(&self, slug: &str, exclude: Option<NoteId>) -> RepoResult<bool> {
        slug_in_use(self.conn, slug, exclude)
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn insert_if_slug_unique(&mut self, note: &Note) -> RepoResult<NoteId> {
        note.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if slug_in_use(&tx, &note.slug, None)? {
            return Err(RepoError::SlugTaken(note.slug.clone()));
        }

        tx.execute(
            "INSERT INTO notes (uuid, title, body, slug, author_uuid)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                note.uuid.to_string(),
                note.title.as_str(),
                note.body.as_str(),
                note.slug.as_str(),
                note.author_uuid.to_string(),
            ],
        )?;
        tx.commit()?;

        Ok(note.uuid)
    }

    fn update_if_slug_unique(&mut self, note: &Note) -> RepoResult<()> {
        note.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if slug_in_use(&tx, &note.slug, Some(note.uuid))? {
            return Err(RepoError::SlugTaken(note.slug.clone()));
        }

        let changed = tx.execute(
            "UPDATE notes
             SET
                title = ?2,
                body = ?3,
                slug = ?4,
                updated_at = (CAST((julianday('now') - 2440587.5) * 86400000.0 AS INTEGER))
             WHERE uuid = ?1;",
            params![
                note.uuid.to_string(),
                note.title.as_str(),
                note.body.as_str(),
                note.slug.as_str(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(note.uuid));
        }

        tx.commit()?;
        Ok(())
    }

    fn get_by_slug(&self, slug: &str) -> RepoResult<Option<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} WHERE slug = ?1;"))?;
        let mut rows = stmt.query([slug])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_note_row(row)?));
        }
        Ok(None)
    }

    fn find_by_owner(&self, owner: UserId) -> RepoResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL}
             WHERE author_uuid = ?1
             ORDER BY created_at ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([owner.to_string()])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn delete(&self, id: NoteId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn count(&self) -> RepoResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM notes;", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn slug_in_use(conn: &Connection, slug: &str, exclude: Option<NoteId>) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM notes
            WHERE slug = ?1
              AND (?2 IS NULL OR uuid <> ?2)
        );",
        params![slug, exclude.map(|id| id.to_string())],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let uuid_text: String = row.get("uuid")?;
    let author_text: String = row.get("author_uuid")?;
    let note = Note {
        uuid: parse_uuid(&uuid_text, "notes.uuid")?,
        title: row.get("title")?,
        body: row.get("body")?,
        slug: row.get("slug")?,
        author_uuid: parse_uuid(&author_text, "notes.author_uuid")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    note.validate()?;
    Ok(note)
}
