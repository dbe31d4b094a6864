//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for users, news,
//!   comments and notes.
//! - Isolate SQLite query details from policy/service orchestration.
//!
//! # Invariants
//! - Repository writes enforce model `validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `SlugTaken`) in
//!   addition to DB transport errors.
//! - Every SQLite repository constructor verifies the connection is migrated
//!   and the tables it touches exist before accepting it.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::comment::CommentValidationError;
use crate::model::news::NewsValidationError;
use crate::model::note::NoteValidationError;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod comment_repo;
pub mod news_repo;
pub mod note_repo;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors shared by all persistence repositories.
#[derive(Debug)]
pub enum RepoError {
    /// Transport or bootstrap failure from the SQLite layer.
    Db(DbError),
    /// Target record does not exist.
    NotFound(Uuid),
    /// Another note already uses this slug.
    SlugTaken(String),
    /// Another user already uses this username.
    UsernameTaken(String),
    /// Note record failed invariant checks.
    NoteValidation(NoteValidationError),
    /// News record failed invariant checks.
    NewsValidation(NewsValidationError),
    /// Comment record failed invariant checks.
    CommentValidation(CommentValidationError),
    /// Connection has not been migrated to the current schema.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Migrated schema lacks a table this repository reads.
    MissingRequiredTable(&'static str),
    /// Migrated schema lacks a column this repository reads.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Stored row cannot be decoded into a read model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::SlugTaken(slug) => write!(f, "slug already in use: {slug}"),
            Self::UsernameTaken(username) => {
                write!(f, "username already in use: {username}")
            }
            Self::NoteValidation(err) => write!(f, "{err}"),
            Self::NewsValidation(err) => write!(f, "{err}"),
            Self::CommentValidation(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection is at schema version {actual_version}, repositories need {expected_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "schema has no `{table}` table")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "schema table `{table}` has no `{column}` column")
            }
            Self::InvalidData(message) => write!(f, "corrupt stored row: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NoteValidation(err) => Some(err),
            Self::NewsValidation(err) => Some(err),
            Self::CommentValidation(err) => Some(err),
            Self::NotFound(_)
            | Self::SlugTaken(_)
            | Self::UsernameTaken(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. }
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<NoteValidationError> for RepoError {
    fn from(value: NoteValidationError) -> Self {
        Self::NoteValidation(value)
    }
}

impl From<NewsValidationError> for RepoError {
    fn from(value: NewsValidationError) -> Self {
        Self::NewsValidation(value)
    }
}

impl From<CommentValidationError> for RepoError {
    fn from(value: CommentValidationError) -> Self {
        Self::CommentValidation(value)
    }
}

/// Verifies the connection is migrated and carries one required table.
///
/// Shared by every SQLite repository `try_new`.
fn ensure_connection_ready(
    conn: &Connection,
    table: &'static str,
    columns: &'static [&'static str],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    // pragma_table_info yields no rows for an unknown table, which doubles
    // as the existence check.
    let present = column_names(conn, table)?;
    if present.is_empty() {
        return Err(RepoError::MissingRequiredTable(table));
    }
    let absent = columns
        .iter()
        .copied()
        .find(|name| !present.iter().any(|have| have.as_str() == *name));
    if let Some(column) = absent {
        return Err(RepoError::MissingRequiredColumn { table, column });
    }

    Ok(())
}

fn column_names(conn: &Connection, table: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let names = stmt
        .query_map([table], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

fn parse_uuid(value: &str, location: &str) -> RepoResult<Uuid> {
    match Uuid::parse_str(value) {
        Ok(id) => Ok(id),
        Err(_) => Err(RepoError::InvalidData(format!(
            "uuid `{value}` in {location} does not parse"
        ))),
    }
}
