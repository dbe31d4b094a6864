//! User repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist registered users for ownership checks and seeding.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `username` stays unique; duplicates surface as `UsernameTaken`.
//! - The core never stores credentials, only identity rows.

use crate::model::actor::{User, UserId};
use crate::repo::{ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use rusqlite::{Connection, Row};
use uuid::Uuid;

const USER_SELECT_SQL: &str = "SELECT
    uuid,
    username,
    created_at
FROM users";

/// Repository interface for user records.
pub trait UserRepository {
    /// Creates one user and returns the stored row.
    fn create(&self, username: &str) -> RepoResult<User>;
    /// Gets one user by id.
    fn get(&self, id: UserId) -> RepoResult<Option<User>>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "users", &["uuid", "username", "created_at"])?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create(&self, username: &str) -> RepoResult<User> {
        let uuid = Uuid::new_v4();
        let inserted = self.conn.execute(
            "INSERT INTO users (uuid, username) VALUES (?1, ?2);",
            [uuid.to_string(), username.to_string()],
        );

        if let Err(err) = inserted {
            if is_unique_violation(&err, "users.username") {
                return Err(RepoError::UsernameTaken(username.to_string()));
            }
            return Err(err.into());
        }

        match self.get(uuid)? {
            Some(user) => Ok(user),
            None => Err(RepoError::NotFound(uuid)),
        }
    }

    fn get(&self, id: UserId) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let uuid_text: String = row.get("uuid")?;
    Ok(User {
        uuid: parse_uuid(&uuid_text, "users.uuid")?,
        username: row.get("username")?,
        created_at: row.get("created_at")?,
    })
}

pub(crate) fn is_unique_violation(err: &rusqlite::Error, needle: &str) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, Some(message)) => {
            failure.code == rusqlite::ErrorCode::ConstraintViolation && message.contains(needle)
        }
        _ => false,
    }
}
