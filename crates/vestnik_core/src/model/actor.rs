//! Request identity model.
//!
//! # Responsibility
//! - Represent who issued a request: a registered user or nobody.
//! - Keep the distinction explicit so policy code can never forget the
//!   anonymous case.
//!
//! # Invariants
//! - `Actor::Authenticated` always wraps the uuid of an existing user row;
//!   the embedding framework resolves sessions before building a request.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a registered user.
pub type UserId = Uuid;

/// Registered author record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable global id.
    pub uuid: UserId,
    /// Unique display name.
    pub username: String,
    /// Epoch-ms creation timestamp, assigned by storage.
    pub created_at: i64,
}

/// The identity attached to one inbound request.
///
/// The anonymous actor is a distinguished value, not a user with an empty
/// id, so exhaustive matches keep authentication checks honest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    /// No authenticated session.
    Anonymous,
    /// Authenticated user identified by uuid.
    Authenticated(UserId),
}

impl Actor {
    /// Builds an authenticated actor for an existing user.
    pub fn authenticated(user: UserId) -> Self {
        Self::Authenticated(user)
    }

    /// Returns whether this actor carries no identity.
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }

    /// Returns the user id for authenticated actors.
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(id) => Some(*id),
        }
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self::Authenticated(user.uuid)
    }
}
