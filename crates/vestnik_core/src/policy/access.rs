//! Access policy evaluator.
//!
//! # Responsibility
//! - Map `(actor, rule, owner)` to one allow/deny/redirect decision.
//!
//! # Invariants
//! - Pure function, no state and no I/O.
//! - Ownership denial is indistinguishable from a missing resource: the
//!   evaluator never produces a distinct "forbidden" outcome, so existence
//!   of other users' resources is not disclosed.

use crate::model::actor::{Actor, UserId};
use serde::{Deserialize, Serialize};

/// Access requirement attached to a route or operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessRule {
    /// Every actor, including anonymous, may proceed.
    Public,
    /// Any authenticated actor may proceed.
    Authenticated,
    /// Only the resource owner may proceed.
    Owner,
}

/// Outcome of one access evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessDecision {
    /// Proceed with the operation.
    Allow,
    /// Deny as if the resource did not exist.
    NotFound,
    /// Send the actor to the login page, preserving the requested path.
    RedirectToLogin,
}

/// Evaluates one access rule for one actor.
///
/// `owner` is the owner of the targeted resource, `None` when ownership is
/// unknown (missing resource). An unknown owner under the `Owner` rule
/// denies like any foreign resource.
pub fn evaluate(actor: &Actor, rule: AccessRule, owner: Option<UserId>) -> AccessDecision {
    if rule == AccessRule::Public {
        return AccessDecision::Allow;
    }

    let user_id = match actor.user_id() {
        Some(user_id) => user_id,
        None => return AccessDecision::RedirectToLogin,
    };

    match rule {
        AccessRule::Public | AccessRule::Authenticated => AccessDecision::Allow,
        AccessRule::Owner => {
            if owner == Some(user_id) {
                AccessDecision::Allow
            } else {
                AccessDecision::NotFound
            }
        }
    }
}
