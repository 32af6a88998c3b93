use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

// --- Core Navigation Schemas ---

/// Identity
///
/// The signed-in principal as reported by the external auth provider.
/// The guard never constructs or caches one of these itself; it observes a
/// fresh `Option<Identity>` on every navigation attempt. `None` denotes an
/// anonymous (signed-out) visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, Default)]
#[ts(export)]
pub struct Identity {
    // Primary key, mirrors the auth service's user id and the document
    // store key of the matching `users` record.
    pub id: Uuid,
    // The user's primary identifier (email-like string).
    pub email: String,
}

/// Role
///
/// The closed RBAC enumeration for the portal. Stored in the document store
/// as a lowercase string attribute on the per-identity record; anything
/// outside this set resolves to "no role" and the guard fails closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl Role {
    /// The lowercase wire/storage form of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
        }
    }

    /// home_path
    ///
    /// The dashboard route a user of this role is sent to when a navigation
    /// is redirected (e.g. a student attempting a teacher route lands on
    /// `/student`).
    pub fn home_path(&self) -> String {
        format!("/{}", self.as_str())
    }

    /// from_namespace
    ///
    /// Interprets a leading path segment as a role namespace, if it is one.
    /// Used for the path/role consistency check: a route whose metadata says
    /// `requires-role(teacher)` but whose path starts with `/admin` must not
    /// be allowed through on the strength of the metadata alone.
    pub fn from_namespace(segment: &str) -> Option<Role> {
        segment.parse().ok()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// UnknownRole
///
/// Raised when a stored role attribute is outside the closed enumeration.
/// The role resolver downgrades this to "no role" rather than propagating.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0:?}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// UserRecord
///
/// The per-identity document held in the `users` collection of the document
/// store, keyed by the identity's id. The `role` attribute is deliberately
/// kept as the raw stored string here and only parsed into [`Role`] at
/// resolution time, so that an unknown or empty value degrades to "no role"
/// instead of failing the whole document decode.
#[derive(Debug, Clone, Serialize, Deserialize, TS, Default)]
#[ts(export)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    // The RBAC attribute: "student", "teacher" or "admin". Mutated
    // externally (admin tooling); read-only from this crate's perspective.
    pub role: String,
    #[ts(type = "string")]
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// NavigationDecision
///
/// The terminal outcome of evaluating one navigation attempt. Produced
/// fresh per transition and never persisted; the front end's routing layer
/// acts on it (continue, replace the destination, or sign out first).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", content = "path", rename_all = "camelCase")]
pub enum NavigationDecision {
    /// Proceed to the requested destination.
    Allow,
    /// Abandon the requested destination and navigate to this path instead.
    RedirectTo(String),
    /// Terminate the session, then navigate to this path (always `/login`
    /// in practice: the identity exists but its role cannot be resolved).
    SignOutAndRedirect(String),
}
