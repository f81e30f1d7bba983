//! Session state for end users and admins.
//!
//! Both kinds of session are held by the same [`AuthContext`] type and differ
//! only in the storage keys they use and the views they unlock.

mod context;
pub mod guard;

pub use context::AuthContext;
pub use guard::{GuardDecision, guard};

use crate::storage::keys;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which session a token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKind {
    User,
    Admin,
}

impl SessionKind {
    /// Storage key holding the bearer token.
    pub fn token_key(self) -> &'static str {
        match self {
            Self::User => keys::AUTH_TOKEN,
            Self::Admin => keys::ADMIN_TOKEN,
        }
    }

    /// Storage key holding the cached user JSON.
    pub fn user_key(self) -> &'static str {
        match self {
            Self::User => keys::USER,
            Self::Admin => keys::ADMIN_USER,
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "User"),
            Self::Admin => write!(f, "Admin"),
        }
    }
}

/// Identifier as sent by the backend, which uses both numeric and string ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl Default for RecordId {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Profile of a signed-in user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    #[serde(alias = "_id")]
    pub id: RecordId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_status: Option<String>,
}

impl UserProfile {
    /// Whether the profile carries the admin role.
    pub fn has_admin_role(&self) -> bool {
        self.is_admin.unwrap_or(false)
            || self
                .role
                .as_deref()
                .is_some_and(|r| r.eq_ignore_ascii_case("admin"))
    }

    /// Name for display, falling back to the email.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

/// In-memory session: a user and their bearer token.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub user: Option<UserProfile>,
    pub token: Option<String>,
}

impl Session {
    /// Both halves present.
    pub fn is_complete(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_profile_accepts_either_id_shape() {
        let numeric: UserProfile =
            serde_json::from_str(r#"{"id": 7, "name": "Ada", "email": "a@x.io"}"#).unwrap();
        assert_eq!(numeric.id, RecordId::Number(7));

        let mongo: UserProfile =
            serde_json::from_str(r#"{"_id": "65af", "email": "a@x.io", "extra": 1}"#).unwrap();
        assert_eq!(mongo.id.to_string(), "65af");
        assert_eq!(mongo.display_name(), "a@x.io");
    }

    #[test]
    fn test_admin_role() {
        let mut profile = UserProfile::default();
        assert!(!profile.has_admin_role());

        profile.role = Some("Admin".to_string());
        assert!(profile.has_admin_role());

        profile.role = None;
        profile.is_admin = Some(true);
        assert!(profile.has_admin_role());
    }
}
