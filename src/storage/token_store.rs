//! Session-aware view over the durable and session-scoped stores.

use super::{FileStore, KeyValueStore, MemoryStore, keys};
use crate::auth::SessionKind;
use crate::config::StorageConfig;
use crate::error::Result;
use std::sync::Arc;
use tracing::debug;

/// Which store a value is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Persistence {
    /// Survives restarts.
    #[default]
    Durable,
    /// Lives for the current process only.
    Session,
}

/// Holds auth tokens, cached user JSON and remembered login credentials.
///
/// Reads check the durable store first, then the session store.
#[derive(Debug, Clone)]
pub struct TokenStore {
    durable: Arc<dyn KeyValueStore>,
    session: Arc<dyn KeyValueStore>,
}

impl TokenStore {
    /// Build a token store from explicit backends.
    pub fn new(durable: Arc<dyn KeyValueStore>, session: Arc<dyn KeyValueStore>) -> Self {
        Self { durable, session }
    }

    /// Open the durable file store described by `config`, with a fresh
    /// session store.
    pub fn open(config: &StorageConfig) -> Result<Self> {
        let durable = FileStore::open(config.durable_path()?)?;
        Ok(Self::new(Arc::new(durable), Arc::new(MemoryStore::new())))
    }

    /// A store with both backends in memory.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()))
    }

    fn backend(&self, persistence: Persistence) -> &dyn KeyValueStore {
        match persistence {
            Persistence::Durable => self.durable.as_ref(),
            Persistence::Session => self.session.as_ref(),
        }
    }

    /// Read a key, durable store first.
    pub fn get(&self, key: &str) -> Option<String> {
        self.durable.get(key).or_else(|| self.session.get(key))
    }

    pub fn set(&self, key: &str, value: &str, persistence: Persistence) -> Result<()> {
        self.backend(persistence).set(key, value)
    }

    /// Remove a key from both stores.
    pub fn remove(&self, key: &str) -> Result<()> {
        self.durable.remove(key)?;
        self.session.remove(key)
    }

    /// Bearer token for `kind`, if a non-empty one is stored.
    pub fn token(&self, kind: SessionKind) -> Option<String> {
        self.get(kind.token_key()).filter(|t| !t.trim().is_empty())
    }

    /// Raw user JSON for `kind`.
    pub fn user_json(&self, kind: SessionKind) -> Option<String> {
        self.get(kind.user_key())
    }

    /// Persist a token and its user JSON together.
    pub fn save_session(
        &self,
        kind: SessionKind,
        token: &str,
        user_json: &str,
        persistence: Persistence,
    ) -> Result<()> {
        let backend = self.backend(persistence);
        backend.set(kind.token_key(), token)?;
        backend.set(kind.user_key(), user_json)?;
        debug!(?kind, ?persistence, "Saved session");
        Ok(())
    }

    /// Remove the token and user JSON for `kind` from both stores.
    pub fn clear_session(&self, kind: SessionKind) -> Result<()> {
        self.remove(kind.token_key())?;
        self.remove(kind.user_key())?;
        debug!(?kind, "Cleared session");
        Ok(())
    }

    /// Email and password saved by a "remember me" login.
    pub fn remembered_credentials(&self) -> Option<(String, String)> {
        let email = self.get(keys::REMEMBERED_EMAIL)?;
        let password = self.get(keys::REMEMBERED_PASSWORD).unwrap_or_default();
        Some((email, password))
    }

    pub fn remember_credentials(&self, email: &str, password: &str) -> Result<()> {
        self.durable.set(keys::REMEMBERED_EMAIL, email)?;
        self.durable.set(keys::REMEMBERED_PASSWORD, password)
    }

    pub fn forget_credentials(&self) -> Result<()> {
        self.remove(keys::REMEMBERED_EMAIL)?;
        self.remove(keys::REMEMBERED_PASSWORD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_durable_wins_over_session() {
        let store = TokenStore::in_memory();
        store
            .set(keys::AUTH_TOKEN, "session-token", Persistence::Session)
            .unwrap();
        assert_eq!(
            store.token(SessionKind::User).as_deref(),
            Some("session-token")
        );

        store
            .set(keys::AUTH_TOKEN, "durable-token", Persistence::Durable)
            .unwrap();
        assert_eq!(
            store.token(SessionKind::User).as_deref(),
            Some("durable-token")
        );
    }

    #[test]
    fn test_blank_token_is_absent() {
        let store = TokenStore::in_memory();
        store
            .set(keys::AUTH_TOKEN, "  ", Persistence::Durable)
            .unwrap();
        assert_eq!(store.token(SessionKind::User), None);
    }

    #[test]
    fn test_sessions_are_separate_per_kind() {
        let store = TokenStore::in_memory();
        store
            .save_session(SessionKind::Admin, "adm", "{}", Persistence::Session)
            .unwrap();

        assert_eq!(store.token(SessionKind::User), None);
        assert_eq!(store.token(SessionKind::Admin).as_deref(), Some("adm"));
        assert_eq!(store.get(keys::ADMIN_USER).as_deref(), Some("{}"));

        store.clear_session(SessionKind::Admin).unwrap();
        assert_eq!(store.token(SessionKind::Admin), None);
        assert_eq!(store.user_json(SessionKind::Admin), None);
    }

    #[test]
    fn test_remembered_credentials() {
        let store = TokenStore::in_memory();
        assert_eq!(store.remembered_credentials(), None);

        store.remember_credentials("ada@example.com", "pw").unwrap();
        assert_eq!(
            store.remembered_credentials(),
            Some(("ada@example.com".to_string(), "pw".to_string()))
        );

        store.forget_credentials().unwrap();
        assert_eq!(store.remembered_credentials(), None);
    }
}
