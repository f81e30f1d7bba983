//! Auth context: the in-memory session plus its persistence.

use super::{Session, SessionKind, UserProfile};
use crate::error::Result;
use crate::storage::{Persistence, TokenStore};
use tracing::{debug, info, warn};

/// Holds one session and keeps it in sync with the [`TokenStore`].
///
/// A context starts in the `loading` state and leaves it after
/// [`hydrate`](Self::hydrate). Guarded views must not render while loading.
#[derive(Debug)]
pub struct AuthContext {
    kind: SessionKind,
    store: TokenStore,
    session: Session,
    loading: bool,
}

impl AuthContext {
    /// Create an empty, still-loading context.
    pub fn new(kind: SessionKind, store: TokenStore) -> Self {
        Self {
            kind,
            store,
            session: Session::default(),
            loading: true,
        }
    }

    /// Populate the session from storage, once.
    ///
    /// Any read or parse failure leaves the session empty.
    pub fn hydrate(&mut self) {
        if let Some(token) = self.store.token(self.kind) {
            let user = self
                .store
                .user_json(self.kind)
                .map(|json| serde_json::from_str::<UserProfile>(&json));
            match user {
                Some(Ok(user)) => {
                    debug!(kind = %self.kind, "Hydrated session for {}", user.email);
                    self.session = Session {
                        user: Some(user),
                        token: Some(token),
                    };
                }
                Some(Err(e)) => {
                    warn!(kind = %self.kind, "Stored user is unreadable: {}", e);
                }
                None => {
                    debug!(kind = %self.kind, "Token without user, ignoring");
                }
            }
        }
        self.loading = false;
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Token presence is the only authorisation signal.
    pub fn is_authenticated(&self) -> bool {
        self.session.token.is_some()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.session.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.session.token.as_deref()
    }

    /// Replace the session. When both halves are present they are written
    /// to the durable store.
    pub fn set_session(&mut self, user: Option<UserProfile>, token: Option<String>) -> Result<()> {
        self.session = Session { user, token };
        self.loading = false;

        if let (Some(user), Some(token)) = (&self.session.user, &self.session.token) {
            let json = serde_json::to_string(user)?;
            self.store
                .save_session(self.kind, token, &json, Persistence::Durable)?;
            info!(kind = %self.kind, "Signed in as {}", user.email);
        }
        Ok(())
    }

    /// Clear the session from memory and both stores.
    pub fn logout(&mut self) -> Result<()> {
        self.session = Session::default();
        self.store.clear_session(self.kind)?;
        info!(kind = %self.kind, "Signed out");
        Ok(())
    }

    /// The server rejected our token: drop the local session.
    pub fn handle_unauthorized(&mut self) -> Result<()> {
        warn!(kind = %self.kind, "Token rejected by server, clearing session");
        self.logout()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::keys;
    use pretty_assertions::assert_eq;

    fn profile() -> UserProfile {
        UserProfile {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_hydrate_from_durable_store() {
        let store = TokenStore::in_memory();
        store
            .save_session(
                SessionKind::User,
                "tok",
                &serde_json::to_string(&profile()).unwrap(),
                Persistence::Durable,
            )
            .unwrap();

        let mut ctx = AuthContext::new(SessionKind::User, store);
        assert!(ctx.is_loading());
        assert!(!ctx.is_authenticated());

        ctx.hydrate();
        assert!(!ctx.is_loading());
        assert_eq!(ctx.token(), Some("tok"));
        assert_eq!(ctx.user(), Some(&profile()));
    }

    #[test]
    fn test_hydrate_falls_back_to_session_store() {
        let store = TokenStore::in_memory();
        store
            .save_session(
                SessionKind::Admin,
                "adm",
                r#"{"email":"root@example.com","role":"admin"}"#,
                Persistence::Session,
            )
            .unwrap();

        let mut ctx = AuthContext::new(SessionKind::Admin, store);
        ctx.hydrate();
        assert!(ctx.is_authenticated());
        assert!(ctx.user().unwrap().has_admin_role());
    }

    #[test]
    fn test_hydrate_with_bad_user_json_stays_empty() {
        let store = TokenStore::in_memory();
        store
            .set(keys::AUTH_TOKEN, "tok", Persistence::Durable)
            .unwrap();
        store
            .set(keys::USER, "{not json", Persistence::Durable)
            .unwrap();

        let mut ctx = AuthContext::new(SessionKind::User, store);
        ctx.hydrate();
        assert!(!ctx.is_loading());
        assert_eq!(ctx.session(), &Session::default());
    }

    #[test]
    fn test_set_session_persists_only_when_complete() {
        let store = TokenStore::in_memory();
        let mut ctx = AuthContext::new(SessionKind::User, store.clone());

        ctx.set_session(None, Some("tok".to_string())).unwrap();
        assert_eq!(store.token(SessionKind::User), None);

        ctx.set_session(Some(profile()), Some("tok".to_string()))
            .unwrap();
        assert_eq!(store.token(SessionKind::User).as_deref(), Some("tok"));
        assert!(store.user_json(SessionKind::User).is_some());
    }

    #[test]
    fn test_logout_clears_everything() {
        let store = TokenStore::in_memory();
        let mut ctx = AuthContext::new(SessionKind::User, store.clone());
        ctx.set_session(Some(profile()), Some("tok".to_string()))
            .unwrap();

        ctx.handle_unauthorized().unwrap();
        assert!(!ctx.is_authenticated());
        assert_eq!(store.token(SessionKind::User), None);
        assert_eq!(store.user_json(SessionKind::User), None);
    }
}
