//! Route guards: which views a session may see.

use super::{AuthContext, SessionKind};
use crate::state::View;

/// Access rule attached to a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Only visitors without a session of this kind (login screens).
    Anonymous(SessionKind),
    /// A session of this kind is required.
    Requires(SessionKind),
}

/// Outcome of guarding a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// The relevant context is still hydrating; render nothing yet.
    Pending,
    Allow,
    Redirect(View),
}

fn context_for<'a>(
    kind: SessionKind,
    user: &'a AuthContext,
    admin: &'a AuthContext,
) -> &'a AuthContext {
    match kind {
        SessionKind::User => user,
        SessionKind::Admin => admin,
    }
}

/// Decide whether `view` may be shown given both auth contexts.
pub fn guard(view: View, user: &AuthContext, admin: &AuthContext) -> GuardDecision {
    match view.access() {
        Access::Requires(kind) => {
            let ctx = context_for(kind, user, admin);
            if ctx.is_loading() {
                GuardDecision::Pending
            } else if ctx.is_authenticated() {
                GuardDecision::Allow
            } else {
                GuardDecision::Redirect(View::login_for(kind))
            }
        }
        Access::Anonymous(kind) => {
            let ctx = context_for(kind, user, admin);
            if ctx.is_loading() {
                GuardDecision::Pending
            } else if ctx.is_authenticated() {
                GuardDecision::Redirect(View::home_for(kind))
            } else {
                GuardDecision::Allow
            }
        }
    }
}
