//! Admin user list state.

use crate::auth::{RecordId, UserProfile};
use chrono::{DateTime, Utc};

/// State for the admin user list.
#[derive(Debug, Default)]
pub struct UsersState {
    /// All users.
    pub users: Vec<UserProfile>,
    /// Currently selected user index.
    pub selected_index: Option<usize>,
    /// Whether users are currently loading.
    pub loading: bool,
    /// Last update timestamp.
    pub last_updated: Option<DateTime<Utc>>,
}

impl UsersState {
    /// Get the currently selected user.
    pub fn selected_user(&self) -> Option<&UserProfile> {
        self.selected_index.and_then(|i| self.users.get(i))
    }

    /// Replace the list, keeping the selection in range.
    pub fn replace(&mut self, users: Vec<UserProfile>) {
        self.users = users;
        self.loading = false;
        self.last_updated = Some(Utc::now());
        self.selected_index = match (self.selected_index, self.users.len()) {
            (_, 0) => None,
            (Some(i), len) => Some(i.min(len - 1)),
            (None, _) => Some(0),
        };
    }

    /// Move the selection by `delta`, clamped to the list.
    pub fn scroll(&mut self, delta: i32) {
        if self.users.is_empty() {
            return;
        }
        let current = self.selected_index.unwrap_or(0) as i32;
        let max_index = self.users.len() as i32 - 1;
        self.selected_index = Some((current + delta).clamp(0, max_index) as usize);
    }

    /// Flip the active flag of a user after the server confirmed it.
    pub fn mark_toggled(&mut self, id: &RecordId) {
        if let Some(user) = self.users.iter_mut().find(|u| &u.id == id) {
            user.is_active = Some(!user.is_active.unwrap_or(true));
        }
    }

    /// Number of active accounts. Users without the flag count as active.
    pub fn active_count(&self) -> usize {
        self.users
            .iter()
            .filter(|u| u.is_active.unwrap_or(true))
            .count()
    }
}
