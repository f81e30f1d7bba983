//! Event handler for processing input events.

use super::InputEvent;
use crate::config::KeyBindings;
use crate::error::Result;
use crate::state::{Action, InputMode, Store, View};
use crossterm::event::{
    self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind,
};
use std::time::Duration;

/// Handles input events and produces actions.
pub struct EventHandler {
    /// Key bindings.
    keybindings: KeyBindings,
    /// How long to wait for terminal input per poll.
    poll_timeout: Duration,
    /// Whether mouse scrolling is honored.
    mouse_support: bool,
    /// Store reference for state-aware handling.
    store_snapshot: Option<StoreSnapshot>,
}

/// Snapshot of relevant store state for event handling.
#[derive(Debug, Clone, Copy)]
struct StoreSnapshot {
    input_mode: InputMode,
    current_view: View,
    show_help: bool,
}

impl EventHandler {
    /// Create a new event handler.
    pub fn new(keybindings: KeyBindings, poll_timeout: Duration, mouse_support: bool) -> Self {
        Self {
            keybindings,
            poll_timeout,
            mouse_support,
            store_snapshot: None,
        }
    }

    /// Update the store snapshot for state-aware event handling.
    pub fn update_store_snapshot(&mut self, store: &Store) {
        self.store_snapshot = Some(StoreSnapshot {
            input_mode: store.app.input_mode,
            current_view: store.app.current_view,
            show_help: store.app.show_help,
        });
    }

    /// Get the next action from user input.
    pub async fn next(&mut self) -> Result<Option<Action>> {
        if event::poll(self.poll_timeout)? {
            match event::read()? {
                CrosstermEvent::Key(key) => return Ok(self.handle_key(key)),
                CrosstermEvent::Mouse(mouse) if self.mouse_support => {
                    return Ok(self.handle_mouse(mouse));
                }
                CrosstermEvent::Paste(text) => return Ok(self.handle_paste(text)),
                // Resize redraws on the next loop iteration
                _ => {}
            }
        }
        Ok(None)
    }

    /// Handle a key event and return an optional action.
    fn handle_key(&self, key: KeyEvent) -> Option<Action> {
        // Only process key press events
        if key.kind != KeyEventKind::Press {
            return None;
        }

        let snapshot = self.store_snapshot?;
        let input = InputEvent::from(key);

        if input.matches("Ctrl+c") {
            return Some(Action::Quit);
        }
        if snapshot.show_help && matches!(key.code, KeyCode::Esc) {
            return Some(Action::ToggleHelp);
        }

        match snapshot.input_mode {
            InputMode::Normal => self.handle_normal_mode(input, snapshot),
            InputMode::Insert => self.handle_insert_mode(key, snapshot),
            InputMode::Search => self.handle_search_mode(key),
        }
    }

    /// Handle a mouse event and return an optional action.
    fn handle_mouse(&self, mouse: MouseEvent) -> Option<Action> {
        match mouse.kind {
            MouseEventKind::ScrollUp => Some(Action::ScrollUp),
            MouseEventKind::ScrollDown => Some(Action::ScrollDown),
            _ => None,
        }
    }

    /// Pasted text goes into the search box; login fields take it one
    /// character at a time through key events.
    fn handle_paste(&self, text: String) -> Option<Action> {
        let snapshot = self.store_snapshot?;
        if snapshot.input_mode != InputMode::Search {
            return None;
        }
        let query = text.lines().next().unwrap_or_default().trim().to_string();
        Some(Action::SetSearch(Some(query)))
    }

    fn handle_normal_mode(&self, input: InputEvent, snapshot: StoreSnapshot) -> Option<Action> {
        let keys = &self.keybindings;

        // Global shortcuts
        if input.matches(&keys.quit) {
            return Some(Action::Quit);
        }
        if input.matches(&keys.help) {
            return Some(Action::ToggleHelp);
        }
        if input.matches("Esc") {
            return Some(Action::ClearError);
        }
        if input.matches(&keys.logout) {
            return Some(Action::Logout);
        }

        // View switching
        if input.matches(&keys.pairs) {
            return Some(Action::SetView(View::Pairs));
        }
        if input.matches(&keys.track) {
            return Some(Action::SetView(View::Track));
        }
        if input.matches(&keys.admin) {
            return Some(Action::SetView(View::AdminUsers));
        }

        match snapshot.current_view {
            View::Pairs | View::Track => self.handle_table_view(input),
            View::AdminUsers => self.handle_users_view(input),
            View::Login | View::AdminLogin => None,
        }
    }

    fn handle_table_view(&self, input: InputEvent) -> Option<Action> {
        let keys = &self.keybindings;

        if input.matches(&keys.refresh) {
            Some(Action::RefreshDashboard)
        } else if input.matches(&keys.sort_direction) {
            Some(Action::FlipSortDirection)
        } else if input.matches(&keys.sort) {
            Some(Action::CycleSortColumn)
        } else if input.matches(&keys.next_page) || input.matches("Right") {
            Some(Action::NextPage)
        } else if input.matches(&keys.prev_page) || input.matches("Left") {
            Some(Action::PrevPage)
        } else if input.matches(&keys.page_size) {
            Some(Action::CyclePageSize)
        } else if input.matches(&keys.search) {
            Some(Action::SetInputMode(InputMode::Search))
        } else {
            None
        }
    }

    fn handle_users_view(&self, input: InputEvent) -> Option<Action> {
        let keys = &self.keybindings;

        if input.matches(&keys.refresh) {
            Some(Action::LoadUsers)
        } else if input.matches(&keys.toggle_active) {
            Some(Action::ToggleSelectedUser)
        } else if input.matches(&keys.up) || input.matches("Up") {
            Some(Action::ScrollUp)
        } else if input.matches(&keys.down) || input.matches("Down") {
            Some(Action::ScrollDown)
        } else {
            None
        }
    }

    /// Typing into a login form.
    fn handle_insert_mode(&self, key: KeyEvent, snapshot: StoreSnapshot) -> Option<Action> {
        match key.code {
            KeyCode::Esc => Some(Action::Quit),
            KeyCode::Enter => Some(Action::SubmitLogin),
            KeyCode::Tab | KeyCode::Down => Some(Action::LoginNextField),
            KeyCode::Backspace => Some(Action::LoginBackspace),
            KeyCode::F(2) => Some(Action::SetView(match snapshot.current_view {
                View::AdminLogin => View::Login,
                _ => View::AdminLogin,
            })),
            KeyCode::Char(c) => Some(Action::LoginInput(c)),
            _ => None,
        }
    }

    fn handle_search_mode(&self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc => Some(Action::CancelSearch),
            KeyCode::Enter => Some(Action::SetInputMode(InputMode::Normal)),
            KeyCode::Backspace => Some(Action::SearchBackspace),
            KeyCode::Char(c) => Some(Action::SearchInput(c)),
            _ => None,
        }
    }
}
