//! State management for Arbilo.
//!
//! This module provides centralized state management with a unidirectional
//! data flow pattern inspired by Redux/Elm architecture.

mod app_state;
mod arbitrage;
mod table_state;
mod users_state;

pub use app_state::{AppState, InputMode, LoginField, LoginForm, View};
pub use arbitrage::{ArbiPairRow, ArbiTrackRow, PairColumn, TrackColumn, decimal_from_value};
pub use table_state::{
    PAIR_PAGE_SIZES, SortDirection, TRACK_PAGE_SIZES, TableBody, TablePage, TableRow, TableView,
};
pub use users_state::UsersState;

use crate::auth::{RecordId, UserProfile};
use crate::config::UiConfig;
use crate::dashboard::DashboardState;
use crate::error::Result;
use std::time::Duration;
use tokio::sync::mpsc;

/// Actions that can be dispatched to modify state.
#[derive(Debug, Clone)]
pub enum Action {
    // Navigation
    SetView(View),
    SetInputMode(InputMode),

    // Session
    SubmitLogin,
    Logout,
    SignedIn(Option<String>),

    // Dashboard
    RefreshDashboard,
    DashboardUpdated(DashboardState),

    // Table presentation, applied to the table of the current view
    CycleSortColumn,
    FlipSortDirection,
    NextPage,
    PrevPage,
    CyclePageSize,
    SetSearch(Option<String>),
    SearchInput(char),
    SearchBackspace,
    CancelSearch,

    // Login form
    LoginInput(char),
    LoginBackspace,
    LoginNextField,
    ResetLoginForm(LoginForm),
    SetLoginSubmitting(bool),

    // Admin users
    LoadUsers,
    UsersLoaded(Vec<UserProfile>),
    ToggleSelectedUser,
    UserToggled(RecordId),

    // UI actions
    ScrollUp,
    ScrollDown,
    ToggleHelp,
    ShowNotification(Notification),
    DismissNotification,

    // Error handling
    SetError(String),
    ClearError,

    SetLoading(bool),

    // Quit
    Quit,
}

/// A notification to display to the user.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    pub duration_secs: u64,
}

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Info,
            duration_secs: 3,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Success,
            duration_secs: 3,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Warning,
            duration_secs: 5,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Error,
            duration_secs: 10,
        }
    }
}

/// The global state store.
#[derive(Debug)]
pub struct Store {
    /// Application state.
    pub app: AppState,
    /// Latest dashboard snapshot.
    pub dashboard: DashboardState,
    /// Presentation of the pair table.
    pub pairs: TableView<ArbiPairRow>,
    /// Presentation of the track table.
    pub track: TableView<ArbiTrackRow>,
    /// Login form for whichever login view is shown.
    pub login: LoginForm,
    /// Admin user list.
    pub users: UsersState,
    /// Action sender for dispatching actions.
    action_tx: mpsc::UnboundedSender<Action>,
}

impl Store {
    /// Create a new store with the given action sender.
    pub fn new(
        action_tx: mpsc::UnboundedSender<Action>,
        ui: &UiConfig,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            app: AppState::new(),
            dashboard: DashboardState::new(refresh_interval),
            pairs: TableView::new(PAIR_PAGE_SIZES, ui.pair_page_size),
            track: TableView::new(TRACK_PAGE_SIZES, ui.track_page_size),
            login: LoginForm::default(),
            users: UsersState::default(),
            action_tx,
        }
    }

    /// Dispatch an action to the store.
    pub fn dispatch(&self, action: Action) -> Result<()> {
        self.action_tx
            .send(action)
            .map_err(|e| crate::Error::channel(e.to_string()))
    }

    /// Apply an action to update state.
    pub fn reduce(&mut self, action: Action) {
        match action {
            // Navigation
            Action::SetView(view) => {
                self.app.current_view = view;
                self.app.input_mode = if view.is_login() {
                    InputMode::Insert
                } else {
                    InputMode::Normal
                };
            }
            Action::SetInputMode(mode) => {
                if mode == InputMode::Search {
                    self.app.input_buffer = self.current_query().unwrap_or_default().to_string();
                }
                self.app.input_mode = mode;
            }

            // Session
            Action::SubmitLogin => self.login.submitting = true,
            Action::SignedIn(name) => self.app.signed_in_as = name,

            // Dashboard
            Action::RefreshDashboard => self.app.loading = true,
            Action::DashboardUpdated(state) => {
                self.dashboard = state;
                let pair_total = self.pairs.visible(&self.dashboard.pair_rows).len();
                self.pairs.clamp_page(pair_total);
                let track_total = self.track.visible(&self.dashboard.track_rows).len();
                self.track.clamp_page(track_total);
            }

            // Tables
            Action::CycleSortColumn => match self.app.current_view {
                View::Pairs => self.pairs.cycle_sort_column(),
                View::Track => self.track.cycle_sort_column(),
                _ => {}
            },
            Action::FlipSortDirection => match self.app.current_view {
                View::Pairs => self.pairs.flip_direction(),
                View::Track => self.track.flip_direction(),
                _ => {}
            },
            Action::NextPage => match self.app.current_view {
                View::Pairs => {
                    let total = self.pairs.visible(&self.dashboard.pair_rows).len();
                    self.pairs.next_page(total);
                }
                View::Track => {
                    let total = self.track.visible(&self.dashboard.track_rows).len();
                    self.track.next_page(total);
                }
                _ => {}
            },
            Action::PrevPage => match self.app.current_view {
                View::Pairs => self.pairs.prev_page(),
                View::Track => self.track.prev_page(),
                _ => {}
            },
            Action::CyclePageSize => match self.app.current_view {
                View::Pairs => self.pairs.cycle_page_size(),
                View::Track => self.track.cycle_page_size(),
                _ => {}
            },
            Action::SetSearch(query) => self.apply_query(query),
            Action::SearchInput(c) => {
                self.app.input_buffer.push(c);
                self.apply_query(Some(self.app.input_buffer.clone()));
            }
            Action::SearchBackspace => {
                self.app.input_buffer.pop();
                self.apply_query(Some(self.app.input_buffer.clone()));
            }
            Action::CancelSearch => {
                self.app.clear_input();
                self.apply_query(None);
                self.app.input_mode = InputMode::Normal;
            }

            // Login form
            Action::LoginInput(c) => self.login.push_char(c),
            Action::LoginBackspace => self.login.pop_char(),
            Action::LoginNextField => self.login.focus = self.login.focus.next(),
            Action::ResetLoginForm(form) => self.login = form,
            Action::SetLoginSubmitting(submitting) => self.login.submitting = submitting,

            // Admin users
            Action::LoadUsers => self.users.loading = true,
            Action::UsersLoaded(users) => self.users.replace(users),
            Action::UserToggled(id) => self.users.mark_toggled(&id),

            // Side effects are carried out by the app
            Action::Logout | Action::ToggleSelectedUser => {}

            // UI actions
            Action::ScrollUp => self.scroll(-1),
            Action::ScrollDown => self.scroll(1),
            Action::ToggleHelp => self.app.show_help = !self.app.show_help,
            Action::ShowNotification(notification) => {
                self.app.notification = Some(notification);
            }
            Action::DismissNotification => {
                self.app.notification = None;
            }

            // Error handling
            Action::SetError(error) => {
                self.app.error = Some(error);
                self.app.loading = false;
                self.users.loading = false;
            }
            Action::ClearError => {
                self.app.error = None;
            }

            Action::SetLoading(loading) => {
                self.app.loading = loading;
            }

            // Quit
            Action::Quit => {
                self.app.should_quit = true;
            }
        }
    }

    fn scroll(&mut self, delta: i32) {
        match self.app.current_view {
            View::AdminUsers => self.users.scroll(delta),
            View::Login | View::AdminLogin => {
                if delta > 0 {
                    self.login.focus = self.login.focus.next();
                }
            }
            _ => {}
        }
    }

    fn apply_query(&mut self, query: Option<String>) {
        match self.app.current_view {
            View::Pairs => self.pairs.set_query(query),
            View::Track => self.track.set_query(query),
            _ => {}
        }
    }

    /// Active query of the table in the current view.
    pub fn current_query(&self) -> Option<&str> {
        match self.app.current_view {
            View::Pairs => self.pairs.query.as_deref(),
            View::Track => self.track.query.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn store() -> Store {
        let (tx, _rx) = mpsc::unbounded_channel();
        Store::new(tx, &UiConfig::default(), Duration::from_secs(300))
    }

    fn pairs(n: usize) -> Vec<ArbiPairRow> {
        (0..n)
            .map(|i| ArbiPairRow {
                pair: format!("P{}/USDT", i),
                profit_percentage: rust_decimal::Decimal::from(i as i64),
                ..Default::default()
            })
            .collect()
    }

    fn loaded(store: &mut Store, rows: Vec<ArbiPairRow>) {
        let mut state = DashboardState::new(Duration::from_secs(300));
        state.pair_rows = rows;
        state.initialized = true;
        store.reduce(Action::DashboardUpdated(state));
    }

    #[test]
    fn test_new_store_starts_on_login() {
        let store = store();
        assert_eq!(store.app.current_view, View::Login);
        assert_eq!(store.app.input_mode, InputMode::Insert);
        assert!(store.dashboard.is_loading());
        assert_eq!(store.pairs.page_size, 10);
        assert_eq!(store.track.page_size, 10);
    }

    #[test]
    fn test_set_view_switches_input_mode() {
        let mut store = store();
        store.reduce(Action::SetView(View::Pairs));
        assert_eq!(store.app.input_mode, InputMode::Normal);
        store.reduce(Action::SetView(View::AdminLogin));
        assert_eq!(store.app.input_mode, InputMode::Insert);
    }

    #[tokio::test]
    async fn test_paging_follows_current_view() {
        let mut store = store();
        loaded(&mut store, pairs(25));
        store.reduce(Action::SetView(View::Pairs));

        store.reduce(Action::NextPage);
        store.reduce(Action::NextPage);
        store.reduce(Action::NextPage);
        assert_eq!(store.pairs.page, 2);
        assert_eq!(store.track.page, 0);

        store.reduce(Action::CyclePageSize);
        assert_eq!(store.pairs.page_size, 20);
        assert_eq!(store.pairs.page, 0);
    }

    #[tokio::test]
    async fn test_shrinking_data_clamps_page() {
        let mut store = store();
        loaded(&mut store, pairs(35));
        store.reduce(Action::SetView(View::Pairs));
        store.reduce(Action::NextPage);
        store.reduce(Action::NextPage);
        assert_eq!(store.pairs.page, 2);

        loaded(&mut store, pairs(5));
        assert_eq!(store.pairs.page, 0);
    }

    #[tokio::test]
    async fn test_search_and_sort() {
        let mut store = store();
        loaded(&mut store, pairs(3));
        store.reduce(Action::SetView(View::Pairs));

        let page = store.pairs.page_of(&store.dashboard.pair_rows, false);
        match page.body {
            TableBody::Rows(rows) => assert_eq!(rows[0].profit_percentage, dec!(2)),
            other => panic!("unexpected body: {:?}", other),
        }

        store.reduce(Action::SetSearch(Some("p1".to_string())));
        assert_eq!(store.current_query(), Some("p1"));
        assert_eq!(store.pairs.visible(&store.dashboard.pair_rows).len(), 1);

        store.reduce(Action::CycleSortColumn);
        assert_eq!(store.pairs.sort_column, PairColumn::Pair);
        assert_eq!(store.pairs.direction, SortDirection::Ascending);
    }

    #[tokio::test]
    async fn test_live_search_and_cancel() {
        let mut store = store();
        loaded(&mut store, pairs(12));
        store.reduce(Action::SetView(View::Pairs));
        store.reduce(Action::SetInputMode(InputMode::Search));

        store.reduce(Action::SearchInput('p'));
        store.reduce(Action::SearchInput('1'));
        store.reduce(Action::SearchInput('1'));
        assert_eq!(store.pairs.visible(&store.dashboard.pair_rows).len(), 1);

        store.reduce(Action::SearchBackspace);
        assert_eq!(store.current_query(), Some("p1"));
        // P1, P10, P11
        assert_eq!(store.pairs.visible(&store.dashboard.pair_rows).len(), 3);

        store.reduce(Action::SetInputMode(InputMode::Normal));
        store.reduce(Action::SetInputMode(InputMode::Search));
        assert_eq!(store.app.input_buffer, "p1");

        store.reduce(Action::CancelSearch);
        assert_eq!(store.current_query(), None);
        assert_eq!(store.app.input_mode, InputMode::Normal);
        assert!(store.app.input_buffer.is_empty());
    }

    #[test]
    fn test_login_form_actions() {
        let mut store = store();
        store.reduce(Action::LoginInput('a'));
        store.reduce(Action::LoginNextField);
        store.reduce(Action::LoginInput('x'));
        store.reduce(Action::LoginBackspace);
        assert_eq!(store.login.email, "a");
        assert!(store.login.password.is_empty());

        store.reduce(Action::ResetLoginForm(LoginForm::default()));
        assert!(store.login.email.is_empty());
    }

    #[test]
    fn test_error_clears_loading() {
        let mut store = store();
        store.reduce(Action::RefreshDashboard);
        store.reduce(Action::LoadUsers);
        store.reduce(Action::SetError("boom".to_string()));
        assert!(!store.app.loading);
        assert!(!store.users.loading);
        assert_eq!(store.app.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_countdown_snapshot_keeps_refresh_loading() {
        let mut store = store();
        loaded(&mut store, pairs(3));
        store.reduce(Action::RefreshDashboard);

        let mut ticked = store.dashboard.clone();
        ticked.time_until_next_refresh -= 1;
        store.reduce(Action::DashboardUpdated(ticked));
        assert!(store.app.loading);
        assert_eq!(store.dashboard.time_until_next_refresh, 299);

        store.reduce(Action::SetLoading(false));
        assert!(!store.app.loading);
    }

    #[test]
    fn test_dispatch_sends_to_channel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let store = Store::new(tx, &UiConfig::default(), Duration::from_secs(1));
        store.dispatch(Action::Quit).unwrap();
        assert!(matches!(rx.try_recv(), Ok(Action::Quit)));
    }
}
