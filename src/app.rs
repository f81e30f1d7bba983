//! Main application module.
//!
//! This module contains the main `App` struct that coordinates
//! the event loop, state management, and rendering.

use crate::api::{ApiClient, ApiClientBuilder};
use crate::auth::{AuthContext, GuardDecision, SessionKind, guard};
use crate::config::Config;
use crate::dashboard::{DashboardCache, DashboardPoller, DashboardState, RefreshOutcome};
use crate::error::{Error, Result};
use crate::events::EventHandler;
use crate::state::{Action, LoginForm, Notification, Store, View};
use crate::storage::TokenStore;
use crate::ui::Ui;

use crossterm::{
    event::{DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

/// A mounted dashboard: the cache, its timers and the UI's subscription.
struct MountedDashboard {
    cache: Arc<DashboardCache>,
    updates: WatchStream<DashboardState>,
    _poller: DashboardPoller,
}

/// The main application.
pub struct App {
    /// Terminal.
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Application store.
    store: Store,
    /// Event handler.
    event_handler: EventHandler,
    /// Action sender, for background tasks.
    action_tx: mpsc::UnboundedSender<Action>,
    /// Action receiver.
    action_rx: mpsc::UnboundedReceiver<Action>,
    /// API client.
    api_client: ApiClient,
    /// Persisted sessions.
    tokens: TokenStore,
    /// End-user session.
    user_auth: AuthContext,
    /// Admin session.
    admin_auth: AuthContext,
    /// Present while a user is signed in.
    dashboard: Option<MountedDashboard>,
    /// When the current notification appeared.
    notification_shown: Option<Instant>,
    /// Configuration.
    config: Config,
}

impl App {
    /// Create a new application.
    pub async fn new(config: Config) -> Result<Self> {
        let tokens = TokenStore::open(&config.storage)?;
        let api_client = ApiClientBuilder::new().config(config.api.clone()).build()?;
        info!(base_url = api_client.base_url(), "API client ready");

        let mut user_auth = AuthContext::new(SessionKind::User, tokens.clone());
        let mut admin_auth = AuthContext::new(SessionKind::Admin, tokens.clone());
        user_auth.hydrate();
        admin_auth.hydrate();

        // Create action channel
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        let mut store = Store::new(
            action_tx.clone(),
            &config.ui,
            config.dashboard.refresh_interval(),
        );
        store.app.show_help_bar = config.ui.show_help_bar;
        if let Some((email, password)) = tokens.remembered_credentials() {
            store.reduce(Action::ResetLoginForm(LoginForm::with_remembered(
                email, password,
            )));
        }

        let event_handler = EventHandler::new(
            config.keybindings.clone(),
            Duration::from_millis(config.ui.tick_rate_ms),
            config.ui.mouse_support,
        );

        // Set up terminal last so a failure above leaves it untouched
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
        if config.ui.mouse_support {
            execute!(stdout, EnableMouseCapture)?;
        }
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            store,
            event_handler,
            action_tx,
            action_rx,
            api_client,
            tokens,
            user_auth,
            admin_auth,
            dashboard: None,
            notification_shown: None,
            config,
        })
    }

    /// Run the application event loop.
    pub async fn run(&mut self) -> Result<()> {
        if self.user_auth.is_authenticated() {
            self.mount_dashboard();
        }
        self.navigate(View::Pairs);

        // Main event loop
        loop {
            self.check_revoked_session();
            self.expire_notification();
            self.sync_identity();

            // Update event handler with current state
            self.event_handler.update_store_snapshot(&self.store);
            self.draw()?;

            // Handle events and actions
            tokio::select! {
                // Handle terminal events
                result = self.event_handler.next() => {
                    if let Some(action) = result? {
                        self.handle_action(action).await?;
                    }
                }

                // Handle actions from the channel
                Some(action) = self.action_rx.recv() => {
                    self.handle_action(action).await?;
                }

                // Dashboard snapshots
                Some(state) = next_snapshot(&mut self.dashboard) => {
                    self.store.reduce(Action::DashboardUpdated(state));
                }
            }

            // Check if we should quit
            if self.store.app.should_quit {
                break;
            }
        }

        self.unmount_dashboard();
        Ok(())
    }

    fn draw(&mut self) -> Result<()> {
        let keys = &self.config.keybindings;
        let store = &self.store;
        self.terminal.draw(|frame| {
            Ui::render(frame, store, keys);
        })?;
        Ok(())
    }

    /// Handle an action.
    async fn handle_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::SetView(view) => self.navigate(view),
            Action::RefreshDashboard => self.refresh_dashboard(),
            Action::SubmitLogin => self.submit_login().await?,
            Action::Logout => self.logout(),
            Action::LoadUsers => self.load_users().await?,
            Action::ToggleSelectedUser => self.toggle_selected_user().await?,
            Action::ShowNotification(notification) => self.notify(notification),
            _ => {
                // Let the store handle the action
                self.store.reduce(action);
            }
        }

        Ok(())
    }

    fn notify(&mut self, notification: Notification) {
        self.notification_shown = Some(Instant::now());
        self.store.reduce(Action::ShowNotification(notification));
    }

    /// Show `view` if the guards allow it, otherwise where they redirect.
    fn navigate(&mut self, view: View) {
        match guard(view, &self.user_auth, &self.admin_auth) {
            GuardDecision::Pending => debug!(?view, "Session still loading"),
            GuardDecision::Allow => self.enter(view),
            GuardDecision::Redirect(target) => {
                debug!(?view, ?target, "Navigation redirected");
                // Login views redirect to the home view, which may need its
                // own guard; a second hop always settles.
                match guard(target, &self.user_auth, &self.admin_auth) {
                    GuardDecision::Redirect(next) => self.enter(next),
                    _ => self.enter(target),
                }
            }
        }
    }

    fn enter(&mut self, view: View) {
        self.store.reduce(Action::SetView(view));
        if view == View::AdminUsers && self.store.users.users.is_empty() {
            let _ = self.action_tx.send(Action::LoadUsers);
        }
    }

    /// Keep the status bar in step with the session of the current view.
    fn sync_identity(&mut self) {
        let context = match self.store.app.current_view {
            View::AdminLogin | View::AdminUsers => &self.admin_auth,
            _ => &self.user_auth,
        };
        let name = context.user().map(|user| match context.kind() {
            SessionKind::Admin => format!("{} (admin)", user.display_name()),
            SessionKind::User => user.display_name().to_string(),
        });
        if name != self.store.app.signed_in_as {
            self.store.reduce(Action::SignedIn(name));
        }
    }

    fn expire_notification(&mut self) {
        if let (Some(shown), Some(notification)) =
            (self.notification_shown, &self.store.app.notification)
            && shown.elapsed() >= Duration::from_secs(notification.duration_secs)
        {
            self.notification_shown = None;
            self.store.reduce(Action::DismissNotification);
        }
    }

    // --- Dashboard ---

    fn mount_dashboard(&mut self) {
        if self.dashboard.is_some() {
            return;
        }
        let cache = Arc::new(DashboardCache::new(
            Arc::new(self.api_client.clone()),
            self.tokens.clone(),
            self.config.dashboard.refresh_interval(),
        ));
        let updates = WatchStream::new(cache.subscribe());
        let poller = DashboardPoller::spawn(cache.clone(), self.config.dashboard.countdown_tick());
        self.dashboard = Some(MountedDashboard {
            cache,
            updates,
            _poller: poller,
        });
    }

    fn unmount_dashboard(&mut self) {
        if self.dashboard.take().is_some() {
            self.store.reduce(Action::DashboardUpdated(DashboardState::new(
                self.config.dashboard.refresh_interval(),
            )));
        }
    }

    /// Start a refresh in the background; its results arrive as snapshots.
    fn refresh_dashboard(&mut self) {
        let Some(mounted) = &self.dashboard else {
            return;
        };
        self.store.reduce(Action::RefreshDashboard);

        let cache = mounted.cache.clone();
        let action_tx = self.action_tx.clone();
        tokio::spawn(async move {
            let outcome = cache.refresh().await;
            let follow_up = match outcome {
                RefreshOutcome::Committed { partial: true, .. } => Some(Notification::warning(
                    "Some data could not be loaded",
                )),
                RefreshOutcome::Committed { .. } => Some(Notification::success("Refreshed")),
                RefreshOutcome::Failed(message) => Some(Notification::error(message)),
                RefreshOutcome::Unauthenticated | RefreshOutcome::Stale => None,
            };
            let _ = action_tx.send(Action::SetLoading(false));
            if let Some(notification) = follow_up {
                let _ = action_tx.send(Action::ShowNotification(notification));
            }
        });
    }

    /// The cache drops the stored token when the server rejects it; follow
    /// it with the in-memory session.
    fn check_revoked_session(&mut self) {
        if self.user_auth.is_authenticated() && self.tokens.token(SessionKind::User).is_none() {
            if let Err(e) = self.user_auth.handle_unauthorized() {
                warn!("Failed to clear session: {}", e);
            }
            self.unmount_dashboard();
            self.notify(Notification::warning("Session expired, please sign in again"));
            if matches!(self.store.app.current_view, View::Pairs | View::Track) {
                self.navigate(View::Pairs);
            }
        }
    }

    // --- Sessions ---

    async fn submit_login(&mut self) -> Result<()> {
        let kind = match self.store.app.current_view {
            View::Login => SessionKind::User,
            View::AdminLogin => SessionKind::Admin,
            _ => return Ok(()),
        };
        if !self.store.login.is_complete() {
            self.store
                .reduce(Action::SetError("Email and password are required".to_string()));
            return Ok(());
        }

        self.store.reduce(Action::SubmitLogin);
        self.store.reduce(Action::ClearError);
        self.draw()?;

        let form = self.store.login.clone();
        let result = self.sign_in(kind, &form).await;
        self.store.reduce(Action::SetLoginSubmitting(false));

        match result {
            Ok(()) => {
                let remembered = if form.remember {
                    self.tokens.remember_credentials(form.email.trim(), &form.password)
                } else {
                    self.tokens.forget_credentials()
                };
                if let Err(e) = remembered {
                    warn!("Failed to update remembered credentials: {}", e);
                }
                let next_form = match self.tokens.remembered_credentials() {
                    Some((email, password)) => LoginForm::with_remembered(email, password),
                    None => LoginForm::default(),
                };
                self.store.reduce(Action::ResetLoginForm(next_form));
                self.notify(Notification::success("Signed in"));
                self.navigate(View::home_for(kind));
            }
            Err(e) => {
                warn!(%kind, "Sign in failed: {}", e);
                self.store.reduce(Action::SetError(login_error_message(&e)));
            }
        }
        Ok(())
    }

    async fn sign_in(&mut self, kind: SessionKind, form: &LoginForm) -> Result<()> {
        let response = self
            .api_client
            .login(form.email.trim(), &form.password)
            .await?;

        match kind {
            SessionKind::User => {
                self.user_auth
                    .set_session(Some(response.user), Some(response.token))?;
                self.mount_dashboard();
            }
            SessionKind::Admin => {
                if !response.user.has_admin_role() {
                    return Err(Error::auth("This account does not have admin access"));
                }
                self.admin_auth
                    .set_session(Some(response.user), Some(response.token))?;
                self.store.reduce(Action::UsersLoaded(Vec::new()));
            }
        }
        Ok(())
    }

    /// Sign out of the session the current view belongs to.
    fn logout(&mut self) {
        let kind = match self.store.app.current_view {
            View::AdminUsers => SessionKind::Admin,
            View::Pairs | View::Track => SessionKind::User,
            View::Login | View::AdminLogin => return,
        };

        let result = match kind {
            SessionKind::User => {
                self.unmount_dashboard();
                self.user_auth.logout()
            }
            SessionKind::Admin => {
                self.store.reduce(Action::UsersLoaded(Vec::new()));
                self.admin_auth.logout()
            }
        };
        if let Err(e) = result {
            warn!("Failed to clear stored session: {}", e);
        }

        self.notify(Notification::info("Signed out"));
        self.navigate(View::login_for(kind));
    }

    // --- Admin ---

    async fn load_users(&mut self) -> Result<()> {
        let Some(token) = self.admin_auth.token().map(str::to_string) else {
            return Ok(());
        };
        self.store.reduce(Action::LoadUsers);
        self.draw()?;

        match self.api_client.list_users(&token).await {
            Ok(users) => {
                info!(count = users.len(), "Loaded users");
                self.store.reduce(Action::UsersLoaded(users));
            }
            Err(e) => self.admin_request_failed(e),
        }
        Ok(())
    }

    async fn toggle_selected_user(&mut self) -> Result<()> {
        let Some(token) = self.admin_auth.token().map(str::to_string) else {
            return Ok(());
        };
        let Some(user) = self.store.users.selected_user().cloned() else {
            return Ok(());
        };

        match self.api_client.toggle_user_active(&token, &user.id).await {
            Ok(response) => {
                self.store.reduce(Action::UserToggled(user.id.clone()));
                let message = response
                    .message
                    .unwrap_or_else(|| format!("Updated {}", user.display_name()));
                self.notify(Notification::success(message));
            }
            Err(e) => self.admin_request_failed(e),
        }
        Ok(())
    }

    fn admin_request_failed(&mut self, error: Error) {
        if error.is_unauthorized() {
            if let Err(e) = self.admin_auth.handle_unauthorized() {
                warn!("Failed to clear admin session: {}", e);
            }
            self.store.reduce(Action::UsersLoaded(Vec::new()));
            self.notify(Notification::warning("Admin session expired, please sign in again"));
            self.navigate(View::AdminUsers);
        } else {
            warn!("Admin request failed: {}", error);
            self.store.reduce(Action::SetError(error.to_string()));
        }
    }
}

async fn next_snapshot(dashboard: &mut Option<MountedDashboard>) -> Option<DashboardState> {
    match dashboard {
        Some(mounted) => mounted.updates.next().await,
        None => std::future::pending().await,
    }
}

fn login_error_message(error: &Error) -> String {
    match error {
        Error::Unauthorized => "Invalid email or password".to_string(),
        Error::Status { message, .. } => message.clone(),
        Error::Transport(_) => "Could not reach the server".to_string(),
        other => other.to_string(),
    }
}

impl Drop for App {
    fn drop(&mut self) {
        // Restore terminal state
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableBracketedPaste,
            DisableMouseCapture
        );
        let _ = self.terminal.show_cursor();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_error_messages() {
        assert_eq!(
            login_error_message(&Error::Unauthorized),
            "Invalid email or password"
        );
        assert_eq!(
            login_error_message(&Error::status(400, "Account disabled")),
            "Account disabled"
        );
        assert!(login_error_message(&Error::auth("no admin")).contains("no admin"));
    }
}
