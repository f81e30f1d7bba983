//! Application-level state.

use super::Notification;
use crate::auth::SessionKind;
use crate::auth::guard::Access;

/// The current view/screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Login,
    AdminLogin,
    Pairs,
    Track,
    AdminUsers,
}

impl View {
    /// Who may see this view.
    pub fn access(self) -> Access {
        match self {
            Self::Login => Access::Anonymous(SessionKind::User),
            Self::AdminLogin => Access::Anonymous(SessionKind::Admin),
            Self::Pairs | Self::Track => Access::Requires(SessionKind::User),
            Self::AdminUsers => Access::Requires(SessionKind::Admin),
        }
    }

    /// Login screen for a session kind.
    pub fn login_for(kind: SessionKind) -> Self {
        match kind {
            SessionKind::User => Self::Login,
            SessionKind::Admin => Self::AdminLogin,
        }
    }

    /// Landing view after signing in.
    pub fn home_for(kind: SessionKind) -> Self {
        match kind {
            SessionKind::User => Self::Pairs,
            SessionKind::Admin => Self::AdminUsers,
        }
    }

    pub fn is_login(self) -> bool {
        matches!(self, Self::Login | Self::AdminLogin)
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Login => "Sign In",
            Self::AdminLogin => "Admin Sign In",
            Self::Pairs => "Arbitrage Pairs",
            Self::Track => "ArbiTrack",
            Self::AdminUsers => "Users",
        }
    }
}

/// Input mode for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing into the login form.
    Insert,
    Search,
}

/// Focused field of the login form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Email,
    Password,
    Remember,
}

impl LoginField {
    pub fn next(self) -> Self {
        match self {
            Self::Email => Self::Password,
            Self::Password => Self::Remember,
            Self::Remember => Self::Email,
        }
    }
}

/// Login form contents.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub remember: bool,
    pub focus: LoginField,
    /// A login request is in flight.
    pub submitting: bool,
}

impl LoginForm {
    /// Pre-fill from remembered credentials.
    pub fn with_remembered(email: String, password: String) -> Self {
        Self {
            email,
            password,
            remember: true,
            ..Default::default()
        }
    }

    pub fn push_char(&mut self, c: char) {
        match self.focus {
            LoginField::Email => self.email.push(c),
            LoginField::Password => self.password.push(c),
            LoginField::Remember => {
                if c == ' ' {
                    self.remember = !self.remember;
                }
            }
        }
    }

    pub fn pop_char(&mut self) {
        match self.focus {
            LoginField::Email => {
                self.email.pop();
            }
            LoginField::Password => {
                self.password.pop();
            }
            LoginField::Remember => {}
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.is_empty()
    }
}

/// Global application state.
#[derive(Debug, Default)]
pub struct AppState {
    /// Current view.
    pub current_view: View,
    /// Current input mode.
    pub input_mode: InputMode,
    /// Whether to show help overlay.
    pub show_help: bool,
    /// Whether to show the key hint line.
    pub show_help_bar: bool,
    /// Current notification.
    pub notification: Option<Notification>,
    /// Current error message.
    pub error: Option<String>,
    /// Whether the app is loading data.
    pub loading: bool,
    /// Signed-in display name, if any.
    pub signed_in_as: Option<String>,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Current search input.
    pub input_buffer: String,
}

impl AppState {
    /// Create a new application state.
    pub fn new() -> Self {
        Self {
            current_view: View::Login,
            input_mode: InputMode::Insert,
            ..Default::default()
        }
    }

    /// Check if in an input mode.
    pub fn is_editing(&self) -> bool {
        matches!(self.input_mode, InputMode::Insert | InputMode::Search)
    }

    /// Clear the input buffer.
    pub fn clear_input(&mut self) {
        self.input_buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_form_editing() {
        let mut form = LoginForm::default();
        for c in "ada@x.io".chars() {
            form.push_char(c);
        }
        form.focus = form.focus.next();
        form.push_char('p');
        form.push_char('w');
        form.pop_char();
        form.focus = form.focus.next();
        form.push_char(' ');

        assert_eq!(form.email, "ada@x.io");
        assert_eq!(form.password, "p");
        assert!(form.remember);
        assert!(form.is_complete());
        assert_eq!(form.focus.next(), LoginField::Email);
    }

    #[test]
    fn test_view_routing_helpers() {
        assert_eq!(View::login_for(SessionKind::Admin), View::AdminLogin);
        assert_eq!(View::home_for(SessionKind::User), View::Pairs);
        assert!(View::AdminLogin.is_login());
        assert_eq!(
            View::AdminUsers.access(),
            Access::Requires(SessionKind::Admin)
        );
    }
}
