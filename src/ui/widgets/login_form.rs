//! Login form widget, shared by the user and admin sign-in views.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::super::layout::centered_rect;
use crate::state::{LoginField, LoginForm, Store, View};

/// Login form widget.
pub struct LoginFormWidget;

impl LoginFormWidget {
    /// Render the login form for the current login view.
    pub fn render(frame: &mut Frame, area: Rect, store: &Store) {
        let form = &store.login;
        let popup_area = centered_rect(50, 60, area);
        frame.render_widget(Clear, popup_area);

        let other = match store.app.current_view {
            View::AdminLogin => "user",
            _ => "admin",
        };

        let mut lines = vec![
            Line::from(""),
            field_line("Email", &form.email, form, LoginField::Email),
            Line::from(""),
            field_line(
                "Password",
                &"•".repeat(form.password.chars().count()),
                form,
                LoginField::Password,
            ),
            Line::from(""),
            Line::from(vec![
                Span::styled(
                    format!("  [{}] ", if form.remember { "x" } else { " " }),
                    focus_style(form, LoginField::Remember),
                ),
                Span::raw("Remember me"),
            ]),
            Line::from(""),
        ];

        if form.submitting {
            lines.push(Line::from(Span::styled(
                "  Signing in...",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::ITALIC),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                format!("  Enter: sign in · Tab: next field · F2: {} sign in", other),
                Style::default().fg(Color::DarkGray),
            )));
        }

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .title(format!(" {} ", store.app.current_view.title()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );

        frame.render_widget(paragraph, popup_area);
    }
}

fn focus_style(form: &LoginForm, field: LoginField) -> Style {
    if form.focus == field {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    }
}

fn field_line(label: &str, value: &str, form: &LoginForm, field: LoginField) -> Line<'static> {
    let cursor = if form.focus == field { "▏" } else { "" };
    Line::from(vec![
        Span::styled(format!("  {:<10}", label), focus_style(form, field)),
        Span::raw(format!("{}{}", value, cursor)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UiConfig;
    use crate::state::Action;
    use ratatui::{Terminal, backend::TestBackend};
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[test]
    fn test_password_is_masked() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut store = Store::new(tx, &UiConfig::default(), Duration::from_secs(300));
        for c in "ada@arbilo.com".chars() {
            store.reduce(Action::LoginInput(c));
        }
        store.reduce(Action::LoginNextField);
        for c in "hunter2".chars() {
            store.reduce(Action::LoginInput(c));
        }

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                LoginFormWidget::render(frame, area, &store);
            })
            .unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();

        assert!(screen.contains("ada@arbilo.com"));
        assert!(!screen.contains("hunter2"));
        assert!(screen.contains("Sign In"));
    }
}
