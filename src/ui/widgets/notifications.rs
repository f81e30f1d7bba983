//! Notification rendering.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::state::{Notification, NotificationLevel};

/// Render a notification popup.
pub fn render_notification(frame: &mut Frame, area: Rect, notification: &Notification) {
    let (color, icon) = match notification.level {
        NotificationLevel::Info => (Color::Cyan, "ℹ "),
        NotificationLevel::Success => (Color::Green, "✓ "),
        NotificationLevel::Warning => (Color::Yellow, "⚠ "),
        NotificationLevel::Error => (Color::Red, "✗ "),
    };
    popup(
        frame,
        area,
        color,
        Span::styled(icon, Style::default().fg(color)),
        &notification.message,
    );
}

/// Render an error popup.
pub fn render_error(frame: &mut Frame, area: Rect, error: &str) {
    popup(
        frame,
        area,
        Color::Red,
        Span::styled(
            "✗ Error: ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        error,
    );
}

fn popup(frame: &mut Frame, area: Rect, color: Color, prefix: Span<'static>, message: &str) {
    frame.render_widget(Clear, area);

    let paragraph = Paragraph::new(Line::from(vec![prefix, Span::raw(message.to_string())]))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        )
        .style(Style::default().fg(Color::White));

    frame.render_widget(paragraph, area);
}
