//! Status bar widget.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::state::{Store, View};

/// Status bar widget.
pub struct StatusBar;

impl StatusBar {
    /// Render the status bar.
    pub fn render(frame: &mut Frame, area: Rect, store: &Store) {
        let session = match &store.app.signed_in_as {
            Some(name) => Span::styled(format!("● {}", name), Style::default().fg(Color::Green)),
            None => Span::styled("○ Signed out", Style::default().fg(Color::Red)),
        };

        let mut left_content = vec![
            Span::styled(
                " Arbilo ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" | "),
            session,
        ];

        let on_dashboard = matches!(store.app.current_view, View::Pairs | View::Track);
        if on_dashboard && store.app.signed_in_as.is_some() {
            let dashboard = &store.dashboard;
            left_content.push(Span::raw(" | "));
            left_content.push(Span::styled(
                format!(
                    "Next refresh {}",
                    format_countdown(dashboard.time_until_next_refresh)
                ),
                Style::default().fg(Color::Yellow),
            ));
            if let Some(at) = dashboard.last_refreshed_at {
                left_content.push(Span::styled(
                    format!(" | Updated {}", at.with_timezone(&chrono::Local).format("%H:%M:%S")),
                    Style::default().fg(Color::Gray),
                ));
            }
        }

        if store.app.loading {
            left_content.push(Span::styled(
                " Loading... ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::ITALIC),
            ));
        }

        let help_hint = Span::styled(" Press ? for help ", Style::default().fg(Color::DarkGray));

        // Calculate padding for right-aligned help hint
        let left_len: usize = left_content.iter().map(|s| s.width()).sum();
        let padding = (area.width as usize).saturating_sub(left_len + help_hint.width());

        left_content.push(Span::raw(" ".repeat(padding)));
        left_content.push(help_hint);

        let paragraph =
            Paragraph::new(Line::from(left_content)).style(Style::default().bg(Color::DarkGray));

        frame.render_widget(paragraph, area);
    }
}

/// `m:ss` for a countdown in whole seconds.
pub fn format_countdown(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_countdown() {
        assert_eq!(format_countdown(300), "5:00");
        assert_eq!(format_countdown(299), "4:59");
        assert_eq!(format_countdown(61), "1:01");
        assert_eq!(format_countdown(0), "0:00");
    }
}
