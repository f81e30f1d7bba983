//! Help panel widget.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::super::layout::centered_rect;
use crate::config::KeyBindings;

/// Help panel showing keybindings.
pub struct HelpPanel;

impl HelpPanel {
    /// Render the help panel.
    pub fn render(frame: &mut Frame, area: Rect, keys: &KeyBindings) {
        let popup_area = centered_rect(60, 80, area);

        // Clear the area behind the popup
        frame.render_widget(Clear, popup_area);

        let mut help_text = Vec::new();
        section(
            &mut help_text,
            "Views",
            &[
                (keys.pairs.as_str(), "Arbitrage pairs"),
                (keys.track.as_str(), "ArbiTrack"),
                (keys.admin.as_str(), "Admin: users"),
                (keys.logout.as_str(), "Sign out of the current view's session"),
            ],
        );
        section(
            &mut help_text,
            "Tables",
            &[
                (keys.refresh.as_str(), "Refresh now"),
                (keys.sort.as_str(), "Sort by next column"),
                (keys.sort_direction.as_str(), "Flip sort direction"),
                (keys.next_page.as_str(), "Next page (or →)"),
                (keys.prev_page.as_str(), "Previous page (or ←)"),
                (keys.page_size.as_str(), "Change page size"),
                (keys.search.as_str(), "Filter rows (Esc clears)"),
            ],
        );
        section(
            &mut help_text,
            "Users",
            &[
                (keys.up.as_str(), "Move up"),
                (keys.down.as_str(), "Move down"),
                (keys.toggle_active.as_str(), "Activate / deactivate"),
                (keys.refresh.as_str(), "Reload users"),
            ],
        );
        section(
            &mut help_text,
            "Sign in",
            &[
                ("Tab", "Next field"),
                ("Space", "Toggle remember me"),
                ("Enter", "Sign in"),
                ("F2", "Switch user / admin sign in"),
            ],
        );
        section(
            &mut help_text,
            "General",
            &[
                (keys.help.as_str(), "Toggle help"),
                ("Esc", "Dismiss error"),
                (keys.quit.as_str(), "Quit"),
            ],
        );

        let help = Paragraph::new(help_text)
            .block(
                Block::default()
                    .title(" Help ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow)),
            )
            .style(Style::default().fg(Color::White));

        frame.render_widget(help, popup_area);
    }
}

fn section(lines: &mut Vec<Line<'static>>, title: &'static str, entries: &[(&str, &'static str)]) {
    if !lines.is_empty() {
        lines.push(Line::from(""));
    }
    lines.push(Line::from(vec![Span::styled(
        title,
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )]));
    for (key, description) in entries {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<8}", key), Style::default().fg(Color::Cyan)),
            Span::raw(*description),
        ]));
    }
}
