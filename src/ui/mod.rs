//! UI rendering using ratatui.
//!
//! This module contains all TUI components and rendering logic.

mod layout;
mod widgets;

pub use layout::Layout;
pub use widgets::{
    HelpPanel, LoginFormWidget, PairTable, StatusBar, TabBar, TrackTable, UserList,
    format_countdown,
};

use crate::config::KeyBindings;
use crate::state::{InputMode, Store, View};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

/// Main UI renderer.
pub struct Ui;

impl Ui {
    /// Render the entire UI.
    pub fn render(frame: &mut Frame, store: &Store, keys: &KeyBindings) {
        let area = frame.area();
        let layout = Layout::new(area, store.app.show_help_bar);

        StatusBar::render(frame, layout.status_area, store);
        TabBar::render(frame, layout.tab_area, store, keys);

        match store.app.current_view {
            View::Login | View::AdminLogin => {
                LoginFormWidget::render(frame, layout.main_area, store);
            }
            View::Pairs => PairTable::render(frame, layout.main_area, store),
            View::Track => TrackTable::render(frame, layout.main_area, store),
            View::AdminUsers => UserList::render(frame, layout.main_area, store),
        }

        if store.app.show_help_bar {
            render_hints(frame, layout.hint_area, store, keys);
        }

        // Render help panel if visible
        if store.app.show_help {
            HelpPanel::render(frame, area, keys);
        }

        // Render notification if present
        if let Some(notification) = &store.app.notification {
            widgets::render_notification(frame, layout.notification_area, notification);
        }

        // Render error if present
        if let Some(error) = &store.app.error {
            widgets::render_error(frame, layout.notification_area, error);
        }
    }
}

fn render_hints(frame: &mut Frame, area: Rect, store: &Store, keys: &KeyBindings) {
    let line = if store.app.input_mode == InputMode::Search {
        Line::from(vec![
            Span::styled(" / ", Style::default().fg(Color::Magenta)),
            Span::raw(store.app.input_buffer.clone()),
            Span::styled("▏  Enter: keep  Esc: clear", Style::default().fg(Color::DarkGray)),
        ])
    } else {
        let hints = match store.app.current_view {
            View::Login | View::AdminLogin => {
                "Enter sign in · Tab next field · F2 switch · Esc quit".to_string()
            }
            View::Pairs | View::Track => format!(
                "{} refresh · {}/{} sort · {}/{} page · {} page size · {} filter · {} sign out",
                keys.refresh,
                keys.sort,
                keys.sort_direction,
                keys.prev_page,
                keys.next_page,
                keys.page_size,
                keys.search,
                keys.logout
            ),
            View::AdminUsers => format!(
                "{}/{} move · {} toggle active · {} reload · {} sign out",
                keys.up, keys.down, keys.toggle_active, keys.refresh, keys.logout
            ),
        };
        Line::from(Span::styled(
            format!(" {}", hints),
            Style::default().fg(Color::DarkGray),
        ))
    };

    frame.render_widget(Paragraph::new(line), area);
}
