//! Admin user list widget.

use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};

use crate::state::Store;

/// User list widget.
pub struct UserList;

impl UserList {
    /// Render the user list.
    pub fn render(frame: &mut Frame, area: Rect, store: &Store) {
        let users = &store.users;

        let header_cells = ["Name", "Email", "Role", "Subscription", "Status"]
            .iter()
            .map(|h| {
                Cell::from(*h).style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )
            });
        let header = Row::new(header_cells).height(1).bottom_margin(1);

        let rows = users.users.iter().map(|user| {
            let active = user.is_active.unwrap_or(true);
            let status = if active {
                Cell::from("Active").style(Style::default().fg(Color::Green))
            } else {
                Cell::from("Inactive").style(Style::default().fg(Color::Red))
            };
            let role = if user.has_admin_role() {
                "admin".to_string()
            } else {
                user.role.clone().unwrap_or_else(|| "user".to_string())
            };

            Row::new(vec![
                Cell::from(user.name.clone()),
                Cell::from(user.email.clone()),
                Cell::from(role),
                Cell::from(user.subscription_status.clone().unwrap_or_default()),
                status,
            ])
            .height(1)
        });

        let table = Table::new(
            rows,
            [
                Constraint::Percentage(25),
                Constraint::Percentage(35),
                Constraint::Length(8),
                Constraint::Length(14),
                Constraint::Length(10),
            ],
        )
        .header(header)
        .block(
            Block::default()
                .title(format!(
                    " Users ({} active / {}) ",
                    users.active_count(),
                    users.users.len()
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("▶ ");

        let mut state = TableState::default();
        state.select(users.selected_index);

        frame.render_stateful_widget(table, area, &mut state);

        if users.loading {
            render_loading(frame, area);
        }
    }
}

fn render_loading(frame: &mut Frame, area: Rect) {
    if area.width < 17 || area.height < 3 {
        return;
    }
    let loading = Line::from(vec![Span::styled(
        "Loading...",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::ITALIC),
    )]);

    let loading_area = Rect {
        x: area.x + area.width - 16,
        y: area.y + area.height - 2,
        width: 15,
        height: 1,
    };

    frame.render_widget(Paragraph::new(loading), loading_area);
}
