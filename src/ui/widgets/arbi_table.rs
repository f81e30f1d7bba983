//! Sortable, paginated tables for the arbitrage dashboard.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};
use rust_decimal::Decimal;

use crate::state::{ArbiPairRow, ArbiTrackRow, Store, TableBody, TableRow, TableView};

/// Pair table widget.
pub struct PairTable;

impl PairTable {
    /// Render the pair table.
    pub fn render(frame: &mut Frame, area: Rect, store: &Store) {
        let widths = [
            Constraint::Min(12),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(10),
        ];

        render_table(
            frame,
            area,
            TableFrame {
                title: "Arbitrage Pairs",
                view: &store.pairs,
                rows: &store.dashboard.pair_rows,
                loading: store.dashboard.is_loading(),
                error: store.dashboard.error.as_deref(),
                widths: &widths,
            },
            |row: &ArbiPairRow| {
                Row::new(vec![
                    Cell::from(row.pair.clone()),
                    Cell::from(row.min_exchange.clone()),
                    Cell::from(price(row.min_price1)),
                    Cell::from(price(row.min_price2)),
                    Cell::from(row.max_exchange.clone()),
                    Cell::from(price(row.max_price1)),
                    Cell::from(price(row.max_price2)),
                    Cell::from(format!("{:.2}%", row.profit_percentage))
                        .style(profit_style(row.profit_percentage)),
                ])
            },
        );
    }
}

/// Track table widget.
pub struct TrackTable;

impl TrackTable {
    /// Render the track table.
    pub fn render(frame: &mut Frame, area: Rect, store: &Store) {
        let widths = [
            Constraint::Min(8),
            Constraint::Length(14),
            Constraint::Length(14),
            Constraint::Length(14),
            Constraint::Length(14),
            Constraint::Length(10),
        ];

        render_table(
            frame,
            area,
            TableFrame {
                title: "ArbiTrack",
                view: &store.track,
                rows: &store.dashboard.track_rows,
                loading: store.dashboard.is_loading(),
                error: store.dashboard.error.as_deref(),
                widths: &widths,
            },
            |row: &ArbiTrackRow| {
                let profit = row.profit_percentage.parse().unwrap_or_default();
                Row::new(vec![
                    Cell::from(row.coin1.clone()),
                    Cell::from(row.min_exchange.clone()),
                    Cell::from(row.min_price1.clone()),
                    Cell::from(row.max_exchange.clone()),
                    Cell::from(row.max_price1.clone()),
                    Cell::from(format!("{}%", row.profit_percentage)).style(profit_style(profit)),
                ])
            },
        );
    }
}

/// Everything a table needs besides its row formatter.
struct TableFrame<'a, R: TableRow> {
    title: &'a str,
    view: &'a TableView<R>,
    rows: &'a [R],
    loading: bool,
    error: Option<&'a str>,
    widths: &'a [Constraint],
}

fn render_table<R, F>(frame: &mut Frame, area: Rect, table: TableFrame<'_, R>, to_row: F)
where
    R: TableRow,
    F: Fn(&R) -> Row<'static>,
{
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(u16::from(table.error.is_some())),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    if let Some(error) = table.error {
        let banner = Paragraph::new(Line::from(vec![
            Span::styled(
                " ✗ ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled(error.to_string(), Style::default().fg(Color::Red)),
            Span::styled(
                "  (showing last data)",
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        frame.render_widget(banner, chunks[0]);
    }

    let view = table.view;
    let header_cells = R::COLUMNS.iter().map(|column| {
        let label = if *column == view.sort_column {
            format!("{} {}", column, view.direction.arrow())
        } else {
            column.to_string()
        };
        Cell::from(label).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });
    let header = Row::new(header_cells).height(1).bottom_margin(1);

    let page = view.page_of(table.rows, table.loading);
    let rows: Vec<Row> = match page.body {
        TableBody::Loading => vec![placeholder("Loading...")],
        TableBody::Empty if view.query.is_some() => vec![placeholder("No matching rows")],
        TableBody::Empty => vec![placeholder("No data available")],
        TableBody::Rows(rows) => rows.into_iter().map(&to_row).collect(),
    };

    let widget = Table::new(rows, table.widths.iter().copied())
        .header(header)
        .block(
            Block::default()
                .title(format!(" {} ({}) ", table.title, page.total))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
    frame.render_widget(widget, chunks[1]);

    let mut footer = vec![Span::styled(
        format!(
            " Page {}/{}  ·  {} per page  ",
            page.page + 1,
            page.page_count,
            view.page_size
        ),
        Style::default().fg(Color::White),
    )];
    if let Some(query) = &view.query {
        footer.push(Span::styled(
            format!("filter: {}", query),
            Style::default().fg(Color::Magenta),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(footer)), chunks[2]);
}

fn placeholder(text: &'static str) -> Row<'static> {
    Row::new(vec![Cell::from(text).style(
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    )])
}

fn price(value: Decimal) -> String {
    value.normalize().to_string()
}

fn profit_style(profit: Decimal) -> Style {
    if profit > Decimal::ZERO {
        Style::default().fg(Color::Green)
    } else if profit < Decimal::ZERO {
        Style::default().fg(Color::Red)
    } else {
        Style::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UiConfig;
    use crate::state::{Action, View};
    use ratatui::{Terminal, backend::TestBackend};
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn store() -> Store {
        let (tx, _rx) = mpsc::unbounded_channel();
        Store::new(tx, &UiConfig::default(), Duration::from_secs(300))
    }

    fn draw(store: &Store) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 20)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                PairTable::render(frame, area, store);
            })
            .unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_loading_placeholder_before_first_refresh() {
        let store = store();
        assert!(draw(&store).contains("Loading..."));
    }

    #[test]
    fn test_empty_placeholder_after_refresh() {
        let mut store = store();
        let mut state = store.dashboard.clone();
        state.initialized = true;
        state.error = Some("Network down".to_string());
        store.reduce(Action::DashboardUpdated(state));

        let screen = draw(&store);
        assert!(screen.contains("No data available"));
        assert!(screen.contains("Network down"));
    }

    #[test]
    fn test_rows_and_sort_arrow() {
        let mut store = store();
        let mut state = store.dashboard.clone();
        state.initialized = true;
        state.pair_rows = vec![ArbiPairRow {
            pair: "BTC/USDT".to_string(),
            min_exchange: "Kraken".to_string(),
            profit_percentage: Decimal::new(125, 2),
            ..Default::default()
        }];
        store.reduce(Action::DashboardUpdated(state));
        store.reduce(Action::SetView(View::Pairs));

        let screen = draw(&store);
        assert!(screen.contains("BTC/USDT"));
        assert!(screen.contains("1.25%"));
        assert!(screen.contains("Profit % ▼"));
        assert!(screen.contains("Page 1/1"));
    }
}
