//! Client-side sort, filter and pagination for tabular data.
//!
//! A [`TableView`] holds only presentation state (sort column, page, page
//! size, search query). The rows themselves stay with their owner and are
//! borrowed when a page is computed, so a refresh never has to touch the
//! view.

use std::cmp::Ordering;
use std::fmt::{Debug, Display};
use std::marker::PhantomData;

/// A row type that can be shown in a [`TableView`].
pub trait TableRow {
    /// Column identifier.
    type Column: Copy + Eq + Debug + Display + 'static;

    /// All sortable columns, in display order.
    const COLUMNS: &'static [Self::Column];

    /// Column sorted on by default (descending).
    const DEFAULT_SORT: Self::Column;

    /// Ascending comparison by `column`.
    fn compare_by(&self, other: &Self, column: Self::Column) -> Ordering;

    /// Whether the row matches an already lower-cased search query.
    fn matches(&self, query_lower: &str) -> bool;
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            Self::Ascending => "▲",
            Self::Descending => "▼",
        }
    }
}

/// Page sizes offered by the pair table.
pub const PAIR_PAGE_SIZES: &[usize] = &[10, 20, 30, 40];

/// Page sizes offered by the track table.
pub const TRACK_PAGE_SIZES: &[usize] = &[10, 20];

/// What the table body should show.
#[derive(Debug, PartialEq)]
pub enum TableBody<'a, R> {
    /// No rows yet and data is still loading.
    Loading,
    /// Loaded, but nothing to show.
    Empty,
    /// Rows of the current page.
    Rows(Vec<&'a R>),
}

/// One computed page of a table.
#[derive(Debug, PartialEq)]
pub struct TablePage<'a, R> {
    pub body: TableBody<'a, R>,
    /// Zero-based page actually shown (clamped).
    pub page: usize,
    /// Always at least 1.
    pub page_count: usize,
    /// Rows matching the current filter.
    pub total: usize,
}

/// Presentation state for a table of `R`.
#[derive(Debug, Clone)]
pub struct TableView<R: TableRow> {
    pub sort_column: R::Column,
    pub direction: SortDirection,
    pub page_size: usize,
    page_sizes: &'static [usize],
    /// Zero-based current page.
    pub page: usize,
    pub query: Option<String>,
    _rows: PhantomData<fn() -> R>,
}

impl<R: TableRow> TableView<R> {
    /// Create a view offering `page_sizes`. An initial size that is not on
    /// offer falls back to the first option.
    pub fn new(page_sizes: &'static [usize], initial_page_size: usize) -> Self {
        let page_size = if page_sizes.contains(&initial_page_size) {
            initial_page_size
        } else {
            page_sizes.first().copied().unwrap_or(10)
        };

        Self {
            sort_column: R::DEFAULT_SORT,
            direction: SortDirection::Descending,
            page_size,
            page_sizes,
            page: 0,
            query: None,
            _rows: PhantomData,
        }
    }

    pub fn page_sizes(&self) -> &'static [usize] {
        self.page_sizes
    }

    /// Header click: a new column sorts ascending, the same column flips.
    pub fn sort_by(&mut self, column: R::Column) {
        if self.sort_column == column {
            self.direction = self.direction.flipped();
        } else {
            self.sort_column = column;
            self.direction = SortDirection::Ascending;
        }
        self.page = 0;
    }

    /// Move the sort to the next column in display order.
    pub fn cycle_sort_column(&mut self) {
        let columns = R::COLUMNS;
        let current = columns
            .iter()
            .position(|c| *c == self.sort_column)
            .unwrap_or(0);
        let next = columns[(current + 1) % columns.len()];
        self.sort_by(next);
    }

    pub fn flip_direction(&mut self) {
        self.direction = self.direction.flipped();
        self.page = 0;
    }

    /// Change the page size if it is on offer. Resets to the first page.
    pub fn set_page_size(&mut self, size: usize) -> bool {
        if !self.page_sizes.contains(&size) {
            return false;
        }
        self.page_size = size;
        self.page = 0;
        true
    }

    pub fn cycle_page_size(&mut self) {
        let current = self
            .page_sizes
            .iter()
            .position(|s| *s == self.page_size)
            .unwrap_or(0);
        let next = self.page_sizes[(current + 1) % self.page_sizes.len()];
        self.set_page_size(next);
    }

    /// Set or clear the search query. Resets to the first page.
    pub fn set_query(&mut self, query: Option<String>) {
        self.query = query.filter(|q| !q.trim().is_empty());
        self.page = 0;
    }

    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size).max(1)
    }

    pub fn next_page(&mut self, total: usize) {
        if self.page + 1 < self.page_count(total) {
            self.page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    /// Keep the current page in range after the row count changed.
    pub fn clamp_page(&mut self, total: usize) {
        self.page = self.page.min(self.page_count(total) - 1);
    }

    /// Filtered and sorted rows.
    pub fn visible<'a>(&self, rows: &'a [R]) -> Vec<&'a R> {
        let query = self.query.as_ref().map(|q| q.to_lowercase());
        let mut visible: Vec<&R> = rows
            .iter()
            .filter(|row| query.as_deref().is_none_or(|q| row.matches(q)))
            .collect();

        let column = self.sort_column;
        visible.sort_by(|a, b| {
            let ord = a.compare_by(b, column);
            match self.direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });
        visible
    }

    /// Compute the current page of `rows`.
    pub fn page_of<'a>(&self, rows: &'a [R], loading: bool) -> TablePage<'a, R> {
        let visible = self.visible(rows);
        let total = visible.len();
        let page_count = self.page_count(total);
        let page = self.page.min(page_count - 1);

        let body = if total == 0 {
            if loading && rows.is_empty() {
                TableBody::Loading
            } else {
                TableBody::Empty
            }
        } else {
            TableBody::Rows(
                visible
                    .into_iter()
                    .skip(page * self.page_size)
                    .take(self.page_size)
                    .collect(),
            )
        };

        TablePage {
            body,
            page,
            page_count,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ArbiPairRow, ArbiTrackRow, PairColumn, TrackColumn};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn pair(name: &str, profit: i64) -> ArbiPairRow {
        ArbiPairRow {
            pair: name.to_string(),
            profit_percentage: Decimal::from(profit),
            ..Default::default()
        }
    }

    fn names(page: &TablePage<'_, ArbiPairRow>) -> Vec<String> {
        match &page.body {
            TableBody::Rows(rows) => rows.iter().map(|r| r.pair.clone()).collect(),
            _ => Vec::new(),
        }
    }

    #[test]
    fn test_default_sort_is_profit_descending() {
        let rows = vec![pair("A", 1), pair("B", 3), pair("C", 2)];
        let view = TableView::<ArbiPairRow>::new(PAIR_PAGE_SIZES, 10);

        let page = view.page_of(&rows, false);
        assert_eq!(names(&page), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_header_click_toggles() {
        let rows = vec![pair("b", 1), pair("a", 2), pair("c", 3)];
        let mut view = TableView::<ArbiPairRow>::new(PAIR_PAGE_SIZES, 10);

        view.sort_by(PairColumn::Pair);
        assert_eq!(view.direction, SortDirection::Ascending);
        assert_eq!(names(&view.page_of(&rows, false)), vec!["a", "b", "c"]);

        view.sort_by(PairColumn::Pair);
        assert_eq!(names(&view.page_of(&rows, false)), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_pagination_and_clamping() {
        let rows: Vec<_> = (0..25).map(|i| pair(&format!("P{:02}", i), i)).collect();
        let mut view = TableView::<ArbiPairRow>::new(PAIR_PAGE_SIZES, 10);

        assert_eq!(view.page_count(rows.len()), 3);
        view.next_page(rows.len());
        view.next_page(rows.len());
        view.next_page(rows.len());
        assert_eq!(view.page, 2);

        let page = view.page_of(&rows, false);
        assert_eq!(names(&page), vec!["P04", "P03", "P02", "P01", "P00"]);

        // A smaller refresh shrinks the page range.
        let fewer = &rows[..8];
        let page = view.page_of(fewer, false);
        assert_eq!(page.page, 0);
        assert_eq!(page.page_count, 1);
        view.clamp_page(fewer.len());
        assert_eq!(view.page, 0);
    }

    #[test]
    fn test_page_size_options() {
        let mut view = TableView::<ArbiTrackRow>::new(TRACK_PAGE_SIZES, 30);
        assert_eq!(view.page_size, 10);

        assert!(!view.set_page_size(40));
        view.page = 1;
        assert!(view.set_page_size(20));
        assert_eq!(view.page, 0);

        view.cycle_page_size();
        assert_eq!(view.page_size, 10);

        let mut pairs = TableView::<ArbiPairRow>::new(PAIR_PAGE_SIZES, 40);
        pairs.cycle_page_size();
        assert_eq!(pairs.page_size, 10);
    }

    #[test]
    fn test_placeholder_bodies() {
        let view = TableView::<ArbiPairRow>::new(PAIR_PAGE_SIZES, 10);
        assert_eq!(view.page_of(&[], true).body, TableBody::Loading);
        assert_eq!(view.page_of(&[], false).body, TableBody::Empty);

        let mut filtered = view.clone();
        filtered.set_query(Some("zzz".to_string()));
        let rows = vec![pair("ETH/BTC", 1)];
        assert_eq!(filtered.page_of(&rows, true).body, TableBody::Empty);
    }

    #[test]
    fn test_cycle_sort_column_wraps() {
        let mut view = TableView::<ArbiTrackRow>::new(TRACK_PAGE_SIZES, 10);
        assert_eq!(view.sort_column, TrackColumn::Profit);
        view.cycle_sort_column();
        assert_eq!(view.sort_column, TrackColumn::Coin);
        assert_eq!(view.direction, SortDirection::Ascending);
    }
}
