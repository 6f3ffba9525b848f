//! In-memory table model with sort and search
//!
//! Operates on displayed text only: sorting compares the rendered cell
//! text and filtering matches the rendered row text. Rendering lives in
//! `crate::ui`, so everything here is plain data.

pub mod collate;
pub mod export;
pub mod load;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("column {column} is out of range for row {row} ({width} cells)")]
    InvalidColumnIndex {
        column: usize,
        row: usize,
        width: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    cells: Vec<String>,
    visible: bool,
}

impl Row {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells, visible: true }
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn cell(&self, column: usize) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Full row text as used by search
    pub fn text(&self) -> String {
        self.cells.join(" ")
    }

    fn matches(&self, needle: &str) -> bool {
        needle.is_empty() || self.text().to_lowercase().contains(needle)
    }
}

/// Last applied sort
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: usize,
    pub ascending: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TableView {
    headers: Vec<String>,
    rows: Vec<Row>,
    sort: Option<SortState>,
    query: String,
}

impl TableView {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            headers,
            rows: rows.into_iter().map(Row::new).collect(),
            sort: None,
            query: String::new(),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    #[allow(dead_code)]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn visible_rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter().filter(|row| row.is_visible())
    }

    pub fn visible_len(&self) -> usize {
        self.visible_rows().count()
    }

    pub fn sort_state(&self) -> Option<SortState> {
        self.sort
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Reorder rows by the text of `column`. Stable in both directions:
    /// rows with equal text keep their previous relative order.
    /// Visibility is carried along with each row.
    pub fn sort_by(&mut self, column: usize, ascending: bool) -> Result<(), TableError> {
        if let Some((row, r)) = self
            .rows
            .iter()
            .enumerate()
            .find(|(_, r)| column >= r.cells.len())
        {
            return Err(TableError::InvalidColumnIndex {
                column,
                row,
                width: r.cells.len(),
            });
        }

        // slice::sort_by is a stable merge sort
        self.rows.sort_by(|a, b| {
            let a = a.cells[column].trim();
            let b = b.cells[column].trim();
            if ascending {
                collate::compare(a, b)
            } else {
                collate::compare(b, a)
            }
        });

        self.sort = Some(SortState { column, ascending });
        tracing::debug!(
            "Sorted {} rows by column {} ({})",
            self.rows.len(),
            column,
            if ascending { "asc" } else { "desc" }
        );
        Ok(())
    }

    /// Show rows whose text contains `query` (case-insensitive), hide the rest.
    /// An empty query shows everything.
    pub fn filter(&mut self, query: &str) {
        let needle = query.to_lowercase();
        for row in &mut self.rows {
            row.visible = row.matches(&needle);
        }
        self.query = query.to_string();
        tracing::debug!("Filter {:?} matched {} of {} rows", query, self.visible_len(), self.rows.len());
    }

    /// Position of a column given by header name or numeric index
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h == column)
            .or_else(|| column.parse().ok().filter(|&i: &usize| i < self.headers.len()))
    }

    /// Swap in freshly loaded rows, re-applying the last sort and filter.
    /// The sort follows its header by name, so added or reordered keys
    /// keep the same column sorted.
    pub fn replace_rows(&mut self, fresh: TableView) {
        let sorted_header = self
            .sort
            .map(|sort| (self.headers.get(sort.column).cloned(), sort));

        self.headers = fresh.headers;
        self.rows = fresh.rows;
        self.sort = None;

        if let Some((name, sort)) = sorted_header {
            let column = match &name {
                Some(name) => self.headers.iter().position(|h| h == name),
                None => Some(sort.column),
            };

            match column {
                Some(column) => {
                    if let Err(e) = self.sort_by(column, sort.ascending) {
                        tracing::warn!("Dropping previous sort after reload: {}", e);
                    }
                }
                None => tracing::warn!(
                    "Dropping previous sort after reload: column {:?} is gone",
                    name.unwrap_or_default()
                ),
            }
        }

        let query = std::mem::take(&mut self.query);
        self.filter(&query);
    }
}
