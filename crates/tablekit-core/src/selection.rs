//! Row selection for bulk actions
//!
//! Selection is keyed by row id and scoped to the page on display. Loading
//! a page with different rows clears it.

use indexmap::IndexSet;
use serde_json::Value;

use crate::types::Row;

/// Column read for row ids unless configured otherwise
pub const DEFAULT_ROW_ID_COLUMN: &str = "id";

/// Tri-state of the header checkbox in the `select` pseudo-column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    Unchecked,
    Indeterminate,
    Checked,
}

#[derive(Debug, Clone)]
pub struct RowSelection {
    id_column: String,
    page_ids: Vec<String>,
    selected: IndexSet<String>,
}

impl Default for RowSelection {
    fn default() -> Self {
        Self::new(DEFAULT_ROW_ID_COLUMN)
    }
}

impl RowSelection {
    pub fn new(id_column: impl Into<String>) -> Self {
        Self {
            id_column: id_column.into(),
            page_ids: Vec::new(),
            selected: IndexSet::new(),
        }
    }

    pub fn id_column(&self) -> &str {
        &self.id_column
    }

    /// Ids of the rows on the current page, in display order
    pub fn page_ids(&self) -> &[String] {
        &self.page_ids
    }

    /// Replace the current page's rows. Rows without an id cannot be selected.
    pub fn replace_rows(&mut self, rows: &[Row]) {
        let ids: Vec<String> = rows
            .iter()
            .filter_map(|row| row_id(row, &self.id_column))
            .collect();
        if ids == self.page_ids {
            return;
        }
        if !self.selected.is_empty() {
            tracing::debug!(cleared = self.selected.len(), "page rows replaced, clearing selection");
        }
        self.page_ids = ids;
        self.selected.clear();
    }

    /// Flip one row. Ids not on the current page are ignored.
    pub fn toggle_item(&mut self, id: &str) -> bool {
        if !self.page_ids.iter().any(|page_id| page_id == id) {
            tracing::debug!(id, "ignoring selection of a row not on the page");
            return false;
        }
        if self.selected.shift_remove(id) {
            false
        } else {
            self.selected.insert(id.to_string());
            true
        }
    }

    /// Select every row on the page, or none if all were already selected
    pub fn toggle_all(&mut self) {
        if self.is_all_selected() {
            self.selected.clear();
        } else {
            self.selected = self.page_ids.iter().cloned().collect();
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn is_all_selected(&self) -> bool {
        !self.page_ids.is_empty() && self.selected.len() == self.page_ids.len()
    }

    pub fn is_indeterminate(&self) -> bool {
        !self.selected.is_empty() && self.selected.len() < self.page_ids.len()
    }

    pub fn state(&self) -> SelectionState {
        if self.is_all_selected() {
            SelectionState::Checked
        } else if self.is_indeterminate() {
            SelectionState::Indeterminate
        } else {
            SelectionState::Unchecked
        }
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Selected ids in the order they were selected
    pub fn selected_ids(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }
}

fn row_id(row: &Row, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}
