//! Table binding
//!
//! Combines the column set, the view state and the query state into a
//! [`TableView`]: the headers, body and pagination footer a front end draws.

use serde::Serialize;
use serde_json::Value;
use tablekit_core::{ColumnDef, Row, SortDirection, ViewState};

use crate::query_executor::QueryState;

/// Placeholder rows shown while the first page loads
pub const SKELETON_ROWS: usize = 10;
pub const EMPTY_MESSAGE: &str = "No record found.";
pub const DEFAULT_PAGE_SIZE_OPTIONS: [u32; 5] = [10, 20, 30, 40, 50];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnHeader {
    pub id: String,
    pub header: String,
    pub sortable: bool,
    pub sort: Option<SortDirection>,
    /// Position in a multi-column sort, 1-based
    pub sort_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedRow {
    /// One cell per visible column; missing values are `null`
    pub cells: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TableBody {
    Loading { skeleton_rows: usize },
    Error { message: String },
    Empty { message: String },
    Rows { rows: Vec<RenderedRow> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginationFooter {
    pub page_number: u32,
    pub page_size: u32,
    pub page_count: u64,
    pub total_count: u64,
    pub row_count: usize,
    pub can_previous: bool,
    pub can_next: bool,
    pub page_size_options: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    pub columns: Vec<ColumnHeader>,
    pub body: TableBody,
    /// Error of a refetch while an older result is still shown
    pub error_banner: Option<String>,
    pub footer: PaginationFooter,
}

impl TableView {
    pub fn is_loading(&self) -> bool {
        matches!(self.body, TableBody::Loading { .. })
    }
}

/// Binds fetched rows to a column set
#[derive(Debug, Clone)]
pub struct TableBinding {
    columns: Vec<ColumnDef>,
    page_size_options: Vec<u32>,
}

impl TableBinding {
    pub fn new(columns: Vec<ColumnDef>) -> Self {
        Self {
            columns,
            page_size_options: DEFAULT_PAGE_SIZE_OPTIONS.to_vec(),
        }
    }

    pub fn with_page_size_options(mut self, options: Vec<u32>) -> Self {
        if !options.is_empty() {
            self.page_size_options = options;
        }
        self
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Columns rendered for the current visibility settings
    pub fn visible_columns<'a>(&'a self, view: &'a ViewState) -> impl Iterator<Item = &'a ColumnDef> {
        self.columns
            .iter()
            .filter(move |column| view.is_column_visible(&column.id))
    }

    pub fn render(&self, view: &ViewState, query: &QueryState) -> TableView {
        let visible: Vec<&ColumnDef> = self.visible_columns(view).collect();

        let columns = visible
            .iter()
            .map(|column| {
                let position = view
                    .sort
                    .iter()
                    .position(|criterion| criterion.column_id == column.id);
                ColumnHeader {
                    id: column.id.clone(),
                    header: column.header.clone(),
                    sortable: column.sortable,
                    sort: position.map(|i| view.sort[i].direction()),
                    sort_index: position.filter(|_| view.sort.len() > 1).map(|i| i + 1),
                }
            })
            .collect();

        let error_message = query.error.as_ref().map(|err| err.to_string());
        let (body, error_banner) = match (&query.result, query.is_error) {
            (None, true) if !query.is_fetching => (
                TableBody::Error {
                    message: error_message.unwrap_or_default(),
                },
                None,
            ),
            // Nothing fetched yet
            (None, _) => (
                TableBody::Loading {
                    skeleton_rows: SKELETON_ROWS,
                },
                None,
            ),
            (Some(result), is_error) => {
                let body = if result.rows.is_empty() {
                    TableBody::Empty {
                        message: EMPTY_MESSAGE.to_string(),
                    }
                } else {
                    TableBody::Rows {
                        rows: result
                            .rows
                            .iter()
                            .map(|row| render_row(row, &visible))
                            .collect(),
                    }
                };
                (body, if is_error { error_message } else { None })
            }
        };

        let total_count = query.result.as_ref().map_or(0, |r| r.total_count);
        let row_count = query.result.as_ref().map_or(0, |r| r.rows.len());
        let page_count = view.pagination.page_count(total_count);
        let page_number = view.pagination.page_number;

        TableView {
            columns,
            body,
            error_banner,
            footer: PaginationFooter {
                page_number,
                page_size: view.pagination.page_size,
                page_count,
                total_count,
                row_count,
                can_previous: page_number > 1,
                can_next: u64::from(page_number) < page_count,
                page_size_options: self.page_size_options.clone(),
            },
        }
    }
}

fn render_row(row: &Row, columns: &[&ColumnDef]) -> RenderedRow {
    RenderedRow {
        cells: columns
            .iter()
            .map(|column| row.get(&column.id).cloned().unwrap_or(Value::Null))
            .collect(),
    }
}

/// Plain-text form of a cell
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
