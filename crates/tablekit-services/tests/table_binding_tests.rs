//! Tests for the table render model

mod common;

use std::sync::Arc;

use serde_json::{json, Value};
use tablekit_core::{ColumnDef, SortCriterion, TableError, ViewState};
use tablekit_services::{
    QueryResult, QueryState, TableBinding, TableBody, EMPTY_MESSAGE, SKELETON_ROWS,
};

use common::{row, user_rows};

fn binding() -> TableBinding {
    TableBinding::new(vec![
        ColumnDef::new("id", "ID"),
        ColumnDef::new("name", "Name"),
        ColumnDef::new("status", "Status"),
    ])
}

fn loaded(rows: Vec<tablekit_core::Row>, total_count: u64) -> QueryState {
    QueryState {
        result: Some(Arc::new(QueryResult { rows, total_count })),
        ..Default::default()
    }
}

#[test]
fn loading_placeholder_only_without_previous_result() {
    let fetching = QueryState {
        is_fetching: true,
        ..Default::default()
    };
    let view = binding().render(&ViewState::default(), &fetching);
    assert_eq!(
        view.body,
        TableBody::Loading {
            skeleton_rows: SKELETON_ROWS
        }
    );

    let mut refetching = loaded(user_rows(1, 2), 2);
    refetching.is_fetching = true;
    let view = binding().render(&ViewState::default(), &refetching);
    assert!(matches!(view.body, TableBody::Rows { ref rows } if rows.len() == 2));
}

#[test]
fn empty_state_is_distinct() {
    let view = binding().render(&ViewState::default(), &loaded(vec![], 0));
    assert_eq!(
        view.body,
        TableBody::Empty {
            message: EMPTY_MESSAGE.to_string()
        }
    );
    assert_eq!(view.footer.page_count, 0);
    assert!(!view.footer.can_next);
}

#[test]
fn error_without_result_shows_error_body() {
    let failed = QueryState {
        is_error: true,
        error: Some(TableError::Network("timeout".into())),
        ..Default::default()
    };
    let view = binding().render(&ViewState::default(), &failed);
    assert!(matches!(view.body, TableBody::Error { ref message } if message.contains("timeout")));
    assert!(view.error_banner.is_none());
}

#[test]
fn error_with_result_keeps_rows_and_shows_banner() {
    let mut state = loaded(user_rows(1, 1), 1);
    state.is_error = true;
    state.error = Some(TableError::Network("timeout".into()));

    let view = binding().render(&ViewState::default(), &state);
    assert!(matches!(view.body, TableBody::Rows { .. }));
    assert!(view.error_banner.unwrap().contains("timeout"));
}

#[test]
fn page_count_uses_total_count_not_row_count() {
    let mut view_state = ViewState::default();
    view_state.pagination.page_number = 2;

    let view = binding().render(&view_state, &loaded(user_rows(11, 10), 45));
    assert_eq!(view.footer.page_count, 5);
    assert_eq!(view.footer.row_count, 10);
    assert_eq!(view.footer.total_count, 45);
    assert!(view.footer.can_previous);
    assert!(view.footer.can_next);
    assert_eq!(view.footer.page_size_options, vec![10, 20, 30, 40, 50]);
}

#[test]
fn hidden_columns_are_not_rendered() {
    let mut view_state = ViewState::default();
    view_state.column_visibility.insert("status".into(), false);

    let state = loaded(vec![row(json!({"id": 1, "name": "Ada", "status": "active"}))], 1);
    let view = binding().render(&view_state, &state);

    let ids: Vec<_> = view.columns.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["id", "name"]);

    let TableBody::Rows { rows } = view.body else {
        panic!("expected rows");
    };
    assert_eq!(rows[0].cells, vec![json!(1), json!("Ada")]);
}

#[test]
fn missing_cells_render_as_null() {
    let state = loaded(vec![row(json!({"id": 1}))], 1);
    let view = binding().render(&ViewState::default(), &state);
    let TableBody::Rows { rows } = view.body else {
        panic!("expected rows");
    };
    assert_eq!(rows[0].cells, vec![json!(1), Value::Null, Value::Null]);
}

#[test]
fn headers_show_sort_position() {
    let mut view_state = ViewState::default();
    view_state.sort = vec![SortCriterion::desc("name"), SortCriterion::asc("id")];

    let view = binding().render(&view_state, &loaded(vec![], 0));
    let name = view.columns.iter().find(|c| c.id == "name").unwrap();
    assert!(name.sort.unwrap().is_descending());
    assert_eq!(name.sort_index, Some(1));
    let status = view.columns.iter().find(|c| c.id == "status").unwrap();
    assert_eq!(status.sort, None);
}
