//! View state and its controller
//!
//! `ViewState` is the canonical snapshot of what the user wants to see.
//! Every transition is a pure function of the previous state and a
//! [`ViewAction`]; [`ViewStateController`] owns the current value and exposes
//! the named mutators used by the table controls.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ColumnFilter, FilterSet, FilterValue, Pagination, Result, SortCriterion, TableError};

/// Canonical snapshot of search, filters, sort, pagination and visibility
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewState {
    pub search_query: String,
    pub column_filters: Vec<ColumnFilter>,
    pub sort: Vec<SortCriterion>,
    pub pagination: Pagination,
    pub column_visibility: BTreeMap<String, bool>,
}

/// A single state transition
#[derive(Debug, Clone, PartialEq)]
pub enum ViewAction {
    SetSearch(String),
    SetColumnFilter {
        column_id: String,
        value: Option<FilterValue>,
    },
    SetSort(Vec<SortCriterion>),
    /// Add a criterion, or update its direction in place when the column is already sorted
    UpsertSort(SortCriterion),
    RemoveSort(String),
    SetPage(u32),
    SetPageSize(u32),
    SetColumnVisibility {
        column_id: String,
        visible: bool,
    },
    /// Replace the whole column filter set
    ApplyFilterSet(FilterSet),
}

impl ViewAction {
    /// Whether this action changes the shape of the result set.
    /// Such actions move the cursor back to the first page.
    pub fn resets_page(&self) -> bool {
        !matches!(self, Self::SetPage(_) | Self::SetColumnVisibility { .. })
    }
}

impl ViewState {
    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            pagination: Pagination::new(1, page_size),
            ..Self::default()
        }
    }

    /// Apply `action` and return the resulting state
    pub fn reduce(&self, action: ViewAction) -> ViewState {
        let mut next = self.clone();
        let resets_page = action.resets_page();

        match action {
            ViewAction::SetSearch(query) => next.search_query = query,
            ViewAction::SetColumnFilter { column_id, value } => {
                next.column_filters = upsert_filter(&self.column_filters, column_id, value);
            }
            ViewAction::SetSort(criteria) => next.sort = dedupe_sort(criteria),
            ViewAction::UpsertSort(criterion) => {
                let mut criteria = self.sort.clone();
                criteria.push(criterion);
                next.sort = dedupe_sort(criteria);
            }
            ViewAction::RemoveSort(column_id) => {
                next.sort.retain(|criterion| criterion.column_id != column_id);
            }
            ViewAction::SetPage(page_number) => {
                next.pagination.page_number = page_number.max(1);
            }
            ViewAction::SetPageSize(page_size) => {
                next.pagination.page_size = page_size.max(1);
            }
            ViewAction::SetColumnVisibility { column_id, visible } => {
                next.column_visibility.insert(column_id, visible);
            }
            ViewAction::ApplyFilterSet(filters) => {
                next.column_filters = filters
                    .into_iter()
                    .map(|(column_id, value)| ColumnFilter { column_id, value })
                    .collect();
            }
        }

        if resets_page {
            next.pagination.page_number = 1;
        }
        next
    }

    /// Column filters as a set keyed by column id; later entries win
    pub fn filter_set(&self) -> FilterSet {
        let mut set = FilterSet::new();
        for filter in &self.column_filters {
            set.insert(filter.column_id.clone(), filter.value.clone());
        }
        set
    }

    pub fn column_filter(&self, column_id: &str) -> Option<&FilterValue> {
        self.column_filters
            .iter()
            .rev()
            .find(|filter| filter.column_id == column_id)
            .map(|filter| &filter.value)
    }

    /// Columns are visible unless explicitly hidden
    pub fn is_column_visible(&self, column_id: &str) -> bool {
        self.column_visibility.get(column_id).copied().unwrap_or(true)
    }

    pub fn sort_for(&self, column_id: &str) -> Option<&SortCriterion> {
        self.sort.iter().find(|criterion| criterion.column_id == column_id)
    }
}

fn upsert_filter(
    filters: &[ColumnFilter],
    column_id: String,
    value: Option<FilterValue>,
) -> Vec<ColumnFilter> {
    let mut next: Vec<ColumnFilter> = Vec::with_capacity(filters.len() + 1);
    let mut value = value;

    for filter in filters {
        if filter.column_id != column_id {
            next.push(filter.clone());
            continue;
        }
        // First occurrence keeps its position; duplicates collapse into it.
        if let Some(value) = value.take() {
            next.push(ColumnFilter {
                column_id: column_id.clone(),
                value,
            });
        }
    }

    if let Some(value) = value {
        next.push(ColumnFilter { column_id, value });
    }
    next
}

/// Collapse repeated columns: the first position is kept, the last direction wins
fn dedupe_sort(criteria: Vec<SortCriterion>) -> Vec<SortCriterion> {
    let mut deduped: Vec<SortCriterion> = Vec::with_capacity(criteria.len());
    for criterion in criteria {
        if criterion.column_id.is_empty() {
            continue;
        }
        match deduped
            .iter_mut()
            .find(|existing| existing.column_id == criterion.column_id)
        {
            Some(existing) => existing.descending = criterion.descending,
            None => deduped.push(criterion),
        }
    }
    deduped
}

/// Owner of the current [`ViewState`]
#[derive(Debug, Clone, Default)]
pub struct ViewStateController {
    state: ViewState,
    initial_filters: FilterSet,
}

impl ViewStateController {
    pub fn new(state: ViewState) -> Self {
        Self {
            state,
            initial_filters: FilterSet::new(),
        }
    }

    /// Start from configured initial filters; `reset_column_filters` returns to them
    pub fn with_initial_filters(mut state: ViewState, initial_filters: FilterSet) -> Self {
        state = state.reduce(ViewAction::ApplyFilterSet(initial_filters.clone()));
        Self {
            state,
            initial_filters,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn initial_filters(&self) -> &FilterSet {
        &self.initial_filters
    }

    pub fn dispatch(&mut self, action: ViewAction) {
        tracing::trace!(?action, "view state transition");
        self.state = self.state.reduce(action);
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.dispatch(ViewAction::SetSearch(query.into()));
    }

    /// `None` removes the filter on that column
    pub fn set_column_filter(&mut self, column_id: impl Into<String>, value: Option<FilterValue>) {
        self.dispatch(ViewAction::SetColumnFilter {
            column_id: column_id.into(),
            value,
        });
    }

    pub fn set_sort(&mut self, criteria: Vec<SortCriterion>) {
        self.dispatch(ViewAction::SetSort(criteria));
    }

    pub fn upsert_sort(&mut self, criterion: SortCriterion) {
        self.dispatch(ViewAction::UpsertSort(criterion));
    }

    pub fn remove_sort(&mut self, column_id: impl Into<String>) {
        self.dispatch(ViewAction::RemoveSort(column_id.into()));
    }

    pub fn clear_sort(&mut self) {
        self.dispatch(ViewAction::SetSort(Vec::new()));
    }

    pub fn set_page(&mut self, page_number: u32) {
        self.dispatch(ViewAction::SetPage(page_number));
    }

    pub fn set_page_size(&mut self, page_size: u32) -> Result<()> {
        if page_size == 0 {
            return Err(TableError::Validation(
                "Page size must be greater than zero".to_string(),
            ));
        }
        self.dispatch(ViewAction::SetPageSize(page_size));
        Ok(())
    }

    pub fn set_column_visibility(&mut self, column_id: impl Into<String>, visible: bool) {
        self.dispatch(ViewAction::SetColumnVisibility {
            column_id: column_id.into(),
            visible,
        });
    }

    /// Replace every column filter with `filters`
    pub fn apply_filter_set(&mut self, filters: FilterSet) {
        self.dispatch(ViewAction::ApplyFilterSet(filters));
    }

    /// Return to the configured initial filters, or no filters at all
    pub fn reset_column_filters(&mut self) {
        self.apply_filter_set(self.initial_filters.clone());
    }

    /// Whether the current filters differ from the initial filter set
    pub fn has_user_filters(&self) -> bool {
        self.state.filter_set() != self.initial_filters
    }

    pub fn first_page(&mut self) {
        self.set_page(1);
    }

    pub fn previous_page(&mut self) {
        let page = self.state.pagination.page_number.saturating_sub(1);
        self.set_page(page);
    }

    /// Advance one page, never past `page_count`
    pub fn next_page(&mut self, page_count: u64) {
        let current = self.state.pagination.page_number;
        if u64::from(current) < page_count {
            self.set_page(current + 1);
        }
    }

    pub fn last_page(&mut self, page_count: u64) {
        let last = u32::try_from(page_count).unwrap_or(u32::MAX).max(1);
        self.set_page(last);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn controller_on_page(page: u32) -> ViewStateController {
        let mut controller = ViewStateController::default();
        controller.set_page(page);
        controller
    }

    #[test]
    fn test_result_shape_changes_reset_page() {
        let mut controller = controller_on_page(4);
        controller.set_column_filter("status", Some(FilterValue::literal("active")));
        assert_eq!(controller.state().pagination.page_number, 1);

        controller.set_page(3);
        controller.set_sort(vec![SortCriterion::asc("name")]);
        assert_eq!(controller.state().pagination.page_number, 1);

        controller.set_page(3);
        controller.set_page_size(50).unwrap();
        assert_eq!(controller.state().pagination.page_number, 1);
        assert_eq!(controller.state().pagination.page_size, 50);

        controller.set_page(3);
        controller.set_search("laptop");
        assert_eq!(controller.state().pagination.page_number, 1);

        controller.set_page(3);
        controller.apply_filter_set(FilterSet::new());
        assert_eq!(controller.state().pagination.page_number, 1);
    }

    #[test]
    fn test_visibility_keeps_page() {
        let mut controller = controller_on_page(5);
        controller.set_column_visibility("email", false);
        assert_eq!(controller.state().pagination.page_number, 5);
        assert!(!controller.state().is_column_visible("email"));
        assert!(controller.state().is_column_visible("name"));
    }

    #[test]
    fn test_set_page_clamps_to_one() {
        let mut controller = controller_on_page(0);
        assert_eq!(controller.state().pagination.page_number, 1);
        controller.previous_page();
        assert_eq!(controller.state().pagination.page_number, 1);
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        let mut controller = controller_on_page(2);
        let err = controller.set_page_size(0).unwrap_err();
        assert!(matches!(err, TableError::Validation(_)));
        assert_eq!(controller.state().pagination.page_number, 2);
    }

    #[test]
    fn test_apply_filter_set_replaces() {
        let mut controller = ViewStateController::default();
        controller.set_column_filter("department", Some(FilterValue::literal("IT")));

        let mut filters = FilterSet::new();
        filters.insert("location".into(), FilterValue::literal("Main Office"));
        filters.insert("category".into(), FilterValue::list(["A", "B"]));
        controller.apply_filter_set(filters.clone());

        assert_eq!(controller.state().filter_set(), filters);
        assert_eq!(controller.state().column_filters.len(), 2);
    }

    #[test]
    fn test_clearing_a_filter_removes_it() {
        let mut controller = ViewStateController::default();
        controller.set_column_filter("status", Some(FilterValue::literal("active")));
        controller.set_column_filter("status", None);
        assert!(controller.state().column_filters.is_empty());
        assert_eq!(controller.state().column_filter("status"), None);
    }

    #[test]
    fn test_set_column_filter_replaces_in_place() {
        let mut controller = ViewStateController::default();
        controller.set_column_filter("a", Some(FilterValue::literal("1")));
        controller.set_column_filter("b", Some(FilterValue::literal("2")));
        controller.set_column_filter("a", Some(FilterValue::literal("3")));

        let ids: Vec<_> = controller
            .state()
            .column_filters
            .iter()
            .map(|f| f.column_id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(
            controller.state().column_filter("a"),
            Some(&FilterValue::literal("3"))
        );
    }

    #[test]
    fn test_sort_has_no_duplicate_columns() {
        let mut controller = ViewStateController::default();
        controller.set_sort(vec![SortCriterion::asc("name")]);
        controller.set_sort(vec![SortCriterion::desc("name")]);
        assert_eq!(controller.state().sort, vec![SortCriterion::desc("name")]);

        controller.set_sort(vec![
            SortCriterion::asc("name"),
            SortCriterion::asc("age"),
            SortCriterion::desc("name"),
        ]);
        assert_eq!(
            controller.state().sort,
            vec![SortCriterion::desc("name"), SortCriterion::asc("age")]
        );
    }

    #[test]
    fn test_upsert_sort_updates_in_place() {
        let mut controller = ViewStateController::default();
        controller.upsert_sort(SortCriterion::asc("name"));
        controller.upsert_sort(SortCriterion::asc("age"));
        controller.upsert_sort(SortCriterion::desc("name"));
        assert_eq!(
            controller.state().sort,
            vec![SortCriterion::desc("name"), SortCriterion::asc("age")]
        );

        controller.remove_sort("name");
        assert_eq!(controller.state().sort, vec![SortCriterion::asc("age")]);
    }

    #[test]
    fn test_reset_returns_to_initial_filters() {
        let mut initial = FilterSet::new();
        initial.insert("status".into(), FilterValue::literal("open"));
        let mut controller =
            ViewStateController::with_initial_filters(ViewState::default(), initial.clone());
        assert!(!controller.has_user_filters());

        controller.set_column_filter("owner", Some(FilterValue::literal("me")));
        assert!(controller.has_user_filters());

        controller.reset_column_filters();
        assert_eq!(controller.state().filter_set(), initial);
        assert!(!controller.has_user_filters());
    }

    #[test]
    fn test_page_navigation_is_clamped() {
        let mut controller = ViewStateController::default();
        controller.next_page(2);
        assert_eq!(controller.state().pagination.page_number, 2);
        controller.next_page(2);
        assert_eq!(controller.state().pagination.page_number, 2);
        controller.last_page(0);
        assert_eq!(controller.state().pagination.page_number, 1);
        controller.last_page(7);
        assert_eq!(controller.state().pagination.page_number, 7);
        controller.first_page();
        assert_eq!(controller.state().pagination.page_number, 1);
    }

    #[test]
    fn test_reduce_is_pure() {
        let state = ViewState::default();
        let next = state.reduce(ViewAction::SetSearch("abc".into()));
        assert_eq!(state.search_query, "");
        assert_eq!(next.search_query, "abc");
    }
}
