//! Helpers for the multi-column sort editor
//!
//! Each function returns a new sort sequence for `ViewStateController::set_sort`.

use tablekit_core::{ColumnDef, SortCriterion};

/// Sortable columns that may be picked for the sort slot at `index`.
///
/// Columns already used by other slots are excluded; the slot's own column stays.
pub fn available_sort_columns<'a>(
    columns: &'a [ColumnDef],
    sort: &[SortCriterion],
    index: usize,
) -> Vec<&'a ColumnDef> {
    let own = sort.get(index).map(|criterion| criterion.column_id.as_str());
    columns
        .iter()
        .filter(|column| column.sortable)
        .filter(|column| {
            Some(column.id.as_str()) == own
                || !sort.iter().any(|criterion| criterion.column_id == column.id)
        })
        .collect()
}

/// Append a slot for the first sortable column not yet sorted (ascending)
pub fn add_sort_slot(columns: &[ColumnDef], sort: &[SortCriterion]) -> Option<Vec<SortCriterion>> {
    let column = columns.iter().find(|column| {
        column.sortable && !sort.iter().any(|criterion| criterion.column_id == column.id)
    })?;
    let mut next = sort.to_vec();
    next.push(SortCriterion::asc(column.id.clone()));
    Some(next)
}

pub fn update_sort_slot(
    sort: &[SortCriterion],
    index: usize,
    column_id: impl Into<String>,
    descending: bool,
) -> Vec<SortCriterion> {
    let mut next = sort.to_vec();
    if let Some(slot) = next.get_mut(index) {
        *slot = SortCriterion {
            column_id: column_id.into(),
            descending,
        };
    }
    next
}

pub fn remove_sort_slot(sort: &[SortCriterion], index: usize) -> Vec<SortCriterion> {
    let mut next = sort.to_vec();
    if index < next.len() {
        next.remove(index);
    }
    next
}
