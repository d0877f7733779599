//! Advanced filter expression builder
//!
//! Keeps the ordered list of condition rows shown in the advanced filter
//! dialog and turns the complete ones into a [`FilterSet`].

use serde::{Deserialize, Serialize};
use tablekit_core::{FilterSet, Result, TableError};

use crate::filter_types::{ConditionValue, FilterOperator, LogicalOperator};

/// A single condition row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionRow {
    /// Unique ID for this row
    pub id: usize,
    /// Column id; empty until the user picks one
    pub column_id: String,
    pub operator: FilterOperator,
    pub value: ConditionValue,
    /// Logical operator joining this row to the next one
    pub logic: LogicalOperator,
}

impl ConditionRow {
    /// Create a new empty condition row
    pub fn new(id: usize) -> Self {
        Self {
            id,
            column_id: String::new(),
            operator: FilterOperator::Equals,
            value: ConditionValue::default(),
            logic: LogicalOperator::And,
        }
    }

    /// A row counts once it names a column and carries a value its operator accepts
    pub fn is_complete(&self) -> bool {
        !self.column_id.trim().is_empty() && self.operator.to_filter_value(&self.value).is_some()
    }
}

/// Ordered list of condition rows; never empty
#[derive(Debug, Clone)]
pub struct FilterExpressionBuilder {
    rows: Vec<ConditionRow>,
    next_id: usize,
}

impl Default for FilterExpressionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterExpressionBuilder {
    pub fn new() -> Self {
        Self {
            rows: vec![ConditionRow::new(1)],
            next_id: 2,
        }
    }

    pub fn rows(&self) -> &[ConditionRow] {
        &self.rows
    }

    pub fn row(&self, id: usize) -> Option<&ConditionRow> {
        self.rows.iter().find(|row| row.id == id)
    }

    /// Append an empty row and return its id
    pub fn add_row(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        self.rows.push(ConditionRow::new(id));
        id
    }

    /// Remove a row. Refused (returns false) when it is the last remaining row.
    pub fn remove_row(&mut self, id: usize) -> bool {
        if self.rows.len() <= 1 {
            return false;
        }
        let before = self.rows.len();
        self.rows.retain(|row| row.id != id);
        self.rows.len() != before
    }

    pub fn set_column(&mut self, id: usize, column_id: impl Into<String>) {
        if let Some(row) = self.row_mut(id) {
            row.column_id = column_id.into();
        }
    }

    pub fn set_operator(&mut self, id: usize, operator: FilterOperator) {
        if let Some(row) = self.row_mut(id) {
            row.operator = operator;
        }
    }

    /// Set the operator from its key; unknown keys become `equals`
    pub fn set_operator_key(&mut self, id: usize, key: &str) {
        self.set_operator(id, FilterOperator::parse(key));
    }

    pub fn set_value(&mut self, id: usize, value: ConditionValue) {
        if let Some(row) = self.row_mut(id) {
            row.value = value;
        }
    }

    pub fn set_logic(&mut self, id: usize, logic: LogicalOperator) {
        if let Some(row) = self.row_mut(id) {
            row.logic = logic;
        }
    }

    /// Back to a single empty row
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Rows that will contribute to the filter set
    pub fn complete_rows(&self) -> impl Iterator<Item = &ConditionRow> {
        self.rows.iter().filter(|row| row.is_complete())
    }

    /// Build the filter set from all complete rows.
    ///
    /// Rows are keyed by column, so a later row on the same column replaces an
    /// earlier one. The AND/OR logic of each row is kept for display only; the
    /// listing endpoint combines column filters conjunctively.
    pub fn build_filter_set(&self) -> Result<FilterSet> {
        let mut filters = FilterSet::new();
        for row in &self.rows {
            if row.column_id.trim().is_empty() {
                continue;
            }
            if let Some(value) = row.operator.to_filter_value(&row.value) {
                filters.insert(row.column_id.trim().to_string(), value);
            }
        }

        if filters.is_empty() {
            return Err(TableError::Validation(
                "Please add at least one valid filter condition".to_string(),
            ));
        }

        tracing::debug!(conditions = filters.len(), "built advanced filter set");
        Ok(filters)
    }

    fn row_mut(&mut self, id: usize) -> Option<&mut ConditionRow> {
        self.rows.iter_mut().find(|row| row.id == id)
    }
}
