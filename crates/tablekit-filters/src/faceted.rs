//! Faceted and date filter controls

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tablekit_core::{ColumnDef, FilterValue, Row, TableError};

/// A selectable choice of a faceted filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub label: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl FilterOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            count: None,
        }
    }
}

/// Configured faceted filter control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetedFilterConfig {
    pub column_id: String,
    pub title: String,
    #[serde(default)]
    pub options: Vec<FilterOption>,
}

/// Keep the faceted filters whose column exists.
///
/// A filter referencing an unknown column is logged and skipped; the rest of
/// the table keeps working.
pub fn resolve_faceted_filters<'a>(
    configs: &'a [FacetedFilterConfig],
    columns: &[ColumnDef],
) -> Vec<&'a FacetedFilterConfig> {
    configs
        .iter()
        .filter(|config| match resolve_column(&config.column_id, columns) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "skipping faceted filter");
                false
            }
        })
        .collect()
}

fn resolve_column(column_id: &str, columns: &[ColumnDef]) -> Result<(), TableError> {
    if columns.iter().any(|column| column.id == column_id) {
        return Ok(());
    }
    Err(TableError::ColumnResolution {
        column: column_id.to_string(),
        available: columns.iter().map(|column| column.id.clone()).collect(),
    })
}

/// Options to show for a faceted filter.
///
/// Configured options are used as-is; without any, options are derived from
/// the distinct values of the column in `rows`, with occurrence counts.
pub fn effective_options(config: &FacetedFilterConfig, rows: &[Row]) -> Vec<FilterOption> {
    if !config.options.is_empty() {
        return config.options.clone();
    }
    facet_counts(rows, &config.column_id)
        .into_iter()
        .map(|(value, count)| FilterOption {
            label: value.clone(),
            value,
            count: Some(count),
        })
        .collect()
}

/// Distinct values of a column with their counts, in first-seen order
pub fn facet_counts(rows: &[Row], column_id: &str) -> IndexMap<String, usize> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for row in rows {
        let Some(value) = row.get(column_id) else {
            continue;
        };
        let key = match value {
            serde_json::Value::Null => continue,
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

/// Toggle `option` in the current selection of a faceted filter.
///
/// Returns the new filter value, or `None` when nothing remains selected.
pub fn toggle_option(current: Option<&FilterValue>, option: &str) -> Option<FilterValue> {
    let mut selected = current.map(FilterValue::selected_values).unwrap_or_default();
    match selected.iter().position(|value| value == option) {
        Some(index) => {
            selected.remove(index);
        }
        None => selected.push(option.to_string()),
    }

    if selected.is_empty() {
        None
    } else {
        Some(FilterValue::List { values: selected })
    }
}

/// Filter value for the single-day date picker; `None` clears the filter
pub fn date_filter(day: Option<NaiveDate>) -> Option<FilterValue> {
    day.map(FilterValue::single_day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: serde_json::Value) -> Row {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_unknown_column_is_skipped() {
        let columns = vec![ColumnDef::new("status", "Status")];
        let configs = vec![
            FacetedFilterConfig {
                column_id: "status".into(),
                title: "Status".into(),
                options: vec![],
            },
            FacetedFilterConfig {
                column_id: "missing".into(),
                title: "Missing".into(),
                options: vec![],
            },
        ];

        let resolved = resolve_faceted_filters(&configs, &columns);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].column_id, "status");
    }

    #[test]
    fn test_toggle_adds_and_removes() {
        let value = toggle_option(None, "IT").unwrap();
        assert_eq!(value, FilterValue::list(["IT"]));

        let value = toggle_option(Some(&value), "HR").unwrap();
        assert_eq!(value, FilterValue::list(["IT", "HR"]));

        let value = toggle_option(Some(&value), "IT").unwrap();
        assert_eq!(value, FilterValue::list(["HR"]));

        assert_eq!(toggle_option(Some(&value), "HR"), None);
    }

    #[test]
    fn test_options_derived_from_rows() {
        let config = FacetedFilterConfig {
            column_id: "department".into(),
            title: "Department".into(),
            options: vec![],
        };
        let rows = vec![
            row(json!({"department": "IT"})),
            row(json!({"department": "HR"})),
            row(json!({"department": "IT"})),
            row(json!({"department": null})),
        ];

        let options = effective_options(&config, &rows);
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].value, "IT");
        assert_eq!(options[0].count, Some(2));
        assert_eq!(options[1].value, "HR");
        assert_eq!(options[1].count, Some(1));
    }

    #[test]
    fn test_date_filter_clears_on_none() {
        assert_eq!(date_filter(None), None);
        let day = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert!(matches!(
            date_filter(Some(day)),
            Some(FilterValue::DateRange { .. })
        ));
    }
}
