//! Listing request derivation
//!
//! Turns a [`ViewState`] into the [`RequestKey`] used for caching and
//! de-duplication, and into the [`ListingRequest`] sent to the endpoint.

use std::collections::BTreeMap;

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tablekit_core::{FilterValue, Predicate, SortCriterion, ViewState};

use crate::transport::{ListingRequest, MultiSortEntry};

/// Per-table request settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableQueryConfig {
    pub table_name: String,
    /// Columns the free-text search applies to
    pub search_columns: Vec<String>,
    /// Ordering sent while the sort sequence is empty
    pub default_order: Option<SortCriterion>,
    /// Passthrough parameters; `{"showAll": "true"}` when unset
    pub additional_params: Option<Map<String, Value>>,
}

impl TableQueryConfig {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Default::default()
        }
    }

    pub fn with_search_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default_order(mut self, order: SortCriterion) -> Self {
        self.default_order = Some(order);
        self
    }

    pub fn with_additional_params(mut self, params: Map<String, Value>) -> Self {
        self.additional_params = Some(params);
        self
    }

    fn effective_additional_params(&self) -> Map<String, Value> {
        match &self.additional_params {
            Some(params) => params.clone(),
            None => {
                let mut params = Map::new();
                params.insert("showAll".to_string(), Value::String("true".to_string()));
                params
            }
        }
    }
}

/// Identity of a logical query
///
/// Two view states that produce the same key are the same query for caching
/// and de-duplication. Column visibility is not part of the key, and
/// filters are keyed by column so their insertion order does not matter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub table: String,
    pub page_number: u32,
    pub page_size: u32,
    pub search_query: String,
    pub sort: Vec<SortCriterion>,
    pub filters: BTreeMap<String, FilterValue>,
}

impl RequestKey {
    pub fn from_view(table: &str, view: &ViewState) -> Self {
        Self {
            table: table.to_string(),
            page_number: view.pagination.page_number,
            page_size: view.pagination.page_size,
            search_query: view.search_query.clone(),
            sort: view.sort.clone(),
            filters: view.filter_set().into_iter().collect(),
        }
    }
}

/// Build the listing request for the current view
pub fn build_listing_request(config: &TableQueryConfig, view: &ViewState) -> ListingRequest {
    let order_by = view
        .sort
        .first()
        .or(config.default_order.as_ref())
        .map(|criterion| (criterion.column_id.clone(), criterion.direction()));

    let multi_sort = (view.sort.len() > 1).then(|| {
        view.sort
            .iter()
            .map(|criterion| MultiSortEntry {
                column: criterion.column_id.clone(),
                direction: criterion.direction(),
            })
            .collect()
    });

    let column_filters = view
        .filter_set()
        .iter()
        .map(|(column, value)| (column.clone(), filter_value_to_wire(value)))
        .collect();

    ListingRequest {
        table: config.table_name.clone(),
        page_size: view.pagination.page_size,
        page_number: view.pagination.page_number,
        order_by,
        multi_sort,
        search_columns: (!config.search_columns.is_empty()).then(|| config.search_columns.clone()),
        search_query: (!view.search_query.is_empty()).then(|| view.search_query.clone()),
        column_filters,
        additional_params: config.effective_additional_params(),
    }
}

/// Wire form of a single column filter
///
/// Literals and lists are sent as-is, date ranges as `{type: "dateRange"}`
/// objects and predicates as query operator documents.
pub fn filter_value_to_wire(value: &FilterValue) -> Value {
    match value {
        FilterValue::Literal { value } => Value::String(value.clone()),
        FilterValue::List { values } => json!(values),
        FilterValue::Range { from, to } => json!({ "$gte": from, "$lte": to }),
        FilterValue::DateRange { from, to } => json!({
            "type": "dateRange",
            "from": from.to_rfc3339_opts(SecondsFormat::Millis, true),
            "to": to.to_rfc3339_opts(SecondsFormat::Millis, true),
        }),
        FilterValue::Predicate { predicate } => predicate_to_wire(predicate),
    }
}

fn predicate_to_wire(predicate: &Predicate) -> Value {
    match predicate {
        Predicate::NotEquals(value) => json!({ "$ne": value }),
        Predicate::Contains(value) => case_insensitive(regex::escape(value)),
        Predicate::NotContains(value) => json!({ "$not": case_insensitive(regex::escape(value)) }),
        Predicate::StartsWith(value) => case_insensitive(format!("^{}", regex::escape(value))),
        Predicate::EndsWith(value) => case_insensitive(format!("{}$", regex::escape(value))),
        Predicate::GreaterThan(value) => json!({ "$gt": value }),
        Predicate::LessThan(value) => json!({ "$lt": value }),
        Predicate::NotIn(values) => json!({ "$nin": values }),
        Predicate::IsEmpty => json!({ "$in": [null, ""] }),
        Predicate::IsNotEmpty => json!({ "$nin": [null, ""] }),
    }
}

fn case_insensitive(pattern: String) -> Value {
    json!({ "$regex": pattern, "$options": "i" })
}
