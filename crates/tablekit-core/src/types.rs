//! Shared value types: filter values, sort criteria, pagination and columns

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A fetched row, keyed by column id
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Column filters keyed by column id, in insertion order
pub type FilterSet = IndexMap<String, FilterValue>;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn from_descending(descending: bool) -> Self {
        if descending { Self::Desc } else { Self::Asc }
    }

    pub fn is_descending(&self) -> bool {
        matches!(self, Self::Desc)
    }

    pub fn toggle(&self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    /// Parse `asc`/`desc` (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Asc),
            "desc" | "descending" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// A single sort criterion. Position in the sort sequence is its precedence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortCriterion {
    pub column_id: String,
    pub descending: bool,
}

impl SortCriterion {
    pub fn asc(column_id: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            descending: false,
        }
    }

    pub fn desc(column_id: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            descending: true,
        }
    }

    pub fn direction(&self) -> SortDirection {
        SortDirection::from_descending(self.descending)
    }
}

/// Condition predicates that are neither plain equality, list membership nor ranges
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum Predicate {
    NotEquals(String),
    Contains(String),
    NotContains(String),
    StartsWith(String),
    EndsWith(String),
    GreaterThan(String),
    LessThan(String),
    NotIn(Vec<String>),
    IsEmpty,
    IsNotEmpty,
}

/// The value of a single column filter
///
/// The serde representation is the storage form used for persisted presets.
/// The request payload form is produced by the listing request builder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterValue {
    Literal { value: String },
    List { values: Vec<String> },
    Range { from: String, to: String },
    DateRange { from: DateTime<Utc>, to: DateTime<Utc> },
    Predicate { predicate: Predicate },
}

impl FilterValue {
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal {
            value: value.into(),
        }
    }

    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn range(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::Range {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn predicate(predicate: Predicate) -> Self {
        Self::Predicate { predicate }
    }

    /// Date range covering a whole calendar day, 00:00:00.000 to 23:59:59.999 UTC
    pub fn single_day(day: NaiveDate) -> Self {
        let start = day.and_time(NaiveTime::MIN);
        let end = day.and_time(
            NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN),
        );
        Self::DateRange {
            from: Utc.from_utc_datetime(&start),
            to: Utc.from_utc_datetime(&end),
        }
    }

    /// Date range ending at `now` and starting `days` days earlier
    pub fn last_days(days: u32, now: DateTime<Utc>) -> Self {
        Self::DateRange {
            from: now - chrono::Duration::days(i64::from(days)),
            to: now,
        }
    }

    /// Values selected by a list-style (faceted) filter
    pub fn selected_values(&self) -> Vec<String> {
        match self {
            Self::List { values } => values.clone(),
            Self::Literal { value } => vec![value.clone()],
            _ => Vec::new(),
        }
    }
}

/// One entry of the column filter sequence
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnFilter {
    pub column_id: String,
    pub value: FilterValue,
}

impl ColumnFilter {
    pub fn new(column_id: impl Into<String>, value: FilterValue) -> Self {
        Self {
            column_id: column_id.into(),
            value,
        }
    }
}

/// 1-based pagination cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pagination {
    pub page_number: u32,
    pub page_size: u32,
}

impl Pagination {
    pub const DEFAULT_PAGE_SIZE: u32 = 10;

    pub fn new(page_number: u32, page_size: u32) -> Self {
        Self {
            page_number: page_number.max(1),
            page_size: page_size.max(1),
        }
    }

    /// Total number of pages for `total_count` rows. Zero rows means zero pages.
    pub fn page_count(&self, total_count: u64) -> u64 {
        total_count.div_ceil(u64::from(self.page_size.max(1)))
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: Self::DEFAULT_PAGE_SIZE,
        }
    }
}

/// Column definition known to the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub id: String,
    pub header: String,
    #[serde(default = "default_true")]
    pub sortable: bool,
    #[serde(default = "default_true")]
    pub hideable: bool,
}

fn default_true() -> bool {
    true
}

impl ColumnDef {
    /// Pseudo-columns used for row selection and row actions
    pub const PSEUDO_COLUMNS: [&'static str; 2] = ["select", "actions"];

    pub fn new(id: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            header: header.into(),
            sortable: true,
            hideable: true,
        }
    }

    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    /// Whether this column may be used in advanced filter conditions
    pub fn is_filterable(&self) -> bool {
        !self.id.is_empty() && !Self::PSEUDO_COLUMNS.contains(&self.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count() {
        let pagination = Pagination::new(1, 10);
        assert_eq!(pagination.page_count(0), 0);
        assert_eq!(pagination.page_count(1), 1);
        assert_eq!(pagination.page_count(10), 1);
        assert_eq!(pagination.page_count(11), 2);
    }

    #[test]
    fn test_single_day_covers_whole_day() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let FilterValue::DateRange { from, to } = FilterValue::single_day(day) else {
            panic!("expected date range");
        };
        assert_eq!(from.to_rfc3339(), "2024-03-05T00:00:00+00:00");
        assert_eq!(
            to.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            "2024-03-05T23:59:59.999Z"
        );
    }

    #[test]
    fn test_filter_value_storage_form() {
        let value = FilterValue::predicate(Predicate::Contains("lap".into()));
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"kind": "predicate", "predicate": {"op": "contains", "value": "lap"}})
        );
        let back: FilterValue = serde_json::from_value(json).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_pseudo_columns_are_not_filterable() {
        assert!(!ColumnDef::new("select", "").is_filterable());
        assert!(!ColumnDef::new("actions", "Actions").is_filterable());
        assert!(ColumnDef::new("status", "Status").is_filterable());
    }
}
