//! Operator table for advanced filter conditions
//!
//! Each operator maps a condition value onto a [`FilterValue`] the listing
//! endpoint understands.

use serde::{Deserialize, Serialize};
use tablekit_core::{FilterValue, Predicate};

/// Shape of the value input an operator expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    None,
    Text,
    Number,
    Range,
    List,
}

/// Filter operators available in the advanced filter dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    #[default]
    Equals,
    NotEquals,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    IsEmpty,
    IsNotEmpty,
    GreaterThan,
    LessThan,
    Between,
    In,
    NotIn,
}

impl FilterOperator {
    /// Get all available operators in display order
    pub fn all() -> &'static [FilterOperator] {
        &[
            Self::Equals,
            Self::NotEquals,
            Self::Contains,
            Self::NotContains,
            Self::StartsWith,
            Self::EndsWith,
            Self::IsEmpty,
            Self::IsNotEmpty,
            Self::GreaterThan,
            Self::LessThan,
            Self::Between,
            Self::In,
            Self::NotIn,
        ]
    }

    /// Wire/config key of the operator
    pub fn key(&self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::Contains => "contains",
            Self::NotContains => "not_contains",
            Self::StartsWith => "starts_with",
            Self::EndsWith => "ends_with",
            Self::IsEmpty => "is_empty",
            Self::IsNotEmpty => "is_not_empty",
            Self::GreaterThan => "greater_than",
            Self::LessThan => "less_than",
            Self::Between => "between",
            Self::In => "in",
            Self::NotIn => "not_in",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Equals => "Equals",
            Self::NotEquals => "Not Equals",
            Self::Contains => "Contains",
            Self::NotContains => "Does Not Contain",
            Self::StartsWith => "Starts With",
            Self::EndsWith => "Ends With",
            Self::IsEmpty => "Is Empty",
            Self::IsNotEmpty => "Is Not Empty",
            Self::GreaterThan => "Greater Than",
            Self::LessThan => "Less Than",
            Self::Between => "Between",
            Self::In => "In List",
            Self::NotIn => "Not In List",
        }
    }

    pub fn value_kind(&self) -> ValueKind {
        match self {
            Self::IsEmpty | Self::IsNotEmpty => ValueKind::None,
            Self::GreaterThan | Self::LessThan => ValueKind::Number,
            Self::Between => ValueKind::Range,
            Self::In | Self::NotIn => ValueKind::List,
            _ => ValueKind::Text,
        }
    }

    /// Returns true if the value shapes the resulting filter.
    /// Emptiness operators still need a non-empty value for the row to count.
    pub fn requires_value(&self) -> bool {
        self.value_kind() != ValueKind::None
    }

    /// Parse an operator key. Unknown keys fall back to `Equals`.
    pub fn parse(key: &str) -> Self {
        let key = key.trim();
        Self::all()
            .iter()
            .copied()
            .find(|op| op.key() == key)
            .unwrap_or_else(|| {
                tracing::debug!(operator = key, "unknown filter operator, using equals");
                Self::Equals
            })
    }

    /// Map a condition value onto a filter value.
    /// Returns `None` when the value is empty or does not fit the operator.
    pub fn to_filter_value(&self, value: &ConditionValue) -> Option<FilterValue> {
        if value.is_empty() {
            return None;
        }

        let filter = match self {
            Self::IsEmpty => FilterValue::predicate(Predicate::IsEmpty),
            Self::IsNotEmpty => FilterValue::predicate(Predicate::IsNotEmpty),
            Self::Between => {
                let (from, to) = value.as_pair()?;
                FilterValue::range(from, to)
            }
            Self::In => FilterValue::list(value.as_list()),
            Self::NotIn => FilterValue::predicate(Predicate::NotIn(value.as_list())),
            _ => {
                let text = value.as_text()?;
                match self {
                    Self::NotEquals => FilterValue::predicate(Predicate::NotEquals(text)),
                    Self::Contains => FilterValue::predicate(Predicate::Contains(text)),
                    Self::NotContains => FilterValue::predicate(Predicate::NotContains(text)),
                    Self::StartsWith => FilterValue::predicate(Predicate::StartsWith(text)),
                    Self::EndsWith => FilterValue::predicate(Predicate::EndsWith(text)),
                    Self::GreaterThan => FilterValue::predicate(Predicate::GreaterThan(text)),
                    Self::LessThan => FilterValue::predicate(Predicate::LessThan(text)),
                    _ => FilterValue::literal(text),
                }
            }
        };
        Some(filter)
    }
}

/// Logical operator joining a condition to the next one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOperator {
    #[default]
    And,
    Or,
}

impl LogicalOperator {
    pub fn label(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            Self::And => Self::Or,
            Self::Or => Self::And,
        }
    }
}

/// Raw value entered for a condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Text(String),
    Many(Vec<String>),
}

impl Default for ConditionValue {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl ConditionValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn many<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Many(values.into_iter().map(Into::into).collect())
    }

    /// Parse comma separated input, dropping blank items
    pub fn parse_list(input: &str) -> Self {
        Self::Many(
            input
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Empty text, or a list with no non-blank items
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Many(values) => values.iter().all(|v| v.trim().is_empty()),
        }
    }

    fn as_text(&self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.clone()),
            Self::Many(values) => values
                .iter()
                .map(|v| v.trim())
                .find(|v| !v.is_empty())
                .map(str::to_string),
        }
    }

    fn as_list(&self) -> Vec<String> {
        match self {
            Self::Text(text) => match Self::parse_list(text) {
                Self::Many(values) => values,
                Self::Text(_) => Vec::new(),
            },
            Self::Many(values) => values
                .iter()
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Both bounds of a range; incomplete ranges yield `None`
    fn as_pair(&self) -> Option<(String, String)> {
        match self {
            Self::Many(values) if values.len() == 2 => {
                let from = values[0].trim();
                let to = values[1].trim();
                if from.is_empty() || to.is_empty() {
                    None
                } else {
                    Some((from.to_string(), to.to_string()))
                }
            }
            _ => None,
        }
    }
}
