//! Parsers for the table-shaping command line flags

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use tablekit_core::{FilterSet, FilterValue, SortCriterion, SortDirection};
use tablekit_filters::{ConditionValue, FilterExpressionBuilder, FilterOperator, ValueKind};

/// `column[:asc|desc]`, ascending when no direction is given
pub fn parse_sort(input: &str) -> Result<SortCriterion> {
    let (column, direction) = match input.split_once(':') {
        Some((column, direction)) => {
            let direction = SortDirection::parse(direction)
                .with_context(|| format!("Invalid sort direction in '{input}'"))?;
            (column, direction)
        }
        None => (input, SortDirection::Asc),
    };

    let column = column.trim();
    if column.is_empty() {
        bail!("Sort column is required in '{input}'");
    }
    Ok(SortCriterion {
        column_id: column.to_string(),
        descending: direction.is_descending(),
    })
}

/// `column=value`; a comma separated value selects several options
pub fn parse_filter(input: &str) -> Result<(String, FilterValue)> {
    let (column, value) = input
        .split_once('=')
        .with_context(|| format!("Expected column=value, got '{input}'"))?;

    let column = column.trim();
    if column.is_empty() {
        bail!("Filter column is required in '{input}'");
    }

    let value = if value.contains(',') {
        FilterValue::list(
            value
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty()),
        )
    } else {
        FilterValue::literal(value.trim())
    };
    Ok((column.to_string(), value))
}

/// Build a filter set from `column operator value` conditions.
///
/// Operators use their keys (`contains`, `between`, `not_in`, ...); an
/// unknown key is logged and treated as `equals`. Range and list operators
/// take a comma separated value. Every condition needs a value.
pub fn parse_conditions(conditions: &[String]) -> Result<FilterSet> {
    let mut builder = FilterExpressionBuilder::new();

    for (index, condition) in conditions.iter().enumerate() {
        let mut parts = condition.split_whitespace();
        let column = parts.next().unwrap_or_default();
        let operator_key = parts
            .next()
            .with_context(|| format!("Expected 'column operator value', got '{condition}'"))?;
        let raw_value = parts.collect::<Vec<_>>().join(" ");

        let operator = FilterOperator::parse(operator_key);
        if operator.key() != operator_key {
            tracing::warn!(operator = operator_key, column, "unknown filter operator, using equals");
        }

        let value = match operator.value_kind() {
            ValueKind::Range | ValueKind::List => ConditionValue::parse_list(&raw_value),
            _ => ConditionValue::text(raw_value),
        };

        let id = if index == 0 {
            builder.rows()[0].id
        } else {
            builder.add_row()
        };
        builder.set_column(id, column);
        builder.set_operator(id, operator);
        builder.set_value(id, value);
    }

    Ok(builder.build_filter_set()?)
}

pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .with_context(|| format!("Expected a YYYY-MM-DD date, got '{input}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tablekit_core::Predicate;

    #[test]
    fn test_parse_sort() {
        assert_eq!(parse_sort("price").unwrap(), SortCriterion::asc("price"));
        assert_eq!(parse_sort("price:desc").unwrap(), SortCriterion::desc("price"));
        assert!(parse_sort("price:sideways").is_err());
        assert!(parse_sort(":asc").is_err());
    }

    #[test]
    fn test_parse_filter() {
        assert_eq!(
            parse_filter("status=active").unwrap(),
            ("status".to_string(), FilterValue::literal("active"))
        );
        assert_eq!(
            parse_filter("dept=IT, HR").unwrap(),
            ("dept".to_string(), FilterValue::list(["IT", "HR"]))
        );
        assert!(parse_filter("status").is_err());
    }

    #[test]
    fn test_parse_conditions() {
        let filters = parse_conditions(&[
            "name contains lamp".to_string(),
            "price between 10,20".to_string(),
            "notes is_empty -".to_string(),
        ])
        .unwrap();

        assert_eq!(
            filters.get("name"),
            Some(&FilterValue::predicate(Predicate::Contains("lamp".into())))
        );
        assert_eq!(filters.get("price"), Some(&FilterValue::range("10", "20")));
        assert_eq!(
            filters.get("notes"),
            Some(&FilterValue::predicate(Predicate::IsEmpty))
        );
    }

    #[test]
    fn test_parse_conditions_unknown_operator_means_equals() {
        let filters = parse_conditions(&["name resembles lamp".to_string()]).unwrap();
        assert_eq!(filters.get("name"), Some(&FilterValue::literal("lamp")));
    }

    #[test]
    fn test_parse_conditions_tolerates_repeated_whitespace() {
        let filters = parse_conditions(&[
            "  name   contains   desk   lamp ".to_string(),
            "status\tequals\tactive".to_string(),
        ])
        .unwrap();
        assert_eq!(
            filters.get("name"),
            Some(&FilterValue::predicate(Predicate::Contains("desk lamp".into())))
        );
        assert_eq!(filters.get("status"), Some(&FilterValue::literal("active")));
    }

    #[test]
    fn test_parse_conditions_drops_valueless_emptiness_check() {
        assert!(parse_conditions(&["notes is_empty".to_string()]).is_err());
    }

    #[test]
    fn test_parse_conditions_without_complete_rows_fails() {
        assert!(parse_conditions(&["name contains".to_string()]).is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-06-01").unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        );
        assert!(parse_date("06/01/2024").is_err());
    }
}
