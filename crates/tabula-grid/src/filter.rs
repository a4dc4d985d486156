//! Filter values and predicates
//!
//! Predicates are total: a filter whose shape does not fit the column's
//! filter kind degrades to match-all rather than erroring, and cells a
//! range predicate cannot parse are excluded rather than erroring.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tabula_core::Value;

use crate::column::ColumnType;

/// Which predicate family a column type filters with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Candidate-list membership (text, lookup, badge, options, ...)
    OneOf,
    /// Single-value equality (boolean)
    Exact,
    /// Inclusive numeric range (number, currency)
    Range,
    /// Inclusive date range (date, datetime)
    Date,
}

impl FilterKind {
    pub fn for_column(column_type: ColumnType) -> Self {
        match column_type {
            ColumnType::Boolean => Self::Exact,
            ColumnType::Number | ColumnType::Currency => Self::Range,
            ColumnType::Date | ColumnType::DateTime => Self::Date,
            _ => Self::OneOf,
        }
    }
}

/// A filter value as produced by the header filter editors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterValue {
    /// Free-text entry
    Text(String),
    /// Multi-select candidate list
    OneOf(Vec<Value>),
    /// Single exact value
    Exact(Value),
    /// Inclusive numeric bounds; either side may be open
    NumberRange { min: Option<f64>, max: Option<f64> },
    /// Inclusive date bounds; either side may be open
    DateRange {
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    },
}

impl FilterValue {
    /// Whether this filter can never exclude anything and should be
    /// treated as absent
    pub fn is_noop(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::OneOf(candidates) => candidates.is_empty(),
            Self::Exact(value) => value.is_null(),
            Self::NumberRange { min, max } => min.is_none() && max.is_none(),
            Self::DateRange { from, to } => from.is_none() && to.is_none(),
        }
    }
}

/// Loose equality used by candidate-list and exact filters
///
/// Numbers compare numerically, booleans literally, everything else by
/// case-insensitive display string, so a candidate "active" matches a
/// cell "ACTIVE".
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            a.as_f64() == b.as_f64()
        }
        _ => a
            .to_display_string()
            .to_lowercase()
            .eq(&b.to_display_string().to_lowercase()),
    }
}

/// Case-insensitive substring match over the cell's display string
pub fn text_matches(cell: &Value, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    cell.to_display_string()
        .to_lowercase()
        .contains(&needle.to_lowercase())
}

/// Single-value equality; a null target matches everything
pub fn exact_matches(cell: &Value, target: &Value) -> bool {
    if target.is_null() {
        return true;
    }
    loose_eq(cell, target)
}

/// Candidate-list membership; an empty list matches everything and an
/// array cell matches if any of its elements matches any candidate
pub fn one_of_matches(cell: &Value, candidates: &[Value]) -> bool {
    if candidates.is_empty() {
        return true;
    }
    match cell {
        Value::Array(items) => items
            .iter()
            .any(|item| candidates.iter().any(|c| loose_eq(item, c))),
        _ => candidates.iter().any(|c| loose_eq(cell, c)),
    }
}

/// Inclusive numeric range; cells that cannot coerce to a number are
/// excluded, and a fully open range matches everything
pub fn range_matches(cell: &Value, min: Option<f64>, max: Option<f64>) -> bool {
    if min.is_none() && max.is_none() {
        return true;
    }
    let Some(number) = cell.as_f64() else {
        return false;
    };
    if let Some(min) = min {
        if number < min {
            return false;
        }
    }
    if let Some(max) = max {
        if number > max {
            return false;
        }
    }
    true
}

/// Inclusive date range; unparseable cells are excluded
pub fn date_matches(
    cell: &Value,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> bool {
    if from.is_none() && to.is_none() {
        return true;
    }
    let Some(date) = cell.as_datetime() else {
        return false;
    };
    if let Some(from) = from {
        if date < from {
            return false;
        }
    }
    if let Some(to) = to {
        if date > to {
            return false;
        }
    }
    true
}

/// Apply a filter to a cell under the column type's filter kind
///
/// A filter shape that does not fit the kind matches everything, except
/// free text on a candidate-list column, which acts as a one-element
/// candidate list.
pub fn matches_column(column_type: ColumnType, cell: &Value, filter: &FilterValue) -> bool {
    match (FilterKind::for_column(column_type), filter) {
        (FilterKind::OneOf, FilterValue::OneOf(candidates)) => one_of_matches(cell, candidates),
        (FilterKind::OneOf, FilterValue::Exact(value)) => {
            one_of_matches(cell, std::slice::from_ref(value))
        }
        (FilterKind::OneOf, FilterValue::Text(s)) => {
            if s.is_empty() {
                true
            } else {
                one_of_matches(cell, &[Value::from(s.as_str())])
            }
        }
        (FilterKind::Exact, FilterValue::Exact(value)) => exact_matches(cell, value),
        (FilterKind::Exact, FilterValue::OneOf(candidates)) => one_of_matches(cell, candidates),
        (FilterKind::Range, FilterValue::NumberRange { min, max }) => {
            range_matches(cell, *min, *max)
        }
        (FilterKind::Date, FilterValue::DateRange { from, to }) => date_matches(cell, *from, *to),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_filter_kind_per_column_type() {
        assert_eq!(FilterKind::for_column(ColumnType::Text), FilterKind::OneOf);
        assert_eq!(FilterKind::for_column(ColumnType::Badge), FilterKind::OneOf);
        assert_eq!(
            FilterKind::for_column(ColumnType::LookupMulti),
            FilterKind::OneOf
        );
        assert_eq!(
            FilterKind::for_column(ColumnType::Boolean),
            FilterKind::Exact
        );
        assert_eq!(
            FilterKind::for_column(ColumnType::Currency),
            FilterKind::Range
        );
        assert_eq!(
            FilterKind::for_column(ColumnType::DateTime),
            FilterKind::Date
        );
    }

    #[test]
    fn test_text_matches_is_case_insensitive_substring() {
        assert!(text_matches(&Value::from("Dana Levi"), "lev"));
        assert!(text_matches(&Value::from("Dana Levi"), ""));
        assert!(!text_matches(&Value::from("Dana Levi"), "cohen"));
        // Null stringifies empty, so it never matches a nonempty needle
        assert!(!text_matches(&Value::Null, "a"));
    }

    #[test]
    fn test_one_of_matches_case_insensitive_equality() {
        let candidates = vec![Value::from("active")];
        assert!(one_of_matches(&Value::from("ACTIVE"), &candidates));
        assert!(one_of_matches(&Value::from("active"), &candidates));
        assert!(!one_of_matches(&Value::from("INACTIVE"), &candidates));
    }

    #[test]
    fn test_one_of_flattens_array_cells() {
        let cell = Value::Array(vec!["admin".into(), "user".into()]);
        assert!(one_of_matches(&cell, &[Value::from("admin")]));
        assert!(!one_of_matches(&cell, &[Value::from("owner")]));
        assert!(one_of_matches(&cell, &[]));
    }

    #[test]
    fn test_one_of_compares_numbers_numerically() {
        assert!(one_of_matches(&Value::Int(5), &[Value::Float(5.0)]));
        assert!(one_of_matches(&Value::from("5"), &[Value::Int(5)]));
    }

    #[test]
    fn test_exact_null_target_matches_all() {
        assert!(exact_matches(&Value::from(false), &Value::Null));
        assert!(exact_matches(&Value::from(true), &Value::from(true)));
        assert!(!exact_matches(&Value::from(false), &Value::from(true)));
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        assert!(range_matches(&Value::Int(10), Some(10.0), Some(20.0)));
        assert!(range_matches(&Value::Int(20), Some(10.0), Some(20.0)));
        assert!(!range_matches(&Value::Int(21), Some(10.0), Some(20.0)));
        assert!(range_matches(&Value::Int(5), None, Some(20.0)));
    }

    #[test]
    fn test_range_excludes_unparseable_cells() {
        assert!(!range_matches(&Value::from("n/a"), Some(1.0), None));
        assert!(!range_matches(&Value::Null, Some(1.0), None));
        // A fully open range is a noop and keeps everything
        assert!(range_matches(&Value::from("n/a"), None, None));
    }

    #[test]
    fn test_date_range_inclusive_and_tolerant() {
        let from = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2025, 1, 31, 23, 59, 59).unwrap();
        let inside = Value::from(Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap());
        let outside = Value::from(Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap());
        assert!(date_matches(&inside, Some(from), Some(to)));
        assert!(!date_matches(&outside, Some(from), Some(to)));
        assert!(!date_matches(&Value::from("not a date"), Some(from), None));
    }

    #[test]
    fn test_shape_mismatch_degrades_to_match_all() {
        // A date range applied to a numeric column keeps every row
        assert!(matches_column(
            ColumnType::Number,
            &Value::Int(3),
            &FilterValue::DateRange { from: Some(Utc::now()), to: None },
        ));
        // A candidate list applied to a date column keeps every row
        assert!(matches_column(
            ColumnType::Date,
            &Value::from("2025-01-01T00:00:00Z"),
            &FilterValue::OneOf(vec![Value::from("x")]),
        ));
    }

    #[test]
    fn test_text_on_candidate_column_acts_as_single_candidate() {
        assert!(matches_column(
            ColumnType::Text,
            &Value::from("ACTIVE"),
            &FilterValue::Text("active".to_string()),
        ));
        assert!(!matches_column(
            ColumnType::Text,
            &Value::from("INACTIVE"),
            &FilterValue::Text("active".to_string()),
        ));
    }

    #[test]
    fn test_noop_detection() {
        assert!(FilterValue::Text(String::new()).is_noop());
        assert!(FilterValue::OneOf(vec![]).is_noop());
        assert!(FilterValue::NumberRange { min: None, max: None }.is_noop());
        assert!(!FilterValue::Exact(Value::from(true)).is_noop());
    }
}
