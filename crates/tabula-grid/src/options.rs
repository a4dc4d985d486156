//! Filter option derivation
//!
//! Multi-select filter editors need a candidate list. Explicit option
//! items pass through verbatim; otherwise candidates are scanned from
//! the data in first-seen order, with arrays flattened and nulls
//! skipped. Boolean columns always offer both options, even when the
//! data only contains one of them.

use serde::{Deserialize, Serialize};
use tabula_core::Value;

use crate::column::{ColumnDef, ColumnType};
use crate::record::Record;

/// One selectable filter candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOption {
    pub value: Value,
    pub label: String,
}

impl FilterOption {
    pub fn new(value: impl Into<Value>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Resolve the display label for a candidate value under a column's
/// rendering options
pub fn option_label<R: Record>(value: &Value, column: &ColumnDef<R>) -> String {
    let opts = column.options();
    if column.column_type() == ColumnType::Boolean {
        let boolean = opts.boolean.clone().unwrap_or_default();
        return match value.as_bool() {
            Some(true) => boolean.true_label,
            Some(false) => boolean.false_label,
            None => value.to_display_string(),
        };
    }
    let raw = value.to_display_string();
    if let Some(item) = opts
        .option_items
        .iter()
        .find(|item| crate::filter::loose_eq(&item.value, value))
    {
        return item.label.clone();
    }
    opts.labels.get(&raw).cloned().unwrap_or(raw)
}

/// Derive the candidate list for a column's multi-select filter editor
pub fn derive_filter_options<R: Record>(rows: &[R], column: &ColumnDef<R>) -> Vec<FilterOption> {
    // Boolean columns always offer both options
    if column.column_type() == ColumnType::Boolean {
        return vec![
            FilterOption::new(true, option_label(&Value::from(true), column)),
            FilterOption::new(false, option_label(&Value::from(false), column)),
        ];
    }

    // Explicit option items win verbatim, order and labels preserved
    if column.column_type() == ColumnType::Options && !column.options().option_items.is_empty() {
        return column
            .options()
            .option_items
            .iter()
            .map(|item| FilterOption::new(item.value.clone(), item.label.clone()))
            .collect();
    }

    let mut seen: Vec<Value> = Vec::new();
    let mut options = Vec::new();
    for row in rows {
        let cell = column.value_of(row);
        let values = match cell {
            Value::Array(items) => items,
            other => vec![other],
        };
        for value in values {
            if value.is_null() {
                continue;
            }
            if seen.iter().any(|v| v == &value) {
                continue;
            }
            let label = option_label(&value, column);
            seen.push(value.clone());
            options.push(FilterOption { value, label });
        }
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{BadgeVariant, BooleanOptions, OptionItem};
    use std::collections::HashMap;

    type Row = HashMap<String, Value>;

    fn rows(key: &str, values: Vec<Value>) -> Vec<Row> {
        values
            .into_iter()
            .map(|v| {
                let mut row = Row::new();
                row.insert(key.to_string(), v);
                row
            })
            .collect()
    }

    #[test]
    fn test_derivation_preserves_first_seen_order() {
        let data = rows(
            "status",
            vec![
                "pending".into(),
                "done".into(),
                "pending".into(),
                Value::Null,
                "failed".into(),
            ],
        );
        let col = ColumnDef::<Row>::new("status", "Status", ColumnType::Text);
        let options = derive_filter_options(&data, &col);
        let values: Vec<String> = options.iter().map(|o| o.value.to_display_string()).collect();
        assert_eq!(values, vec!["pending", "done", "failed"]);
    }

    #[test]
    fn test_array_cells_are_flattened() {
        let data = rows(
            "roles",
            vec![
                Value::Array(vec!["admin".into(), "user".into()]),
                Value::Array(vec!["user".into(), "auditor".into()]),
            ],
        );
        let col = ColumnDef::<Row>::new("roles", "Roles", ColumnType::LookupMulti);
        let options = derive_filter_options(&data, &col);
        let values: Vec<String> = options.iter().map(|o| o.value.to_display_string()).collect();
        assert_eq!(values, vec!["admin", "user", "auditor"]);
    }

    #[test]
    fn test_boolean_columns_always_offer_both() {
        let data = rows("banned", vec![Value::from(true)]);
        let col = ColumnDef::<Row>::new("banned", "Banned", ColumnType::Boolean)
            .with_boolean_options(BooleanOptions {
                true_label: "banned".to_string(),
                false_label: "active".to_string(),
                ..Default::default()
            });
        let options = derive_filter_options(&data, &col);
        assert_eq!(options.len(), 2);
        assert_eq!(options[0], FilterOption::new(true, "banned"));
        assert_eq!(options[1], FilterOption::new(false, "active"));
    }

    #[test]
    fn test_explicit_option_items_pass_through_verbatim() {
        let data = rows("role", vec!["user".into(), "guest".into()]);
        let col = ColumnDef::<Row>::new("role", "Role", ColumnType::Options).with_option_items(
            vec![
                OptionItem::new("admin", "Admin").with_variant(BadgeVariant::Default),
                OptionItem::new("user", "User"),
            ],
        );
        let options = derive_filter_options(&data, &col);
        // Data values never leak in; order and labels come from the items
        assert_eq!(
            options,
            vec![
                FilterOption::new("admin", "Admin"),
                FilterOption::new("user", "User"),
            ]
        );
    }

    #[test]
    fn test_labels_map_resolves_option_labels() {
        let data = rows("kind", vec!["a".into(), "b".into()]);
        let col = ColumnDef::<Row>::new("kind", "Kind", ColumnType::Lookup)
            .with_label("a", "Alpha");
        let options = derive_filter_options(&data, &col);
        assert_eq!(options[0].label, "Alpha");
        assert_eq!(options[1].label, "b");
    }
}
