//! Column header controller
//!
//! Each header owns its filter popover state and exposes the sort and
//! multi-select toggle semantics the popover buttons use. The grid
//! renders headers from [`HeaderView`] snapshots.

use serde::{Deserialize, Serialize};
use tabula_core::Value;

use crate::column::{ColumnDef, ColumnType};
use crate::filter::{loose_eq, FilterKind, FilterValue};
use crate::options::FilterOption;
use crate::record::Record;

/// Sort direction for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Advance the three-state sort cycle:
/// unsorted -> ascending -> descending -> unsorted
pub fn next_sort(current: Option<SortDirection>) -> Option<SortDirection> {
    match current {
        None => Some(SortDirection::Ascending),
        Some(SortDirection::Ascending) => Some(SortDirection::Descending),
        Some(SortDirection::Descending) => None,
    }
}

/// Which filter editor a header popover shows
#[derive(Debug, Clone, PartialEq)]
pub enum FilterEditor {
    /// Free-text input
    TextInput,
    /// Multi-select list with an "all options" entry
    MultiSelect(Vec<FilterOption>),
    /// Min/max numeric inputs
    NumberRange,
    /// From/to date inputs
    DateRange,
}

impl FilterEditor {
    /// Pick the editor for a column, deriving candidates from the data
    /// where a multi-select applies
    pub fn for_column<R: Record>(rows: &[R], column: &ColumnDef<R>) -> Self {
        match FilterKind::for_column(column.column_type()) {
            FilterKind::Range => Self::NumberRange,
            FilterKind::Date => Self::DateRange,
            FilterKind::Exact | FilterKind::OneOf => {
                if column.column_type() == ColumnType::Text {
                    // Plain text columns with few distinct values still get a
                    // multi-select; free text covers the open-ended case
                    let options = crate::options::derive_filter_options(rows, column);
                    if options.is_empty() {
                        Self::TextInput
                    } else {
                        Self::MultiSelect(options)
                    }
                } else {
                    Self::MultiSelect(crate::options::derive_filter_options(rows, column))
                }
            }
        }
    }
}

/// Popover open/closed state owned by a header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeaderState {
    open: bool,
}

impl HeaderState {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }
}

/// Snapshot of a header cell for rendering
#[derive(Debug, Clone)]
pub struct HeaderView {
    pub id: String,
    pub title: String,
    pub sortable: bool,
    pub filterable: bool,
    pub sort: Option<SortDirection>,
    pub filter_active: bool,
    pub editor: Option<FilterEditor>,
}

/// Toggle one candidate in a multi-select filter
///
/// Returns the next filter value: `None` clears the filter entirely,
/// which happens both when nothing remains selected and when every
/// available option is selected ("all options" behaves as no filter).
pub fn toggle_candidate(
    current: Option<&FilterValue>,
    candidate: &Value,
    available: &[FilterOption],
) -> Option<FilterValue> {
    let mut selected: Vec<Value> = match current {
        Some(FilterValue::OneOf(candidates)) => candidates.clone(),
        Some(FilterValue::Exact(value)) if !value.is_null() => vec![value.clone()],
        Some(FilterValue::Text(s)) if !s.is_empty() => vec![Value::from(s.as_str())],
        _ => Vec::new(),
    };

    if selected.iter().any(|v| loose_eq(v, candidate)) {
        selected.retain(|v| !loose_eq(v, candidate));
    } else {
        selected.push(candidate.clone());
    }

    if selected.is_empty() {
        return None;
    }
    if !available.is_empty()
        && available
            .iter()
            .all(|option| selected.iter().any(|v| loose_eq(v, &option.value)))
    {
        return None;
    }
    Some(FilterValue::OneOf(selected))
}
