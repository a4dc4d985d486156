//! Row record abstraction
//!
//! The grid never sees concrete row structs; it reads cells through the
//! [`Record`] trait by accessor key. Computed columns work by answering
//! for keys that have no backing field.

use std::collections::{BTreeMap, HashMap};

use tabula_core::Value;

/// A row the grid can read cells from
pub trait Record {
    /// Look up a cell value by accessor key. Unknown keys return
    /// [`Value::Null`].
    fn field(&self, key: &str) -> Value;

    /// Stable identity for this record, if it has one. Rows without an
    /// identity fall back to their index in the source data.
    fn record_id(&self) -> Option<String> {
        None
    }
}

impl Record for HashMap<String, Value> {
    fn field(&self, key: &str) -> Value {
        self.get(key).cloned().unwrap_or(Value::Null)
    }
}

impl Record for BTreeMap<String, Value> {
    fn field(&self, key: &str) -> Value {
        self.get(key).cloned().unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_record_field_lookup() {
        let mut row = HashMap::new();
        row.insert("name".to_string(), Value::from("dana"));
        assert_eq!(row.field("name"), Value::from("dana"));
        assert_eq!(row.field("missing"), Value::Null);
    }
}
