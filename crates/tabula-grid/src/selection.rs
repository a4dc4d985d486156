//! Row selection
//!
//! Selection is keyed by row id so it survives sorting and filtering.
//! The header checkbox works at page scope: select-all only touches the
//! currently visible, selectable rows.

use std::collections::HashSet;

/// Set of selected row ids
#[derive(Debug, Clone, Default)]
pub struct RowSelection {
    selected: HashSet<String>,
}

impl RowSelection {
    pub fn is_selected(&self, row_id: &str) -> bool {
        self.selected.contains(row_id)
    }

    pub fn select(&mut self, row_id: impl Into<String>) {
        self.selected.insert(row_id.into());
    }

    pub fn deselect(&mut self, row_id: &str) {
        self.selected.remove(row_id);
    }

    pub fn toggle(&mut self, row_id: &str) {
        if !self.selected.remove(row_id) {
            self.selected.insert(row_id.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Whether every given row is selected (false for an empty page)
    pub fn all_selected(&self, row_ids: &[String]) -> bool {
        !row_ids.is_empty() && row_ids.iter().all(|id| self.selected.contains(id))
    }

    /// Whether at least one of the given rows is selected
    pub fn any_selected(&self, row_ids: &[String]) -> bool {
        row_ids.iter().any(|id| self.selected.contains(id))
    }

    /// Header checkbox semantics: if every given row is selected,
    /// deselect them all; otherwise select them all
    pub fn toggle_all(&mut self, row_ids: &[String]) {
        if self.all_selected(row_ids) {
            for id in row_ids {
                self.selected.remove(id);
            }
        } else {
            for id in row_ids {
                self.selected.insert(id.clone());
            }
        }
    }
}
