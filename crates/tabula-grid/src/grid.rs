//! Grid orchestrator
//!
//! `DataGrid` owns the interaction state (sorting, filters, selection,
//! pagination, actions) and runs the row pipeline: global filter, then
//! per-column filters, then sort, then paginate. `snapshot` resolves the
//! whole thing into a [`GridView`] the UI layer can paint directly, with
//! status precedence pending > error > data.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use smallvec::SmallVec;
use tabula_core::Value;

use crate::actions::{ActionView, DispatchOutcome, RowActions};
use crate::column::{Align, ColumnDef, ColumnType, ACTIONS_COLUMN_ID, SELECT_COLUMN_ID};
use crate::filter::{matches_column, text_matches, FilterValue};
use crate::format::{format_cell, CellDisplay};
use crate::header::{next_sort, FilterEditor, HeaderView, SortDirection};
use crate::options::derive_filter_options;
use crate::pagination::{PageSummary, Pagination};
use crate::record::Record;
use crate::selection::RowSelection;

/// Data loading status; error wins over data, pending wins over both
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridStatus {
    Pending,
    #[default]
    Success,
    Error,
}

/// Number of skeleton rows while loading
pub const DEFAULT_LOADER_ROWS: usize = 6;

/// Static grid configuration
#[derive(Debug, Clone)]
pub struct GridConfig {
    pub show_search: bool,
    pub show_pagination: bool,
    pub show_select_col: bool,
    /// Accessor key whose value identifies a row; falls back to the
    /// record's own id, then to the row index
    pub row_id_field: Option<String>,
    pub loader_rows: usize,
    pub loader_message: Option<String>,
    pub error_title: String,
    pub error_message: String,
    /// Action labels offered on the error panel (e.g. "Retry")
    pub error_actions: Vec<String>,
    pub no_data_title: String,
    pub no_data_message: String,
    /// Action labels offered on the empty panel (e.g. "Add user")
    pub no_data_actions: Vec<String>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            show_search: true,
            show_pagination: true,
            show_select_col: false,
            row_id_field: None,
            loader_rows: DEFAULT_LOADER_ROWS,
            loader_message: None,
            error_title: "Something went wrong".to_string(),
            error_message: "Failed to load data".to_string(),
            error_actions: Vec::new(),
            no_data_title: "No data".to_string(),
            no_data_message: "No records to display".to_string(),
            no_data_actions: Vec::new(),
        }
    }
}

/// One entry of the sort order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub column_id: String,
    pub direction: SortDirection,
}

/// A formatted cell ready for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct CellView {
    pub column_id: String,
    pub align: Align,
    pub display: CellDisplay,
}

/// A resolved row of the visible page
#[derive(Debug, Clone)]
pub struct RowView {
    pub row_id: String,
    pub selected: bool,
    pub select_disabled: bool,
    pub cells: Vec<CellView>,
    pub actions: Vec<ActionView>,
}

/// The table portion of a snapshot
#[derive(Debug, Clone)]
pub struct TableView {
    pub headers: Vec<HeaderView>,
    pub rows: Vec<RowView>,
    pub summary: PageSummary,
    /// Header checkbox state
    pub select_all_checked: bool,
    pub select_all_indeterminate: bool,
}

/// What the grid renders as, resolved from status and data
#[derive(Debug, Clone)]
pub enum GridView {
    Loading {
        rows: usize,
        columns: usize,
        message: Option<String>,
    },
    Error {
        title: String,
        message: String,
        actions: Vec<String>,
    },
    Empty {
        title: String,
        message: String,
        actions: Vec<String>,
    },
    Table(TableView),
}

/// Headless data-grid state machine over records of type `R`
pub struct DataGrid<R: Record + Clone> {
    columns: Vec<ColumnDef<R>>,
    config: GridConfig,
    status: GridStatus,
    sorting: SmallVec<[SortKey; 1]>,
    filters: HashMap<String, FilterValue>,
    global_filter: String,
    selection: RowSelection,
    pagination: Pagination,
    row_actions: RowActions<R>,
    disable_select: Option<Rc<dyn Fn(&R) -> bool>>,
    on_selection_change: Option<Rc<dyn Fn(&[R])>>,
    on_export: Option<Rc<dyn Fn()>>,
    on_reset_filters: Option<Rc<dyn Fn()>>,
    on_row_click: Option<Rc<dyn Fn(&R)>>,
}

impl<R: Record + Clone> std::fmt::Debug for DataGrid<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataGrid")
            .field("columns", &self.columns.len())
            .field("status", &self.status)
            .field("sorting", &self.sorting)
            .field("filters", &self.filters.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl<R: Record + Clone> DataGrid<R> {
    pub fn new(columns: Vec<ColumnDef<R>>) -> Self {
        Self {
            columns,
            config: GridConfig::default(),
            status: GridStatus::default(),
            sorting: SmallVec::new(),
            filters: HashMap::new(),
            global_filter: String::new(),
            selection: RowSelection::default(),
            pagination: Pagination::default(),
            row_actions: RowActions::default(),
            disable_select: None,
            on_selection_change: None,
            on_export: None,
            on_reset_filters: None,
            on_row_click: None,
        }
    }

    pub fn with_config(mut self, config: GridConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_status(mut self, status: GridStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    pub fn with_row_actions(mut self, row_actions: RowActions<R>) -> Self {
        self.row_actions = row_actions;
        self
    }

    /// Disable the selection checkbox for rows matching the predicate
    pub fn with_disable_select(mut self, predicate: impl Fn(&R) -> bool + 'static) -> Self {
        self.disable_select = Some(Rc::new(predicate));
        self
    }

    /// Called with the full set of selected records on every change
    pub fn on_selection_change(mut self, callback: impl Fn(&[R]) + 'static) -> Self {
        self.on_selection_change = Some(Rc::new(callback));
        self
    }

    pub fn on_export(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_export = Some(Rc::new(callback));
        self
    }

    pub fn on_reset_filters(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_reset_filters = Some(Rc::new(callback));
        self
    }

    pub fn on_row_click(mut self, callback: impl Fn(&R) + 'static) -> Self {
        self.on_row_click = Some(Rc::new(callback));
        self
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn status(&self) -> GridStatus {
        self.status
    }

    pub fn set_status(&mut self, status: GridStatus) {
        self.status = status;
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn pagination_mut(&mut self) -> &mut Pagination {
        &mut self.pagination
    }

    pub fn row_actions(&self) -> &RowActions<R> {
        &self.row_actions
    }

    pub fn column(&self, column_id: &str) -> Option<&ColumnDef<R>> {
        self.columns.iter().find(|c| c.column_id() == column_id)
    }

    /// Stable identity for a row: configured id field, record id, index
    pub fn row_id(&self, index: usize, record: &R) -> String {
        if let Some(field) = &self.config.row_id_field {
            let id = record.field(field).to_display_string();
            if !id.is_empty() {
                return id;
            }
        }
        record.record_id().unwrap_or_else(|| index.to_string())
    }

    // ---- sorting -----------------------------------------------------

    pub fn sort_direction(&self, column_id: &str) -> Option<SortDirection> {
        self.sorting
            .iter()
            .find(|key| key.column_id == column_id)
            .map(|key| key.direction)
    }

    /// Header-click sort: cycles unsorted -> asc -> desc -> unsorted and
    /// clears every other column's sort
    pub fn toggle_sort(&mut self, column_id: &str) {
        let Some(column) = self.column(column_id) else {
            return;
        };
        if !column.sorting_enabled() {
            return;
        }
        let next = next_sort(self.sort_direction(column_id));
        tracing::debug!(column_id, ?next, "sort toggled");
        self.sorting.clear();
        if let Some(direction) = next {
            self.sorting.push(SortKey {
                column_id: column_id.to_string(),
                direction,
            });
        }
    }

    pub fn sort_by(&mut self, column_id: &str, direction: SortDirection) {
        let Some(column) = self.column(column_id) else {
            return;
        };
        if !column.sorting_enabled() {
            return;
        }
        self.sorting.clear();
        self.sorting.push(SortKey {
            column_id: column_id.to_string(),
            direction,
        });
    }

    pub fn clear_sort(&mut self) {
        self.sorting.clear();
    }

    // ---- filtering ---------------------------------------------------

    pub fn filter(&self, column_id: &str) -> Option<&FilterValue> {
        self.filters.get(column_id)
    }

    /// Set or clear a column filter; noop filters clear
    pub fn set_filter(&mut self, column_id: &str, filter: Option<FilterValue>) {
        match filter {
            Some(filter) if !filter.is_noop() => {
                self.filters.insert(column_id.to_string(), filter);
            }
            _ => {
                self.filters.remove(column_id);
            }
        }
        self.pagination.reset();
    }

    /// Toggle one candidate of a column's multi-select filter
    pub fn toggle_filter_option(&mut self, rows: &[R], column_id: &str, candidate: &Value) {
        let Some(column) = self.column(column_id) else {
            return;
        };
        let available = derive_filter_options(rows, column);
        let next =
            crate::header::toggle_candidate(self.filters.get(column_id), candidate, &available);
        self.set_filter(column_id, next);
    }

    pub fn set_global_filter(&mut self, needle: impl Into<String>) {
        self.global_filter = needle.into();
        self.pagination.reset();
    }

    pub fn global_filter(&self) -> &str {
        &self.global_filter
    }

    /// Clear all column filters and the global filter
    pub fn clear_filters(&mut self) {
        tracing::debug!(filters = self.filters.len(), "clearing filters");
        self.filters.clear();
        self.global_filter.clear();
        self.pagination.reset();
        if let Some(callback) = &self.on_reset_filters {
            callback();
        }
    }

    pub fn has_active_filters(&self) -> bool {
        !self.filters.is_empty() || !self.global_filter.is_empty()
    }

    fn row_passes_filters(&self, record: &R) -> bool {
        if !self.global_filter.is_empty() {
            let hit = self
                .columns
                .iter()
                .filter(|column| column.filtering_enabled())
                .any(|column| text_matches(&column.value_of(record), &self.global_filter));
            if !hit {
                return false;
            }
        }
        for column in &self.columns {
            if !column.filtering_enabled() {
                continue;
            }
            if let Some(filter) = self.filters.get(column.column_id()) {
                if !matches_column(column.column_type(), &column.value_of(record), filter) {
                    return false;
                }
            }
        }
        true
    }

    // ---- pipeline ----------------------------------------------------

    /// Indices of rows surviving global and column filters, in sort order
    pub fn ordered_indices(&self, rows: &[R]) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..rows.len())
            .filter(|&i| self.row_passes_filters(&rows[i]))
            .collect();

        if !self.sorting.is_empty() {
            indices.sort_by(|&ia, &ib| self.compare_rows(&rows[ia], &rows[ib]).then(ia.cmp(&ib)));
        }
        indices
    }

    fn compare_rows(&self, a: &R, b: &R) -> Ordering {
        for key in &self.sorting {
            let Some(column) = self.column(&key.column_id) else {
                continue;
            };
            let va = column.value_of(a);
            let vb = column.value_of(b);
            // Nulls sort last regardless of direction
            let ord = match (va.is_null(), vb.is_null()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => {
                    let ord = compare_cells(column.column_type(), &va, &vb);
                    match key.direction {
                        SortDirection::Ascending => ord,
                        SortDirection::Descending => ord.reverse(),
                    }
                }
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    /// Indices of the rows on the visible page
    pub fn visible_indices(&self, rows: &[R]) -> Vec<usize> {
        let ordered = self.ordered_indices(rows);
        if !self.config.show_pagination {
            return ordered;
        }
        let (start, end) = self.pagination.page_bounds(ordered.len());
        ordered[start..end].to_vec()
    }

    // ---- selection ---------------------------------------------------

    pub fn selection(&self) -> &RowSelection {
        &self.selection
    }

    fn select_disabled(&self, record: &R) -> bool {
        self.disable_select
            .as_ref()
            .map(|predicate| predicate(record))
            .unwrap_or(false)
    }

    /// Ids of the selectable rows on the visible page
    fn page_selectable_ids(&self, rows: &[R]) -> Vec<String> {
        self.visible_indices(rows)
            .into_iter()
            .filter(|&i| !self.select_disabled(&rows[i]))
            .map(|i| self.row_id(i, &rows[i]))
            .collect()
    }

    pub fn toggle_row_selection(&mut self, rows: &[R], index: usize) {
        let Some(record) = rows.get(index) else {
            return;
        };
        if self.select_disabled(record) {
            return;
        }
        let id = self.row_id(index, record);
        self.selection.toggle(&id);
        self.emit_selection(rows);
    }

    /// Header checkbox: select or deselect every selectable row on the
    /// visible page
    pub fn toggle_page_selection(&mut self, rows: &[R]) {
        let ids = self.page_selectable_ids(rows);
        self.selection.toggle_all(&ids);
        self.emit_selection(rows);
    }

    pub fn clear_selection(&mut self, rows: &[R]) {
        self.selection.clear();
        self.emit_selection(rows);
    }

    /// The currently selected records, in data order
    pub fn selected_records(&self, rows: &[R]) -> Vec<R> {
        rows.iter()
            .enumerate()
            .filter(|(i, record)| self.selection.is_selected(&self.row_id(*i, record)))
            .map(|(_, record)| record.clone())
            .collect()
    }

    fn emit_selection(&self, rows: &[R]) {
        if let Some(callback) = &self.on_selection_change {
            callback(&self.selected_records(rows));
        }
    }

    // ---- actions -----------------------------------------------------

    pub fn dispatch_action(
        &self,
        rows: &[R],
        row_index: usize,
        action_index: usize,
        confirmed: bool,
    ) -> DispatchOutcome {
        let Some(record) = rows.get(row_index) else {
            return DispatchOutcome::UnknownAction;
        };
        self.row_actions.dispatch(action_index, record, confirmed)
    }

    pub fn click_row(&self, record: &R) {
        if let Some(callback) = &self.on_row_click {
            callback(record);
        }
    }

    pub fn request_export(&self) {
        if let Some(callback) = &self.on_export {
            callback();
        }
    }

    // ---- snapshot ----------------------------------------------------

    fn column_count(&self) -> usize {
        let mut count = self.columns.len();
        if self.config.show_select_col {
            count += 1;
        }
        if !self.row_actions.is_empty() {
            count += 1;
        }
        count
    }

    pub fn header_views(&self, rows: &[R]) -> Vec<HeaderView> {
        let mut headers = Vec::with_capacity(self.column_count());
        if self.config.show_select_col {
            headers.push(HeaderView {
                id: SELECT_COLUMN_ID.to_string(),
                title: String::new(),
                sortable: false,
                filterable: false,
                sort: None,
                filter_active: false,
                editor: None,
            });
        }
        for column in &self.columns {
            let id = column.column_id().to_string();
            headers.push(HeaderView {
                sort: self.sort_direction(&id),
                filter_active: self.filters.contains_key(&id),
                editor: column
                    .filtering_enabled()
                    .then(|| FilterEditor::for_column(rows, column)),
                id,
                title: column.header().to_string(),
                sortable: column.sorting_enabled(),
                filterable: column.filtering_enabled(),
            });
        }
        if !self.row_actions.is_empty() {
            headers.push(HeaderView {
                id: ACTIONS_COLUMN_ID.to_string(),
                title: String::new(),
                sortable: false,
                filterable: false,
                sort: None,
                filter_active: false,
                editor: None,
            });
        }
        headers
    }

    /// Resolve the grid into a renderable view
    pub fn snapshot(&self, rows: &[R], now: DateTime<Utc>) -> GridView {
        match self.status {
            GridStatus::Pending => {
                return GridView::Loading {
                    rows: self.config.loader_rows,
                    columns: self.column_count(),
                    message: self.config.loader_message.clone(),
                };
            }
            GridStatus::Error => {
                return GridView::Error {
                    title: self.config.error_title.clone(),
                    message: self.config.error_message.clone(),
                    actions: self.config.error_actions.clone(),
                };
            }
            GridStatus::Success => {}
        }

        let ordered = self.ordered_indices(rows);
        if rows.is_empty() || ordered.is_empty() {
            return GridView::Empty {
                title: self.config.no_data_title.clone(),
                message: self.config.no_data_message.clone(),
                actions: self.config.no_data_actions.clone(),
            };
        }

        let (start, end) = if self.config.show_pagination {
            self.pagination.page_bounds(ordered.len())
        } else {
            (0, ordered.len())
        };
        let page = &ordered[start..end];

        let row_views = page
            .iter()
            .map(|&i| {
                let record = &rows[i];
                let row_id = self.row_id(i, record);
                let cells = self
                    .columns
                    .iter()
                    .map(|column| CellView {
                        column_id: column.column_id().to_string(),
                        align: column.align(),
                        display: format_cell(record, column, now),
                    })
                    .collect();
                RowView {
                    selected: self.selection.is_selected(&row_id),
                    select_disabled: self.select_disabled(record),
                    actions: self.row_actions.views_for(record),
                    row_id,
                    cells,
                }
            })
            .collect::<Vec<_>>();

        let page_ids = self.page_selectable_ids(rows);
        let all = self.selection.all_selected(&page_ids);
        let some = self.selection.any_selected(&page_ids);

        GridView::Table(TableView {
            headers: self.header_views(rows),
            rows: row_views,
            summary: PageSummary {
                shown: page.len(),
                total: ordered.len(),
                current_page: self.pagination.current_page(),
                total_pages: self.pagination.total_pages(ordered.len()),
            },
            select_all_checked: all,
            select_all_indeterminate: some && !all,
        })
    }
}

/// Type-aware cell comparison (nulls handled by the caller)
fn compare_cells(column_type: ColumnType, a: &Value, b: &Value) -> Ordering {
    match column_type {
        ColumnType::Number | ColumnType::Currency => {
            match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        }
        ColumnType::Date | ColumnType::DateTime => match (a.as_datetime(), b.as_datetime()) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        ColumnType::Boolean => a
            .as_bool()
            .unwrap_or(false)
            .cmp(&b.as_bool().unwrap_or(false)),
        _ => a
            .to_display_string()
            .to_lowercase()
            .cmp(&b.to_display_string().to_lowercase()),
    }
}
