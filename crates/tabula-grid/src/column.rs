//! Column definitions
//!
//! A [`ColumnDef`] pairs an accessor key with a column type; the type
//! drives which formatter, filter predicate, and filter editor the rest
//! of the engine picks for the column.

use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tabula_core::Value;

use crate::format::CellDisplay;
use crate::record::Record;

/// Synthetic column id for the selection checkbox column
pub const SELECT_COLUMN_ID: &str = "select";
/// Synthetic column id for the row actions column
pub const ACTIONS_COLUMN_ID: &str = "__actions__";

/// Default rendering for null/empty cells
pub const DEFAULT_EMPTY_VALUE: &str = "-";

/// Column value type, drives formatting and filtering behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnType {
    Text,
    Image,
    TextLong,
    TextCopy,
    Lookup,
    LookupMulti,
    Number,
    Currency,
    Date,
    DateTime,
    Boolean,
    Badge,
    Options,
    Custom,
}

impl ColumnType {
    /// Whether cells of this type default to right alignment
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Number | Self::Currency)
    }
}

/// Badge color variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BadgeVariant {
    #[default]
    Default,
    Secondary,
    Destructive,
    Outline,
}

/// Horizontal cell alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Formatting mode for numeric columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NumberFormat {
    #[default]
    Number,
    Currency,
    Duration,
    Percentage,
}

/// Formatting style for date and datetime columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DateStyle {
    /// dd/MM/yy
    #[default]
    Short,
    /// dd/MM/yyyy
    Long,
    /// Humanized distance from now ("5m ago")
    Relative,
}

/// Display mode for options columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OptionDisplay {
    #[default]
    Badge,
    Text,
}

/// An explicit option for an options column: value, label, and optional
/// badge styling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionItem {
    pub value: Value,
    pub label: String,
    pub variant: Option<BadgeVariant>,
    pub icon: Option<String>,
}

impl OptionItem {
    pub fn new(value: impl Into<Value>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            variant: None,
            icon: None,
        }
    }

    pub fn with_variant(mut self, variant: BadgeVariant) -> Self {
        self.variant = Some(variant);
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// Labels and badge variants for boolean columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BooleanOptions {
    pub true_label: String,
    pub false_label: String,
    pub true_variant: BadgeVariant,
    pub false_variant: BadgeVariant,
    /// Label for null cells; falls back to the column's empty value
    pub empty_label: Option<String>,
}

impl Default for BooleanOptions {
    fn default() -> Self {
        Self {
            true_label: "yes".to_string(),
            false_label: "no".to_string(),
            true_variant: BadgeVariant::Default,
            false_variant: BadgeVariant::Secondary,
            empty_label: None,
        }
    }
}

/// Per-column rendering options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ColumnOptions {
    /// Custom text labels per raw value (badge, lookup, lookup-multi and
    /// other text based columns)
    pub labels: HashMap<String, String>,
    /// Boolean label/variant overrides
    pub boolean: Option<BooleanOptions>,
    /// Default badge variant for badge columns
    pub variant: Option<BadgeVariant>,
    /// Badge variants per raw value for badge columns
    pub variants: HashMap<String, BadgeVariant>,
    /// Number formatting mode for numeric columns
    pub format: Option<NumberFormat>,
    /// ISO 4217 currency code for currency formatting (default ILS)
    pub currency: Option<String>,
    /// Date formatting style
    pub date_style: Option<DateStyle>,
    /// Explicit options for options columns; used verbatim for both
    /// rendering and filter option derivation
    pub option_items: Vec<OptionItem>,
    /// How options column cells render
    pub option_display: Option<OptionDisplay>,
}

/// Definition of a single grid column
pub struct ColumnDef<R> {
    id: Option<String>,
    accessor_key: String,
    header: String,
    column_type: ColumnType,
    enable_sorting: bool,
    enable_filtering: bool,
    enable_hiding: bool,
    align: Option<Align>,
    empty_value: String,
    options: ColumnOptions,
    cell: Option<Rc<dyn Fn(&R) -> CellDisplay>>,
}

impl<R> Clone for ColumnDef<R> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            accessor_key: self.accessor_key.clone(),
            header: self.header.clone(),
            column_type: self.column_type,
            enable_sorting: self.enable_sorting,
            enable_filtering: self.enable_filtering,
            enable_hiding: self.enable_hiding,
            align: self.align,
            empty_value: self.empty_value.clone(),
            options: self.options.clone(),
            cell: self.cell.clone(),
        }
    }
}

impl<R: Record> std::fmt::Debug for ColumnDef<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnDef")
            .field("id", &self.column_id())
            .field("header", &self.header)
            .field("column_type", &self.column_type)
            .finish_non_exhaustive()
    }
}

impl<R: Record> ColumnDef<R> {
    /// Create a new column definition
    pub fn new(
        accessor_key: impl Into<String>,
        header: impl Into<String>,
        column_type: ColumnType,
    ) -> Self {
        Self {
            id: None,
            accessor_key: accessor_key.into(),
            header: header.into(),
            column_type,
            enable_sorting: true,
            enable_filtering: true,
            enable_hiding: true,
            align: None,
            empty_value: DEFAULT_EMPTY_VALUE.to_string(),
            options: ColumnOptions::default(),
            cell: None,
        }
    }

    /// Override the column id (defaults to the accessor key)
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Enable or disable sorting (default: enabled)
    pub fn with_sorting(mut self, enabled: bool) -> Self {
        self.enable_sorting = enabled;
        self
    }

    /// Enable or disable filtering (default: enabled)
    pub fn with_filtering(mut self, enabled: bool) -> Self {
        self.enable_filtering = enabled;
        self
    }

    /// Enable or disable hiding (default: enabled)
    pub fn with_hiding(mut self, enabled: bool) -> Self {
        self.enable_hiding = enabled;
        self
    }

    /// Override the cell alignment
    pub fn with_align(mut self, align: Align) -> Self {
        self.align = Some(align);
        self
    }

    /// Override the text rendered for null/empty cells (default "-")
    pub fn with_empty_value(mut self, empty_value: impl Into<String>) -> Self {
        self.empty_value = empty_value.into();
        self
    }

    /// Set the full rendering options block
    pub fn with_options(mut self, options: ColumnOptions) -> Self {
        self.options = options;
        self
    }

    /// Add a raw-value-to-label mapping
    pub fn with_label(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.options.labels.insert(value.into(), label.into());
        self
    }

    /// Set boolean label/variant overrides
    pub fn with_boolean_options(mut self, boolean: BooleanOptions) -> Self {
        self.options.boolean = Some(boolean);
        self
    }

    /// Set the default badge variant
    pub fn with_variant(mut self, variant: BadgeVariant) -> Self {
        self.options.variant = Some(variant);
        self
    }

    /// Map a raw value to a badge variant
    pub fn with_value_variant(
        mut self,
        value: impl Into<String>,
        variant: BadgeVariant,
    ) -> Self {
        self.options.variants.insert(value.into(), variant);
        self
    }

    /// Set the number formatting mode
    pub fn with_number_format(mut self, format: NumberFormat) -> Self {
        self.options.format = Some(format);
        self
    }

    /// Set the currency code for currency formatting
    pub fn with_currency(mut self, code: impl Into<String>) -> Self {
        self.options.currency = Some(code.into());
        self
    }

    /// Set the date formatting style
    pub fn with_date_style(mut self, style: DateStyle) -> Self {
        self.options.date_style = Some(style);
        self
    }

    /// Set explicit option items for an options column
    pub fn with_option_items(mut self, items: Vec<OptionItem>) -> Self {
        self.options.option_items = items;
        self
    }

    /// Set how options column cells render (badge or plain text)
    pub fn with_option_display(mut self, display: OptionDisplay) -> Self {
        self.options.option_display = Some(display);
        self
    }

    /// Set a custom cell renderer; overrides the type-based formatter
    pub fn with_cell(mut self, cell: impl Fn(&R) -> CellDisplay + 'static) -> Self {
        self.cell = Some(Rc::new(cell));
        self
    }

    /// Column id: explicit id if set, otherwise the accessor key
    pub fn column_id(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.accessor_key)
    }

    pub fn accessor_key(&self) -> &str {
        &self.accessor_key
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    pub fn sorting_enabled(&self) -> bool {
        self.enable_sorting
    }

    pub fn filtering_enabled(&self) -> bool {
        self.enable_filtering
    }

    pub fn hiding_enabled(&self) -> bool {
        self.enable_hiding
    }

    /// Effective alignment: explicit override, else right for numeric
    /// types, else left
    pub fn align(&self) -> Align {
        self.align.unwrap_or(if self.column_type.is_numeric() {
            Align::Right
        } else {
            Align::Left
        })
    }

    pub fn empty_value(&self) -> &str {
        &self.empty_value
    }

    pub fn options(&self) -> &ColumnOptions {
        &self.options
    }

    pub fn cell_renderer(&self) -> Option<&Rc<dyn Fn(&R) -> CellDisplay>> {
        self.cell.as_ref()
    }

    /// Read this column's cell from a record
    pub fn value_of(&self, record: &R) -> Value {
        record.field(&self.accessor_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as Row;

    fn column(column_type: ColumnType) -> ColumnDef<Row<String, Value>> {
        ColumnDef::new("amount", "Amount", column_type)
    }

    #[test]
    fn test_new_column_defaults() {
        let col = column(ColumnType::Text);
        assert_eq!(col.column_id(), "amount");
        assert!(col.sorting_enabled());
        assert!(col.filtering_enabled());
        assert!(col.hiding_enabled());
        assert_eq!(col.empty_value(), "-");
        assert_eq!(col.align(), Align::Left);
    }

    #[test]
    fn test_explicit_id_wins_over_accessor() {
        let col = column(ColumnType::Text).with_id("banStatus");
        assert_eq!(col.column_id(), "banStatus");
        assert_eq!(col.accessor_key(), "amount");
    }

    #[test]
    fn test_numeric_columns_align_right_by_default() {
        assert_eq!(column(ColumnType::Number).align(), Align::Right);
        assert_eq!(column(ColumnType::Currency).align(), Align::Right);
        assert_eq!(
            column(ColumnType::Currency).with_align(Align::Center).align(),
            Align::Center
        );
    }

    #[test]
    fn test_boolean_options_defaults() {
        let opts = BooleanOptions::default();
        assert_eq!(opts.true_label, "yes");
        assert_eq!(opts.false_label, "no");
        assert_eq!(opts.true_variant, BadgeVariant::Default);
        assert_eq!(opts.false_variant, BadgeVariant::Secondary);
    }
}
