//! Cell formatting
//!
//! `format_cell` turns a raw cell value into a [`CellDisplay`] according
//! to the column type. Formatters take an explicit `now` so relative
//! dates are deterministic and testable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tabula_core::Value;

use crate::column::{
    BadgeVariant, BooleanOptions, ColumnDef, ColumnType, DateStyle, NumberFormat, OptionDisplay,
};
use crate::record::Record;

/// Default currency code when a currency column does not specify one
pub const DEFAULT_CURRENCY: &str = "ILS";

/// A small labeled chip, used by lookup-multi cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chip {
    pub label: String,
    pub variant: BadgeVariant,
}

/// What a cell renders as; the UI layer maps each variant to a widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellDisplay {
    /// Plain text
    Text(String),
    /// Text that may wrap/truncate with an expansion affordance
    LongText(String),
    /// Text with a copy-to-clipboard affordance
    Copyable(String),
    /// Thumbnail image
    Image { url: String, alt: String },
    /// Colored badge
    Badge {
        label: String,
        variant: BadgeVariant,
        icon: Option<String>,
    },
    /// Row of chips
    Chips(Vec<Chip>),
}

impl CellDisplay {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn badge(label: impl Into<String>, variant: BadgeVariant) -> Self {
        Self::Badge {
            label: label.into(),
            variant,
            icon: None,
        }
    }

    /// The plain-text content of this display, used by exports
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(s) | Self::LongText(s) | Self::Copyable(s) => s.clone(),
            Self::Image { alt, .. } => alt.clone(),
            Self::Badge { label, .. } => label.clone(),
            Self::Chips(chips) => chips
                .iter()
                .map(|c| c.label.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

fn group_digits(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Grouped decimal with at most two fraction digits ("1,234.5")
pub fn format_decimal(value: f64) -> String {
    let rounded = format!("{:.2}", value.abs());
    let (int_part, frac_part) = match rounded.split_once('.') {
        Some(parts) => parts,
        None => (rounded.as_str(), ""),
    };
    let frac = frac_part.trim_end_matches('0');
    let sign = if value < 0.0 && rounded.trim_matches(|c| c == '0' || c == '.') != "" {
        "-"
    } else {
        ""
    };
    if frac.is_empty() {
        format!("{sign}{}", group_digits(int_part))
    } else {
        format!("{sign}{}.{frac}", group_digits(int_part))
    }
}

/// Grouped decimal with exactly two fraction digits ("1,234.50")
pub fn format_decimal_fixed(value: f64) -> String {
    let rounded = format!("{:.2}", value.abs());
    let (int_part, frac_part) = match rounded.split_once('.') {
        Some(parts) => parts,
        None => (rounded.as_str(), "00"),
    };
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{}.{frac_part}", group_digits(int_part))
}

fn currency_symbol(code: &str) -> Option<&'static str> {
    match code {
        "ILS" => Some("₪"),
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        _ => None,
    }
}

/// Plain rendering of a number without grouping ("7", "7.5")
fn format_plain(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Format a numeric cell value; `None` when the value cannot coerce
pub fn format_number(
    value: &Value,
    format: NumberFormat,
    currency: Option<&str>,
) -> Option<String> {
    let number = value.as_f64()?;
    Some(match format {
        NumberFormat::Number => format_decimal(number),
        NumberFormat::Currency => {
            let code = currency.unwrap_or(DEFAULT_CURRENCY);
            match currency_symbol(code) {
                Some(symbol) => format!("{symbol}{}", format_decimal_fixed(number)),
                None => format!("{code} {}", format_decimal_fixed(number)),
            }
        }
        NumberFormat::Duration => format!("{} ms", format_plain(number)),
        NumberFormat::Percentage => format!("{}%", format_plain(number)),
    })
}

/// Humanized distance between `target` and `now` ("5m ago", "in 2h")
pub fn relative_time(target: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - target).num_seconds();
    let (past, secs) = if seconds >= 0 {
        (true, seconds)
    } else {
        (false, -seconds)
    };
    if past && secs < 5 {
        return "just now".to_string();
    }
    let amount = if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86_400 {
        format!("{}h", secs / 3600)
    } else {
        format!("{}d", secs / 86_400)
    };
    if past {
        format!("{amount} ago")
    } else {
        format!("in {amount}")
    }
}

/// Format a date cell; datetime columns append the time of day
pub fn format_date(
    value: DateTime<Utc>,
    style: DateStyle,
    with_time: bool,
    now: DateTime<Utc>,
) -> String {
    match style {
        DateStyle::Relative => relative_time(value, now),
        DateStyle::Short if with_time => value.format("%d/%m/%y %H:%M").to_string(),
        DateStyle::Short => value.format("%d/%m/%y").to_string(),
        DateStyle::Long if with_time => value.format("%d/%m/%Y %H:%M").to_string(),
        DateStyle::Long => value.format("%d/%m/%Y").to_string(),
    }
}

/// Render one cell of a record according to its column definition
///
/// A custom cell renderer on the column always wins; otherwise the
/// column type picks the formatter. Null and empty values render the
/// column's empty value.
pub fn format_cell<R: Record>(
    record: &R,
    column: &ColumnDef<R>,
    now: DateTime<Utc>,
) -> CellDisplay {
    if let Some(cell) = column.cell_renderer() {
        return cell(record);
    }

    let value = column.value_of(record);
    let opts = column.options();
    let empty = CellDisplay::text(column.empty_value());

    // Booleans handle null themselves so the empty label override applies
    if column.column_type() == ColumnType::Boolean {
        let boolean = opts.boolean.clone().unwrap_or_default();
        return format_boolean(&value, &boolean, column.empty_value());
    }

    let text = value.to_display_string();
    if value.is_null() || text.is_empty() {
        return empty;
    }

    match column.column_type() {
        ColumnType::Text | ColumnType::Custom => CellDisplay::Text(text),
        ColumnType::TextLong => CellDisplay::LongText(text),
        ColumnType::TextCopy => CellDisplay::Copyable(text),
        ColumnType::Image => CellDisplay::Image {
            url: text,
            alt: column.header().to_string(),
        },
        ColumnType::Lookup => {
            let label = opts.labels.get(&text).cloned().unwrap_or(text);
            CellDisplay::Text(label)
        }
        ColumnType::LookupMulti => {
            let items = match &value {
                Value::Array(items) => items.clone(),
                other => vec![other.clone()],
            };
            let chips = items
                .iter()
                .filter(|item| !item.is_null())
                .map(|item| {
                    let raw = item.to_display_string();
                    Chip {
                        label: opts.labels.get(&raw).cloned().unwrap_or(raw),
                        variant: BadgeVariant::Secondary,
                    }
                })
                .collect::<Vec<_>>();
            if chips.is_empty() {
                empty
            } else {
                CellDisplay::Chips(chips)
            }
        }
        ColumnType::Number | ColumnType::Currency => {
            let format = opts.format.unwrap_or(if column.column_type() == ColumnType::Currency {
                NumberFormat::Currency
            } else {
                NumberFormat::Number
            });
            match format_number(&value, format, opts.currency.as_deref()) {
                Some(formatted) => CellDisplay::Text(formatted),
                None => CellDisplay::Text(text),
            }
        }
        ColumnType::Date | ColumnType::DateTime => {
            let style = opts.date_style.unwrap_or_default();
            let with_time = column.column_type() == ColumnType::DateTime;
            match value.as_datetime() {
                Some(dt) => CellDisplay::Text(format_date(dt, style, with_time, now)),
                None => CellDisplay::Text(text),
            }
        }
        ColumnType::Badge => {
            let variant = opts
                .variants
                .get(&text)
                .copied()
                .or(opts.variant)
                .unwrap_or(BadgeVariant::Secondary);
            let label = opts.labels.get(&text).cloned().unwrap_or(text);
            CellDisplay::badge(label, variant)
        }
        ColumnType::Options => {
            let item = opts
                .option_items
                .iter()
                .find(|item| crate::filter::loose_eq(&item.value, &value));
            match item {
                Some(item) => {
                    let variant = item.variant.unwrap_or(BadgeVariant::Secondary);
                    match opts.option_display.unwrap_or_default() {
                        OptionDisplay::Badge => CellDisplay::Badge {
                            label: item.label.clone(),
                            variant,
                            icon: item.icon.clone(),
                        },
                        OptionDisplay::Text => CellDisplay::Text(item.label.clone()),
                    }
                }
                None => {
                    let label = opts.labels.get(&text).cloned().unwrap_or(text);
                    CellDisplay::Text(label)
                }
            }
        }
        // Booleans are handled above
        ColumnType::Boolean => empty,
    }
}

fn format_boolean(value: &Value, opts: &BooleanOptions, empty_value: &str) -> CellDisplay {
    if value.is_null() {
        let label = opts.empty_label.clone().unwrap_or_else(|| empty_value.to_string());
        return CellDisplay::Text(label);
    }
    // Unparseable non-null values count as false, as "truthiness" does
    if value.as_bool().unwrap_or(false) {
        CellDisplay::badge(opts.true_label.clone(), opts.true_variant)
    } else {
        CellDisplay::badge(opts.false_label.clone(), opts.false_variant)
    }
}
