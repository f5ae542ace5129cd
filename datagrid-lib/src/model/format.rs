//! Cell display formats

use std::fmt;
use std::sync::Arc;

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::Row;
use super::Value;

/// Custom cell formatter.
pub type FormatFn = Arc<dyn Fn(&Value, Option<&Row>) -> String + Send + Sync>;

/// Number rendering styles for [`CellFormat::Number`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberStyle {
    /// Grouped thousands, up to three fraction digits.
    #[default]
    Default,
    /// Short notation (`1.2K`, `15M`).
    Compact,
    /// Ratio rendered as percent (`0.15` → `15.00%`).
    Percent,
    /// Fixed fraction digits, no grouping.
    Decimal,
}

/// Date rendering styles for [`CellFormat::Date`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateStyle {
    /// `1/31/2024`
    #[default]
    Short,
    /// `January 31, 2024`
    Long,
    /// `2:05:09 PM`
    Time,
    /// `1/31/2024 2:05:09 PM`
    DateTime,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_decimals() -> usize {
    2
}

fn default_true_text() -> String {
    "Yes".to_string()
}

fn default_false_text() -> String {
    "No".to_string()
}

fn default_colored() -> bool {
    true
}

/// How a column renders its values.
///
/// One variant per format kind; a column carries at most one.
///
/// ```
/// use datagrid_lib::model::{format_cell, CellFormat, Value};
///
/// let format = CellFormat::currency("EUR");
/// assert_eq!(format_cell(&Value::from(-1234.5), Some(&format), None).text, "-€1,234.50");
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CellFormat {
    Currency {
        #[serde(default = "default_currency")]
        code: String,
        #[serde(default)]
        decimals: Option<usize>,
    },
    Percentage {
        #[serde(default = "default_decimals")]
        decimals: usize,
        /// Multiply by 100 first (`0.15` → `15%`).
        #[serde(default)]
        multiplier: bool,
    },
    Number {
        #[serde(default)]
        style: NumberStyle,
        #[serde(default)]
        decimals: Option<usize>,
    },
    Date {
        #[serde(default)]
        style: DateStyle,
    },
    Boolean {
        #[serde(default = "default_true_text")]
        true_text: String,
        #[serde(default = "default_false_text")]
        false_text: String,
        #[serde(default = "default_colored")]
        colored: bool,
    },
    FileSize {
        #[serde(default = "default_decimals")]
        decimals: usize,
    },
    #[serde(skip)]
    Custom(FormatFn),
}

impl CellFormat {
    /// Currency with two decimals.
    pub fn currency(code: impl Into<String>) -> Self {
        CellFormat::Currency {
            code: code.into(),
            decimals: None,
        }
    }

    /// Boolean with `Yes`/`No` and colour classes.
    pub fn boolean() -> Self {
        CellFormat::Boolean {
            true_text: default_true_text(),
            false_text: default_false_text(),
            colored: true,
        }
    }

    /// Custom formatter function.
    pub fn custom<F>(formatter: F) -> Self
    where
        F: Fn(&Value, Option<&Row>) -> String + Send + Sync + 'static,
    {
        CellFormat::Custom(Arc::new(formatter))
    }

    /// Returns the variant name.
    pub fn kind(&self) -> &'static str {
        match self {
            CellFormat::Currency { .. } => "currency",
            CellFormat::Percentage { .. } => "percentage",
            CellFormat::Number { .. } => "number",
            CellFormat::Date { .. } => "date",
            CellFormat::Boolean { .. } => "boolean",
            CellFormat::FileSize { .. } => "file_size",
            CellFormat::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for CellFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellFormat::Currency { code, decimals } => f
                .debug_struct("Currency")
                .field("code", code)
                .field("decimals", decimals)
                .finish(),
            CellFormat::Percentage {
                decimals,
                multiplier,
            } => f
                .debug_struct("Percentage")
                .field("decimals", decimals)
                .field("multiplier", multiplier)
                .finish(),
            CellFormat::Number { style, decimals } => f
                .debug_struct("Number")
                .field("style", style)
                .field("decimals", decimals)
                .finish(),
            CellFormat::Date { style } => f.debug_struct("Date").field("style", style).finish(),
            CellFormat::Boolean {
                true_text,
                false_text,
                colored,
            } => f
                .debug_struct("Boolean")
                .field("true_text", true_text)
                .field("false_text", false_text)
                .field("colored", colored)
                .finish(),
            CellFormat::FileSize { decimals } => f
                .debug_struct("FileSize")
                .field("decimals", decimals)
                .finish(),
            CellFormat::Custom(_) => f.write_str("Custom(<fn>)"),
        }
    }
}

/// A formatted cell: display text plus an optional style class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedCell {
    pub text: String,
    pub class: Option<String>,
}

impl FormattedCell {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            class: None,
        }
    }
}

/// Formats a value for display.
///
/// Without a format the value's own text is used. Values a numeric format
/// cannot interpret are rendered as-is rather than failing.
pub fn format_cell(value: &Value, format: Option<&CellFormat>, row: Option<&Row>) -> FormattedCell {
    let Some(format) = format else {
        return FormattedCell::plain(value.to_string());
    };

    match format {
        CellFormat::Custom(formatter) => FormattedCell::plain(formatter(value, row)),
        CellFormat::Currency { code, decimals } => {
            FormattedCell::plain(format_currency(value, code, decimals.unwrap_or(2)))
        }
        CellFormat::Percentage {
            decimals,
            multiplier,
        } => FormattedCell::plain(match value.as_number() {
            Some(n) => {
                let n = if *multiplier { n * 100.0 } else { n };
                format!("{:.*}%", decimals, n)
            }
            None => value.to_string(),
        }),
        CellFormat::Number { style, decimals } => {
            FormattedCell::plain(format_number(value, *style, *decimals))
        }
        CellFormat::Date { style } => FormattedCell::plain(format_date(value, *style)),
        CellFormat::Boolean {
            true_text,
            false_text,
            colored,
        } => {
            let truthy = value.is_truthy();
            FormattedCell {
                text: if truthy { true_text } else { false_text }.clone(),
                class: colored.then(|| {
                    if truthy {
                        "text-positive".to_string()
                    } else {
                        "text-negative".to_string()
                    }
                }),
            }
        }
        CellFormat::FileSize { decimals } => FormattedCell::plain(match value.as_number() {
            Some(n) => format_file_size(n, *decimals),
            None => value.to_string(),
        }),
    }
}

fn currency_symbol(code: &str) -> &str {
    match code {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "UAH" => "₴",
        "JPY" | "CNY" => "¥",
        other => other,
    }
}

fn format_currency(value: &Value, code: &str, decimals: usize) -> String {
    if value.is_null() {
        return String::new();
    }
    let Some(n) = value.as_number() else {
        return value.to_string();
    };
    let body = group_fixed(n.abs(), decimals);
    let symbol = currency_symbol(code);
    if n < 0.0 {
        format!("-{}{}", symbol, body)
    } else {
        format!("{}{}", symbol, body)
    }
}

fn format_number(value: &Value, style: NumberStyle, decimals: Option<usize>) -> String {
    let Some(n) = value.as_number() else {
        return value.to_string();
    };
    match style {
        NumberStyle::Compact => format_compact(n),
        NumberStyle::Percent => format!("{:.*}%", decimals.unwrap_or(2), n * 100.0),
        NumberStyle::Decimal => format!("{:.*}", decimals.unwrap_or(2), n),
        NumberStyle::Default => match decimals {
            Some(d) => format!("{:.*}", d, n),
            None => {
                let grouped = trim_fraction(&group_fixed(n.abs(), 3));
                if n < 0.0 {
                    format!("-{}", grouped)
                } else {
                    grouped
                }
            }
        },
    }
}

fn format_compact(n: f64) -> String {
    const UNITS: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];

    let abs = n.abs();
    let (scaled, suffix) = UNITS
        .iter()
        .find(|(unit, _)| abs >= *unit)
        .map(|(unit, suffix)| (abs / unit, *suffix))
        .unwrap_or((abs, ""));
    // Two significant digits below 10, whole numbers above.
    let digits = if scaled < 10.0 { 1 } else { 0 };
    let text = trim_fraction(&format!("{:.*}", digits, scaled));
    let sign = if n < 0.0 { "-" } else { "" };
    format!("{}{}{}", sign, text, suffix)
}

fn format_date(value: &Value, style: DateStyle) -> String {
    if !value.is_truthy() {
        return String::new();
    }
    let Some(date) = parse_date(value) else {
        return value.to_string();
    };
    let date_part = date.format("%-m/%-d/%Y").to_string();
    let time_part = date.format("%-I:%M:%S %p").to_string();
    match style {
        DateStyle::Short => date_part,
        DateStyle::Long => date.format("%B %-d, %Y").to_string(),
        DateStyle::Time => time_part,
        DateStyle::DateTime => format!("{} {}", date_part, time_part),
    }
}

fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::DateTime(date) => Some(*date),
        Value::Int(ms) => DateTime::from_timestamp_millis(*ms),
        Value::Float(ms) => DateTime::from_timestamp_millis(*ms as i64),
        Value::String(s) => {
            if let Ok(date) = DateTime::parse_from_rfc3339(s) {
                return Some(date.with_timezone(&Utc));
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|d| d.and_utc())
        }
        _ => None,
    }
}

fn format_file_size(n: f64, decimals: usize) -> String {
    const SIZES: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

    if n == 0.0 {
        return "0 Bytes".to_string();
    }
    let mut index = 0;
    let mut scaled = n;
    while scaled.abs() >= 1024.0 && index < SIZES.len() - 1 {
        scaled /= 1024.0;
        index += 1;
    }
    format!(
        "{} {}",
        trim_fraction(&format!("{:.*}", decimals, scaled)),
        SIZES[index]
    )
}

/// Fixed decimals with comma-grouped integer digits. `n` must be non-negative.
fn group_fixed(n: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, n);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    match frac_part {
        Some(frac) => format!("{}.{}", grouped, frac),
        None => grouped,
    }
}

fn trim_fraction(text: &str) -> String {
    if !text.contains('.') {
        return text.to_string();
    }
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}
