//! Column definitions

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use super::CellFormat;
use super::Row;
use super::Value;

/// Custom accessor returning the value a column sorts by.
///
/// Receives the row and the column key.
pub type SortValueFn = Arc<dyn Fn(&Row, &str) -> Value + Send + Sync>;

/// Horizontal alignment for column content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Edge a column is pinned to while the body scrolls horizontally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinSide {
    #[default]
    None,
    Left,
    Right,
}

impl PinSide {
    /// Returns `true` for left or right pinning.
    pub fn is_pinned(self) -> bool {
        self != PinSide::None
    }
}

/// How a column's width is specified.
///
/// In JSON: a number or `"120px"` is a pixel width, `"flex"` is flexible,
/// a missing value or `"auto"` falls back to the default width, anything else
/// (`"12rem"`, `"20%"`) is kept verbatim as a CSS length.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "WidthRepr", into = "WidthRepr")]
pub enum WidthSpec {
    /// No width given: default width, resizable.
    #[default]
    Auto,
    /// Explicit pixel width, resizable.
    Pixels(f32),
    /// Shares the remaining space, not resizable.
    Flex,
    /// Any other CSS length, resizable; its pixel size is only known once
    /// rendered.
    Css(String),
}

impl WidthSpec {
    /// Parses a width string as written in column configs.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("auto") {
            return WidthSpec::Auto;
        }
        if trimmed.eq_ignore_ascii_case("flex") {
            return WidthSpec::Flex;
        }
        if let Some(number) = trimmed.strip_suffix("px")
            && let Ok(px) = number.trim().parse::<f32>()
        {
            return WidthSpec::Pixels(px);
        }
        WidthSpec::Css(trimmed.to_string())
    }

    /// Returns the pixel width if this is an explicit pixel width.
    pub fn pixels(&self) -> Option<f32> {
        match self {
            WidthSpec::Pixels(px) => Some(*px),
            _ => None,
        }
    }

    /// Returns `true` for the flexible marker.
    pub fn is_flex(&self) -> bool {
        matches!(self, WidthSpec::Flex)
    }

    /// Returns `true` if no width was given.
    pub fn is_auto(&self) -> bool {
        matches!(self, WidthSpec::Auto)
    }
}

impl fmt::Display for WidthSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidthSpec::Auto => f.write_str("auto"),
            WidthSpec::Pixels(px) => write!(f, "{}px", px),
            WidthSpec::Flex => f.write_str("flex"),
            WidthSpec::Css(css) => f.write_str(css),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum WidthRepr {
    Pixels(f32),
    Text(String),
}

impl From<WidthRepr> for WidthSpec {
    fn from(repr: WidthRepr) -> Self {
        match repr {
            WidthRepr::Pixels(px) => WidthSpec::Pixels(px),
            WidthRepr::Text(text) => WidthSpec::parse(&text),
        }
    }
}

impl From<WidthSpec> for WidthRepr {
    fn from(spec: WidthSpec) -> Self {
        WidthRepr::Text(spec.to_string())
    }
}

/// Column configuration.
///
/// Columns define the structure of the table: key into the row fields,
/// header text, width, alignment, pinning, sorting and formatting. A column
/// with children is a header group; only its leaves render as tracks.
///
/// # Examples
///
/// ```
/// use datagrid_lib::model::{Alignment, ColumnDefinition, PinSide};
///
/// let columns = vec![
///     ColumnDefinition::new("id", "ID").width_px(60.0).pin(PinSide::Left),
///     ColumnDefinition::new("name", "Name").flex().sortable(),
///     ColumnDefinition::new("revenue", "Revenue").align(Alignment::Right),
/// ];
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Key of the row field (dotted paths allowed).
    pub key: String,
    /// Header text.
    pub label: String,
    /// Width specification.
    #[serde(default, skip_serializing_if = "WidthSpec::is_auto")]
    pub width: WidthSpec,
    /// Horizontal alignment.
    #[serde(default)]
    pub align: Alignment,
    /// Pinned edge.
    #[serde(default, alias = "fixed")]
    pub pinned: PinSide,
    /// Whether header clicks sort by this column.
    #[serde(default)]
    pub sortable: bool,
    /// Custom sort accessor; defaults to dotted-path lookup of `key`.
    #[serde(skip)]
    pub sort_value: Option<SortValueFn>,
    /// Nested columns (grouped header).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ColumnDefinition>,
    /// Display format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<CellFormat>,
    /// Header tooltip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
}

impl ColumnDefinition {
    /// Create a column with default width.
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            width: WidthSpec::Auto,
            align: Alignment::Left,
            pinned: PinSide::None,
            sortable: false,
            sort_value: None,
            children: Vec::new(),
            format: None,
            tooltip: None,
        }
    }

    /// Create a header group.
    pub fn group(
        key: impl Into<String>,
        label: impl Into<String>,
        children: Vec<ColumnDefinition>,
    ) -> Self {
        Self {
            children,
            ..Self::new(key, label)
        }
    }

    /// Set the width spec.
    pub fn width(mut self, width: WidthSpec) -> Self {
        self.width = width;
        self
    }

    /// Set an explicit pixel width.
    pub fn width_px(self, px: f32) -> Self {
        self.width(WidthSpec::Pixels(px))
    }

    /// Make the column flexible (shares remaining space, not resizable).
    pub fn flex(self) -> Self {
        self.width(WidthSpec::Flex)
    }

    /// Set the column alignment.
    pub fn align(mut self, align: Alignment) -> Self {
        self.align = align;
        self
    }

    /// Pin the column to an edge.
    pub fn pin(mut self, side: PinSide) -> Self {
        self.pinned = side;
        self
    }

    /// Make the column sortable.
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Use a custom accessor for sorting.
    pub fn sort_value<F>(mut self, accessor: F) -> Self
    where
        F: Fn(&Row, &str) -> Value + Send + Sync + 'static,
    {
        self.sort_value = Some(Arc::new(accessor));
        self
    }

    /// Set the display format.
    pub fn format(mut self, format: CellFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Set the header tooltip.
    pub fn tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    /// Returns `true` if this column groups other columns.
    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }

    /// Resolves this column's raw cell value from a row.
    pub fn value_of<'a>(&self, row: &'a Row) -> Option<&'a Value> {
        row.get_path(&self.key)
    }

    /// Resolves the value this column sorts by.
    pub fn sort_value_of(&self, row: &Row) -> Value {
        match &self.sort_value {
            Some(accessor) => accessor(row, &self.key),
            None => row.get_path(&self.key).cloned().unwrap_or(Value::Null),
        }
    }
}

impl fmt::Debug for ColumnDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDefinition")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("width", &self.width)
            .field("align", &self.align)
            .field("pinned", &self.pinned)
            .field("sortable", &self.sortable)
            .field("sort_value", &self.sort_value.as_ref().map(|_| "<fn>"))
            .field("children", &self.children)
            .field("format", &self.format)
            .field("tooltip", &self.tooltip)
            .finish()
    }
}
