//! Layout configuration

use serde::Deserialize;

/// Configuration for the column layout engine.
///
/// # Example
///
/// ```
/// use datagrid_lib::layout::LayoutConfig;
///
/// let config = LayoutConfig::default()
///     .with_min_column_width(60.0)
///     .with_default_column_width(120.0);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Lower bound for manually resized widths.
    ///
    /// Default: 85px
    pub min_column_width: f32,

    /// Lower bound for flexible tracks.
    ///
    /// Default: 100px
    pub flex_min_width: f32,

    /// Width used when a column specifies none.
    ///
    /// Default: 150px
    pub default_column_width: f32,

    /// Stacking base for pinned columns.
    ///
    /// Default: 50
    pub pinned_z_base: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_column_width: 85.0,
            flex_min_width: 100.0,
            default_column_width: 150.0,
            pinned_z_base: 50,
        }
    }
}

impl LayoutConfig {
    /// Sets the minimum resized width.
    pub fn with_min_column_width(mut self, px: f32) -> Self {
        self.min_column_width = px;
        self
    }

    /// Sets the minimum flexible track width.
    pub fn with_flex_min_width(mut self, px: f32) -> Self {
        self.flex_min_width = px;
        self
    }

    /// Sets the default column width.
    pub fn with_default_column_width(mut self, px: f32) -> Self {
        self.default_column_width = px;
        self
    }

    /// Sets the pinned stacking base.
    pub fn with_pinned_z_base(mut self, base: u32) -> Self {
        self.pinned_z_base = base;
        self
    }
}
