//! Virtualizer options

use serde::Deserialize;

/// How item sizes are cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeMode {
    /// Sizes are keyed by index; measurements are rare or absent.
    #[default]
    Fixed,
    /// Sizes are keyed by item key and survive reordering.
    Dynamic,
}

/// Configuration for the viewport windowing engine.
///
/// # Example
///
/// ```
/// use datagrid_lib::window::{SizeMode, VirtualizerOptions};
///
/// let options = VirtualizerOptions::default()
///     .with_estimate_size(32.0)
///     .with_overscan(5)
///     .with_mode(SizeMode::Dynamic);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct VirtualizerOptions {
    /// Size assumed for unmeasured items.
    ///
    /// Default: 50px
    pub estimate_size: f32,

    /// Items rendered beyond each edge of the viewport.
    ///
    /// Default: 2
    pub overscan: usize,

    /// Size cache keying.
    ///
    /// Default: [`SizeMode::Fixed`]
    pub mode: SizeMode,
}

impl Default for VirtualizerOptions {
    fn default() -> Self {
        Self {
            estimate_size: 50.0,
            overscan: 2,
            mode: SizeMode::Fixed,
        }
    }
}

impl VirtualizerOptions {
    /// Sets the estimated item size.
    pub fn with_estimate_size(mut self, px: f32) -> Self {
        self.estimate_size = px;
        self
    }

    /// Sets the overscan.
    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    /// Sets the size cache mode.
    pub fn with_mode(mut self, mode: SizeMode) -> Self {
        self.mode = mode;
        self
    }
}
