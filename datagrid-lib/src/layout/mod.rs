//! Column layout engine
//!
//! Turns column definitions plus live resize overrides into grid tracks,
//! resolved pixel widths and pinned offsets.
//!
//! # Example
//!
//! ```
//! use datagrid_lib::layout::{ColumnLayout, LayoutConfig};
//! use datagrid_lib::model::ColumnDefinition;
//!
//! let mut layout = ColumnLayout::new(LayoutConfig::default());
//! layout.set_columns(&[
//!     ColumnDefinition::new("id", "ID").width_px(60.0),
//!     ColumnDefinition::new("name", "Name").flex(),
//!     ColumnDefinition::new("email", "Email").flex(),
//! ]);
//!
//! assert_eq!(
//!     layout.template_columns(),
//!     "60px minmax(100px, 1fr) minmax(100px, 1fr)"
//! );
//! ```

mod config;
mod header;
mod pinned;
mod resize;
mod track;

pub use config::*;
pub use header::*;
pub use resize::ResizeSession;
pub use track::*;

use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt;

use log::debug;
use log::warn;

use crate::error::ConfigError;
use crate::model::ColumnDefinition;
use crate::model::WidthSpec;

/// Listener notified on every override write: column key and new width, or
/// `None` when the override was removed.
pub type WidthListener = Box<dyn Fn(&str, Option<f32>) + Send + Sync>;

/// A track resolved to pixels for a given available width.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedWidth {
    pub key: String,
    pub width: f32,
}

/// Validates a column set.
///
/// Reports duplicate keys (across groups and leaves) and pinned leaf columns
/// without a pixel width. Neither is fatal to layout.
pub fn validate(columns: &[ColumnDefinition]) -> Vec<ConfigError> {
    fn walk<'a>(
        columns: &'a [ColumnDefinition],
        seen: &mut HashSet<&'a str>,
        errors: &mut Vec<ConfigError>,
    ) {
        for column in columns {
            if !seen.insert(column.key.as_str()) {
                errors.push(ConfigError::DuplicateColumnKey(column.key.clone()));
            }
            if column.is_group() {
                walk(&column.children, seen, errors);
            } else if column.pinned.is_pinned() && column.width.pixels().is_none() {
                errors.push(ConfigError::PinnedWithoutPixelWidth {
                    key: column.key.clone(),
                    width: column.width.to_string(),
                });
            }
        }
    }

    let mut seen = HashSet::new();
    let mut errors = Vec::new();
    walk(columns, &mut seen, &mut errors);
    errors
}

/// Column layout state for one table instance.
///
/// Holds the leaf columns in render order, the manual width overrides and the
/// live resize session. Overrides only ever exist for resizable columns.
pub struct ColumnLayout {
    config: LayoutConfig,
    columns: Vec<ColumnDefinition>,
    overrides: HashMap<String, f32>,
    session: Option<ResizeSession>,
    listeners: Vec<WidthListener>,
    revision: u64,
}

impl ColumnLayout {
    /// Creates an empty layout.
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            columns: Vec::new(),
            overrides: HashMap::new(),
            session: None,
            listeners: Vec::new(),
            revision: 0,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Replaces the column set.
    ///
    /// Groups are flattened to their leaves. Overrides for columns that no
    /// longer exist or are no longer resizable are dropped, as is a resize
    /// session targeting such a column. Configuration problems are logged.
    pub fn set_columns(&mut self, columns: &[ColumnDefinition]) {
        for error in validate(columns) {
            warn!("Column configuration: {}", error);
        }

        self.columns = leaf_columns(columns).into_iter().cloned().collect();

        let before = self.overrides.len();
        let columns = &self.columns;
        self.overrides.retain(|key, _| {
            columns
                .iter()
                .any(|c| &c.key == key && Self::resizable(c))
        });
        if self.overrides.len() != before {
            debug!(
                "Dropped {} stale width override(s)",
                before - self.overrides.len()
            );
            self.revision += 1;
        }

        if let Some(session) = &self.session
            && self.column(&session.key).is_none_or(|c| !Self::resizable(c))
        {
            self.session = None;
        }
    }

    /// Returns the leaf columns in render order.
    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    /// Looks up a leaf column by key.
    pub fn column(&self, key: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.key == key)
    }

    /// Returns the current override map.
    pub fn overrides(&self) -> &HashMap<String, f32> {
        &self.overrides
    }

    /// Returns the override revision; bumped on every override change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Subscribes to override writes.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: Fn(&str, Option<f32>) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    // -------------------------------------------------------------------------
    // Tracks
    // -------------------------------------------------------------------------

    /// Returns `true` unless the column is flexible.
    pub fn is_resizable(&self, column: &ColumnDefinition) -> bool {
        Self::resizable(column)
    }

    fn resizable(column: &ColumnDefinition) -> bool {
        !column.width.is_flex()
    }

    /// Computes the grid track for a column.
    ///
    /// Precedence: manual override, explicit width, flexible marker, default.
    pub fn track_size(&self, column: &ColumnDefinition) -> TrackSize {
        if let Some(px) = self.overrides.get(&column.key) {
            return TrackSize::Px(*px);
        }
        match &column.width {
            WidthSpec::Pixels(px) => TrackSize::Px(*px),
            WidthSpec::Css(css) => TrackSize::Css(css.clone()),
            WidthSpec::Flex => TrackSize::MinMax {
                min: self.config.flex_min_width,
            },
            WidthSpec::Auto => TrackSize::Px(self.config.default_column_width),
        }
    }

    /// Returns the tracks of all leaf columns in render order.
    pub fn tracks(&self) -> Vec<TrackSize> {
        self.columns.iter().map(|c| self.track_size(c)).collect()
    }

    /// Renders the track list as a grid template.
    pub fn template_columns(&self) -> String {
        self.tracks()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Renders the track list with a leading fixed track (e.g. a selection
    /// checkbox column).
    pub fn template_with_leading(&self, leading_px: f32) -> String {
        let tracks = self.template_columns();
        if tracks.is_empty() {
            format!("{}px", leading_px)
        } else {
            format!("{}px {}", leading_px, tracks)
        }
    }

    /// Pixel width used when a column has to be treated as fixed.
    ///
    /// Flexible columns count as their minimum, CSS lengths as the default.
    pub(crate) fn fixed_width(&self, column: &ColumnDefinition) -> f32 {
        match self.track_size(column) {
            TrackSize::Px(px) => px,
            TrackSize::MinMax { min } => min,
            TrackSize::Css(_) => self.config.default_column_width,
        }
    }

    /// Returns the current width of a column, or `None` for unknown keys.
    pub fn column_width(&self, key: &str) -> Option<f32> {
        self.column(key).map(|c| self.fixed_width(c))
    }

    /// Resolves every track to pixels for the given available width.
    ///
    /// Fixed and resized tracks keep their width; the remaining space is
    /// split evenly among flexible tracks, each at least the flex minimum.
    pub fn resolve_widths(&self, available: f32) -> Vec<ResolvedWidth> {
        let tracks = self.tracks();
        let fixed: f32 = tracks
            .iter()
            .filter(|t| !t.is_flexible())
            .map(|t| t.pixels().unwrap_or(self.config.default_column_width))
            .sum();
        let flex_count = tracks.iter().filter(|t| t.is_flexible()).count();
        let flex_width = if flex_count == 0 {
            0.0
        } else {
            ((available - fixed) / flex_count as f32).max(self.config.flex_min_width)
        };

        self.columns
            .iter()
            .zip(tracks)
            .map(|(column, track)| ResolvedWidth {
                key: column.key.clone(),
                width: match track {
                    TrackSize::Px(px) => px,
                    TrackSize::MinMax { .. } => flex_width,
                    TrackSize::Css(_) => self.config.default_column_width,
                },
            })
            .collect()
    }

    // -------------------------------------------------------------------------
    // Overrides
    // -------------------------------------------------------------------------

    pub(crate) fn write_override(&mut self, key: &str, width: f32) {
        self.overrides.insert(key.to_string(), width);
        self.revision += 1;
        self.notify(key, Some(width));
    }

    /// Removes the override of a column; its track falls back to the
    /// definition.
    pub fn reset_column(&mut self, key: &str) {
        if self.overrides.remove(key).is_some() {
            debug!("Reset width of column {}", key);
            self.revision += 1;
            self.notify(key, None);
        }
    }

    /// Removes all overrides.
    pub fn reset_all(&mut self) {
        if self.overrides.is_empty() {
            return;
        }
        let keys: Vec<String> = self.overrides.drain().map(|(key, _)| key).collect();
        self.revision += 1;
        for key in &keys {
            self.notify(key, None);
        }
    }

    fn notify(&self, key: &str, width: Option<f32>) {
        for listener in &self.listeners {
            listener(key, width);
        }
    }
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl fmt::Debug for ColumnLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnLayout")
            .field("config", &self.config)
            .field("columns", &self.columns.len())
            .field("overrides", &self.overrides)
            .field("session", &self.session)
            .field("listeners", &self.listeners.len())
            .field("revision", &self.revision)
            .finish()
    }
}
