//! Row expansion state

use std::collections::HashSet;
use std::sync::Arc;

use log::debug;
use serde::Deserialize;
use serde::Serialize;

use crate::model::Row;

use super::expandable_ids;

/// Who owns the expansion state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpandMode {
    /// Toggling flips the expansion set directly.
    #[default]
    Auto,
    /// Toggling only produces a request; the caller applies it with
    /// [`RowExpansion::set_expanded`].
    Controlled,
}

/// Outcome of [`RowExpansion::toggle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpandAction {
    /// The expansion set changed.
    Applied { id: String, expanded: bool },
    /// The caller is asked to move the row to `expanded`.
    Requested { id: String, expanded: bool },
}

/// Expansion set of one table instance.
#[derive(Debug, Clone, Default)]
pub struct RowExpansion {
    mode: ExpandMode,
    expanded: HashSet<String>,
}

impl RowExpansion {
    /// Creates an empty expansion set.
    pub fn new(mode: ExpandMode) -> Self {
        Self {
            mode,
            expanded: HashSet::new(),
        }
    }

    /// Returns the mode.
    pub fn mode(&self) -> ExpandMode {
        self.mode
    }

    /// Returns the expanded ids.
    pub fn expanded(&self) -> &HashSet<String> {
        &self.expanded
    }

    /// Returns `true` if the row is expanded.
    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    /// Handles a click on a row's expand control.
    pub fn toggle(&mut self, id: &str) -> ExpandAction {
        let expanded = !self.is_expanded(id);
        match self.mode {
            ExpandMode::Auto => {
                self.set_expanded(id, expanded);
                ExpandAction::Applied {
                    id: id.to_string(),
                    expanded,
                }
            }
            ExpandMode::Controlled => {
                debug!("Expand requested: {} -> {}", id, expanded);
                ExpandAction::Requested {
                    id: id.to_string(),
                    expanded,
                }
            }
        }
    }

    /// Sets the expansion of a row. Returns `true` if the set changed.
    pub fn set_expanded(&mut self, id: &str, expanded: bool) -> bool {
        if expanded {
            self.expanded.insert(id.to_string())
        } else {
            self.expanded.remove(id)
        }
    }

    /// Expands every row with children. Returns `true` if the set changed.
    pub fn expand_all(&mut self, rows: &[Arc<Row>], id_field: &str) -> bool {
        let before = self.expanded.len();
        self.expanded.extend(expandable_ids(rows, id_field));
        self.expanded.len() != before
    }

    /// Collapses everything. Returns `true` if the set changed.
    pub fn collapse_all(&mut self) -> bool {
        let changed = !self.expanded.is_empty();
        self.expanded.clear();
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_toggle() {
        let mut expansion = RowExpansion::new(ExpandMode::Auto);

        assert_eq!(
            expansion.toggle("row1"),
            ExpandAction::Applied {
                id: "row1".into(),
                expanded: true
            }
        );
        assert!(expansion.is_expanded("row1"));

        expansion.toggle("row1");
        assert!(!expansion.is_expanded("row1"));
    }

    #[test]
    fn test_controlled_toggle_defers() {
        let mut expansion = RowExpansion::new(ExpandMode::Controlled);

        assert_eq!(
            expansion.toggle("row1"),
            ExpandAction::Requested {
                id: "row1".into(),
                expanded: true
            }
        );
        assert!(!expansion.is_expanded("row1"));

        assert!(expansion.set_expanded("row1", true));
        assert!(!expansion.set_expanded("row1", true));
        assert!(expansion.is_expanded("row1"));
    }

    #[test]
    fn test_expand_all_collapse_all() {
        let rows = vec![
            Arc::new(Row::with_id("a").child(Row::with_id("a1").child(Row::with_id("a1x")))),
            Arc::new(Row::with_id("b")),
        ];
        let mut expansion = RowExpansion::default();

        assert!(expansion.expand_all(&rows, "id"));
        assert!(expansion.is_expanded("a"));
        assert!(expansion.is_expanded("a1"));
        assert!(!expansion.is_expanded("b"));
        assert!(!expansion.expand_all(&rows, "id"));

        assert!(expansion.collapse_all());
        assert!(expansion.expanded().is_empty());
        assert!(!expansion.collapse_all());
    }
}
