//! Column configuration store
//!
//! Persists per-table column visibility and order through a pluggable async
//! key-value backend, and reconciles the saved record against the live column
//! set.

mod backend;
mod memory;
mod sqlite;
mod storage;
mod store;

pub use backend::*;
pub use memory::*;
pub use sqlite::*;
pub use storage::*;
pub use store::*;

use std::collections::HashMap;
use std::collections::HashSet;

use serde::Deserialize;
use serde::Serialize;

use crate::model::ColumnDefinition;
use crate::model::PinSide;

/// The persisted record: visible keys and the full key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedColumns {
    #[serde(default)]
    pub visible: Vec<String>,
    #[serde(default)]
    pub order: Vec<String>,
}

impl SavedColumns {
    /// Builds the record for a list of setup items.
    pub fn from_items(items: &[ColumnSetupItem]) -> Self {
        Self {
            visible: items
                .iter()
                .filter(|item| item.visible)
                .map(|item| item.key.clone())
                .collect(),
            order: items.iter().map(|item| item.key.clone()).collect(),
        }
    }
}

/// Visibility and position of one leaf column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSetupItem {
    pub key: String,
    pub label: String,
    pub visible: bool,
    pub order: usize,
    #[serde(default)]
    pub pinned: PinSide,
}

impl ColumnSetupItem {
    fn from_column(column: &ColumnDefinition, visible: bool, order: usize) -> Self {
        Self {
            key: column.key.clone(),
            label: column.label.clone(),
            visible,
            order,
            pinned: column.pinned,
        }
    }
}

/// Builds the setup items for the live leaf columns.
///
/// With a saved record, saved columns come first in saved order with their
/// recorded visibility, unsaved columns follow visible, and saved keys that no
/// longer exist are dropped. Without one, columns keep definition order and
/// are visible unless `initial_visible` is given and omits them.
pub fn reconcile(
    columns: &[&ColumnDefinition],
    saved: Option<&SavedColumns>,
    initial_visible: Option<&[String]>,
) -> Vec<ColumnSetupItem> {
    let Some(saved) = saved else {
        return columns
            .iter()
            .enumerate()
            .map(|(index, column)| {
                let visible = initial_visible.is_none_or(|keys| keys.contains(&column.key));
                ColumnSetupItem::from_column(column, visible, index)
            })
            .collect();
    };

    let mut remaining: HashMap<&str, &ColumnDefinition> =
        columns.iter().map(|c| (c.key.as_str(), *c)).collect();
    let visible: HashSet<&str> = saved.visible.iter().map(String::as_str).collect();
    let mut items = Vec::with_capacity(columns.len());

    for key in &saved.order {
        if let Some(column) = remaining.remove(key.as_str()) {
            let order = items.len();
            items.push(ColumnSetupItem::from_column(
                column,
                visible.contains(key.as_str()),
                order,
            ));
        }
    }
    for column in columns {
        if remaining.contains_key(column.key.as_str()) {
            let order = items.len();
            items.push(ColumnSetupItem::from_column(column, true, order));
        }
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("id", "ID"),
            ColumnDefinition::new("name", "Name"),
            ColumnDefinition::new("email", "Email"),
        ]
    }

    fn keys(items: &[ColumnSetupItem]) -> Vec<(&str, bool, usize)> {
        items
            .iter()
            .map(|i| (i.key.as_str(), i.visible, i.order))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let columns = columns();
        let refs: Vec<&ColumnDefinition> = columns.iter().collect();

        let items = reconcile(&refs, None, None);
        assert_eq!(
            keys(&items),
            vec![("id", true, 0), ("name", true, 1), ("email", true, 2)]
        );

        let initial = vec!["name".to_string()];
        let items = reconcile(&refs, None, Some(&initial));
        assert_eq!(
            keys(&items),
            vec![("id", false, 0), ("name", true, 1), ("email", false, 2)]
        );
    }

    #[test]
    fn test_saved_order_new_and_dropped_columns() {
        let mut columns = columns();
        columns.push(ColumnDefinition::new("phone", "Phone"));
        let refs: Vec<&ColumnDefinition> = columns.iter().collect();
        let saved = SavedColumns {
            visible: vec!["email".into(), "gone".into()],
            order: vec!["email".into(), "gone".into(), "id".into(), "name".into()],
        };

        let items = reconcile(&refs, Some(&saved), None);
        assert_eq!(
            keys(&items),
            vec![
                ("email", true, 0),
                ("id", false, 1),
                ("name", false, 2),
                ("phone", true, 3),
            ]
        );
    }

    #[test]
    fn test_round_trip() {
        let columns = columns();
        let refs: Vec<&ColumnDefinition> = columns.iter().collect();
        let saved = SavedColumns {
            visible: vec!["name".into()],
            order: vec!["name".into(), "email".into(), "id".into()],
        };

        let items = reconcile(&refs, Some(&saved), None);
        assert_eq!(SavedColumns::from_items(&items), saved);
        assert_eq!(
            reconcile(&refs, Some(&SavedColumns::from_items(&items)), None),
            items
        );
    }
}
