//! Multi-column sort state machine
//!
//! Header clicks cycle a column through ascending, descending and unsorted.
//! In client mode the engine also reorders the top-level rows; in server mode
//! it only describes the order and asks the caller for data.

mod compare;
mod engine;

pub use compare::*;
pub use engine::*;

use serde::Deserialize;
use serde::Serialize;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Next step of the click cycle; `None` means unsorted.
    pub fn next(direction: Option<SortDirection>) -> Option<SortDirection> {
        match direction {
            None => Some(SortDirection::Asc),
            Some(SortDirection::Asc) => Some(SortDirection::Desc),
            Some(SortDirection::Desc) => None,
        }
    }
}

/// One column of the sort descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortItem {
    /// Column key.
    pub field: String,
    #[serde(rename = "order")]
    pub direction: SortDirection,
}

impl SortItem {
    /// Creates a sort item.
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

/// Ordered sort descriptor; the first item is the primary sort.
///
/// Keys are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<SortItem>", into = "Vec<SortItem>")]
pub struct SortState {
    items: Vec<SortItem>,
}

impl SortState {
    /// Creates an empty descriptor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the items in priority order.
    pub fn items(&self) -> &[SortItem] {
        &self.items
    }

    /// Returns `true` if nothing is sorted.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of sorted columns.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns the priority (0 = primary) of a column.
    pub fn position(&self, field: &str) -> Option<usize> {
        self.items.iter().position(|item| item.field == field)
    }

    /// Returns the direction of a column.
    pub fn direction(&self, field: &str) -> Option<SortDirection> {
        self.items
            .iter()
            .find(|item| item.field == field)
            .map(|item| item.direction)
    }

    /// Sets a column's direction in place, or appends it at lowest priority.
    pub(crate) fn upsert(&mut self, field: &str, direction: SortDirection) {
        match self.items.iter_mut().find(|item| item.field == field) {
            Some(item) => item.direction = direction,
            None => self.items.push(SortItem::new(field, direction)),
        }
    }

    /// Removes a column; the others keep their relative order.
    pub(crate) fn remove(&mut self, field: &str) {
        self.items.retain(|item| item.field != field);
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }
}

impl From<Vec<SortItem>> for SortState {
    /// Builds a descriptor, keeping the first occurrence of each key.
    fn from(items: Vec<SortItem>) -> Self {
        let mut state = SortState::new();
        for item in items {
            if state.position(&item.field).is_none() {
                state.items.push(item);
            }
        }
        state
    }
}

impl From<SortState> for Vec<SortItem> {
    fn from(state: SortState) -> Self {
        state.items
    }
}

/// Sort indicator state for one column header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnSortState {
    pub is_sorted: bool,
    pub direction: Option<SortDirection>,
    /// Priority in the descriptor, 0 = primary.
    pub priority: Option<usize>,
}
