//! Sort engine

use std::cmp::Ordering;
use std::sync::Arc;

use log::debug;
use serde::Deserialize;
use serde::Serialize;

use crate::layout::leaf_columns;
use crate::model::ColumnDefinition;
use crate::model::Row;
use crate::pagination::Pagination;
use crate::pagination::RequestPayload;

use super::compare_values;
use super::ColumnSortState;
use super::SortDirection;
use super::SortItem;
use super::SortState;

/// Where sorting happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Rows are reordered locally.
    #[serde(alias = "front")]
    Client,
    /// The caller fetches sorted data; every change emits a request.
    #[default]
    Server,
}

/// Sort configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SortConfig {
    /// Default: [`SortMode::Server`]
    pub mode: SortMode,

    /// Several columns may be sorted at once.
    ///
    /// Default: true
    pub multiple: bool,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            mode: SortMode::Server,
            multiple: true,
        }
    }
}

impl SortConfig {
    /// Client-side sorting.
    pub fn client() -> Self {
        Self {
            mode: SortMode::Client,
            ..Self::default()
        }
    }

    /// Server-side sorting.
    pub fn server() -> Self {
        Self::default()
    }

    /// Sets multi-column sorting.
    pub fn with_multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }
}

/// Events produced by the sort engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortEvent {
    /// The descriptor changed.
    StateChanged(SortState),
    /// Client mode: a column was sorted.
    Sorted {
        field: String,
        direction: SortDirection,
        sort_state: SortState,
    },
    /// Server mode: data for the new order is needed.
    Request(RequestPayload),
}

/// Sort state machine of one table instance.
#[derive(Debug, Clone, Default)]
pub struct SortEngine {
    config: SortConfig,
    state: SortState,
    /// Top-level row order before any sort.
    original: Option<Vec<Arc<Row>>>,
}

impl SortEngine {
    /// Creates an engine with nothing sorted.
    pub fn new(config: SortConfig) -> Self {
        Self {
            config,
            state: SortState::new(),
            original: None,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SortConfig {
        &self.config
    }

    /// Returns the descriptor.
    pub fn state(&self) -> &SortState {
        &self.state
    }

    /// Returns `true` if any column is sorted.
    pub fn has_sorted_columns(&self) -> bool {
        !self.state.is_empty()
    }

    /// Returns the indicator state of a column.
    pub fn get_sort_state(&self, key: &str) -> ColumnSortState {
        let priority = self.state.position(key);
        ColumnSortState {
            is_sorted: priority.is_some(),
            direction: self.state.direction(key),
            priority,
        }
    }

    /// Handles a click on a column header.
    ///
    /// Non-sortable columns are ignored and produce no events.
    pub fn handle_header_click(
        &mut self,
        column: &ColumnDefinition,
        pagination: &Pagination,
    ) -> Vec<SortEvent> {
        if !column.sortable {
            return Vec::new();
        }

        let key = column.key.as_str();
        let next = SortDirection::next(self.state.direction(key));

        match (self.config.multiple, next) {
            (true, Some(direction)) => self.state.upsert(key, direction),
            (true, None) => self.state.remove(key),
            (false, Some(direction)) => {
                self.state = SortState::from(vec![SortItem::new(key, direction)]);
            }
            (false, None) => self.state.clear(),
        }
        debug!("Sort {} -> {:?}, state {:?}", key, next, self.state.items());

        let mut events = vec![SortEvent::StateChanged(self.state.clone())];
        match self.config.mode {
            SortMode::Client => {
                if let Some(direction) = next {
                    events.push(SortEvent::Sorted {
                        field: key.to_string(),
                        direction,
                        sort_state: self.state.clone(),
                    });
                }
            }
            SortMode::Server => {
                events.push(SortEvent::Request(RequestPayload::new(
                    pagination,
                    self.state.items().to_vec(),
                )));
            }
        }
        events
    }

    /// Clears the descriptor. Server mode still requests data.
    pub fn reset_sort(&mut self, pagination: &Pagination) -> Vec<SortEvent> {
        self.state.clear();

        let mut events = vec![SortEvent::StateChanged(SortState::new())];
        if self.config.mode == SortMode::Server {
            events.push(SortEvent::Request(RequestPayload::new(
                pagination,
                Vec::new(),
            )));
        }
        events
    }

    /// Replaces the descriptor with caller-owned state. Duplicate keys are
    /// dropped, the first occurrence wins.
    pub fn set_sort_state(&mut self, items: Vec<SortItem>) {
        self.state = SortState::from(items);
    }

    // -------------------------------------------------------------------------
    // Client-side ordering
    // -------------------------------------------------------------------------

    /// Records the unsorted order of the top-level rows.
    ///
    /// Only the first non-empty call has an effect until
    /// [`clear_original`](Self::clear_original).
    pub fn capture_original(&mut self, rows: &[Arc<Row>]) {
        if self.original.is_none() && !rows.is_empty() {
            self.original = Some(rows.to_vec());
        }
    }

    /// Forgets the recorded order.
    pub fn clear_original(&mut self) {
        self.original = None;
    }

    /// Returns the top-level rows in display order.
    ///
    /// Server mode returns `rows` unchanged. In client mode an empty
    /// descriptor restores the recorded original order; otherwise rows are
    /// stably sorted by the descriptor, first column first. Children keep
    /// their order.
    pub fn sorted_view(&self, rows: &[Arc<Row>], columns: &[ColumnDefinition]) -> Vec<Arc<Row>> {
        if self.config.mode == SortMode::Server {
            return rows.to_vec();
        }
        if self.state.is_empty() {
            return match &self.original {
                Some(original) => original.clone(),
                None => rows.to_vec(),
            };
        }

        let leaves = leaf_columns(columns);
        let sort_columns: Vec<(&SortItem, Option<&ColumnDefinition>)> = self
            .state
            .items()
            .iter()
            .map(|item| (item, leaves.iter().copied().find(|c| c.key == item.field)))
            .collect();

        let mut sorted = rows.to_vec();
        sorted.sort_by(|a, b| {
            for (item, column) in &sort_columns {
                let (left, right) = match column {
                    Some(column) => (column.sort_value_of(a), column.sort_value_of(b)),
                    None => (
                        a.get_path(&item.field).cloned().unwrap_or_default(),
                        b.get_path(&item.field).cloned().unwrap_or_default(),
                    ),
                };
                let ordering = compare_values(&left, &right, item.direction);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
        sorted
    }
}
