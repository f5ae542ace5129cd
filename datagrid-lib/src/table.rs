//! Table facade

use std::collections::VecDeque;
use std::sync::Arc;

use log::debug;
use log::warn;
use serde::Deserialize;

use crate::columns::ColumnConfigStore;
use crate::columns::ColumnSetupItem;
use crate::columns::ColumnStorage;
use crate::columns::ColumnStoreConfig;
use crate::error::ConfigError;
use crate::hierarchy::flatten;
use crate::hierarchy::ExpandAction;
use crate::hierarchy::ExpandMode;
use crate::hierarchy::FlattenedRow;
use crate::hierarchy::RowExpansion;
use crate::hierarchy::DEFAULT_ID_FIELD;
use crate::layout::leaf_columns;
use crate::layout::ColumnLayout;
use crate::layout::LayoutConfig;
use crate::model::ColumnDefinition;
use crate::model::Row;
use crate::pagination::Pagination;
use crate::pagination::RequestPayload;
use crate::sort::ColumnSortState;
use crate::sort::SortConfig;
use crate::sort::SortDirection;
use crate::sort::SortEngine;
use crate::sort::SortEvent;
use crate::sort::SortItem;
use crate::sort::SortState;
use crate::window::VirtualItem;
use crate::window::VirtualRange;
use crate::window::Virtualizer;
use crate::window::VirtualizerOptions;

/// Configuration for a [`Table`].
///
/// # Example
///
/// ```
/// use datagrid_lib::TableConfig;
/// use datagrid_lib::sort::SortConfig;
///
/// let config = TableConfig::default()
///     .with_sort(SortConfig::client())
///     .with_storage_key("users-table");
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub layout: LayoutConfig,
    pub virtualizer: VirtualizerOptions,
    pub sort: SortConfig,
    pub expand_mode: ExpandMode,

    /// Field holding row identity.
    ///
    /// Default: `"id"`
    pub id_field: String,

    /// Key of the persisted column configuration. Without one nothing is
    /// persisted.
    pub storage_key: Option<String>,

    /// Columns visible when nothing is saved.
    pub initial_visible: Option<Vec<String>>,

    /// Initial pagination.
    pub pagination: Pagination,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            virtualizer: VirtualizerOptions::default(),
            sort: SortConfig::default(),
            expand_mode: ExpandMode::default(),
            id_field: DEFAULT_ID_FIELD.to_string(),
            storage_key: None,
            initial_visible: None,
            pagination: Pagination::default(),
        }
    }
}

impl TableConfig {
    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_virtualizer(mut self, options: VirtualizerOptions) -> Self {
        self.virtualizer = options;
        self
    }

    pub fn with_sort(mut self, sort: SortConfig) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_expand_mode(mut self, mode: ExpandMode) -> Self {
        self.expand_mode = mode;
        self
    }

    pub fn with_id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = field.into();
        self
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = Some(key.into());
        self
    }

    pub fn with_initial_visible<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.initial_visible = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    fn store_config(&self) -> Option<ColumnStoreConfig> {
        self.storage_key.as_ref().map(|key| ColumnStoreConfig {
            key: key.clone(),
            initial_visible: self.initial_visible.clone(),
        })
    }
}

/// What changed since the flags were last taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirtyFlags {
    pub columns: bool,
    pub data: bool,
    pub expansion: bool,
    pub sort: bool,
    pub resize: bool,
}

impl DirtyFlags {
    /// Returns `true` if anything changed.
    pub fn any(&self) -> bool {
        self.columns || self.data || self.expansion || self.sort || self.resize
    }

    fn affects_rows(&self) -> bool {
        self.data || self.expansion || self.sort
    }

    fn merge(&mut self, other: DirtyFlags) {
        self.columns |= other.columns;
        self.data |= other.data;
        self.expansion |= other.expansion;
        self.sort |= other.sort;
        self.resize |= other.resize;
    }
}

/// Signals for the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    /// Data for the given page and sort order is needed.
    Request(RequestPayload),
    /// Client mode: a column was sorted.
    Sort {
        field: String,
        direction: SortDirection,
        sort_state: SortState,
    },
    /// The sort descriptor changed.
    SortStateChanged(SortState),
    /// Controlled expansion: the caller is asked to expand or collapse a row.
    ExpandRequested { id: String, expanded: bool },
}

impl From<SortEvent> for TableEvent {
    fn from(event: SortEvent) -> Self {
        match event {
            SortEvent::StateChanged(state) => TableEvent::SortStateChanged(state),
            SortEvent::Sorted {
                field,
                direction,
                sort_state,
            } => TableEvent::Sort {
                field,
                direction,
                sort_state,
            },
            SortEvent::Request(payload) => TableEvent::Request(payload),
        }
    }
}

/// One table instance.
///
/// Owns the layout, sort, expansion and windowing state for a set of columns
/// and rows. Inputs mark dirty flags; derived state (sorted and flattened
/// rows, column tracks) is recomputed lazily on the next read. Signals for
/// the caller queue up until [`drain_events`](Self::drain_events).
///
/// # Example
///
/// ```
/// use datagrid_lib::{Table, TableConfig};
/// use datagrid_lib::model::{ColumnDefinition, Row};
/// use datagrid_lib::sort::SortConfig;
///
/// let mut table = Table::new(TableConfig::default().with_sort(SortConfig::client()));
/// table.set_columns(vec![ColumnDefinition::new("name", "Name").sortable()]);
/// table.set_data(vec![
///     Row::with_id("b").set("name", "Bob"),
///     Row::with_id("a").set("name", "Alice"),
/// ]);
///
/// table.header_click("name");
/// let names: Vec<_> = table
///     .rows()
///     .unwrap()
///     .iter()
///     .map(|r| r.key.clone())
///     .collect();
/// assert_eq!(names, vec!["a", "b"]);
/// ```
#[derive(Debug)]
pub struct Table {
    config: TableConfig,
    columns: Vec<ColumnDefinition>,
    data: Vec<Arc<Row>>,
    layout: ColumnLayout,
    sort: SortEngine,
    expansion: RowExpansion,
    virtualizer: Virtualizer,
    pagination: Pagination,
    store: Option<ColumnConfigStore>,
    storage: Option<ColumnStorage>,
    /// Store revision the layout was last built from.
    store_revision: u64,
    rows: Vec<FlattenedRow>,
    rows_stale: bool,
    dirty: DirtyFlags,
    events: VecDeque<TableEvent>,
}

impl Table {
    /// Creates a table without persistence.
    pub fn new(config: TableConfig) -> Self {
        Self::with_storage(config, None)
    }

    /// Creates a table persisting its column configuration to `storage`
    /// under the configured storage key.
    pub fn with_storage(config: TableConfig, storage: Option<ColumnStorage>) -> Self {
        Self {
            layout: ColumnLayout::new(config.layout.clone()),
            sort: SortEngine::new(config.sort.clone()),
            expansion: RowExpansion::new(config.expand_mode),
            virtualizer: Virtualizer::new(config.virtualizer.clone()),
            pagination: config.pagination.clone(),
            config,
            columns: Vec::new(),
            data: Vec::new(),
            store: None,
            storage,
            store_revision: 0,
            rows: Vec::new(),
            rows_stale: true,
            dirty: DirtyFlags::default(),
            events: VecDeque::new(),
        }
    }

    /// Creates a table and waits for its saved column configuration.
    pub async fn open(
        config: TableConfig,
        columns: Vec<ColumnDefinition>,
        storage: Option<ColumnStorage>,
    ) -> Self {
        let mut table = Self::with_storage(config, storage);
        if let Some(store_config) = table.config.store_config() {
            let store = ColumnConfigStore::open(&columns, table.storage.clone(), store_config).await;
            table.store = Some(store);
        }
        table.set_columns(columns);
        table
    }

    /// Returns the configuration.
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    // -------------------------------------------------------------------------
    // Inputs
    // -------------------------------------------------------------------------

    /// Replaces the column definitions.
    pub fn set_columns(&mut self, columns: Vec<ColumnDefinition>) {
        match (&self.store, self.config.store_config()) {
            (Some(store), _) => store.set_columns(&columns),
            (None, Some(store_config)) => {
                self.store = Some(ColumnConfigStore::new(
                    &columns,
                    self.storage.clone(),
                    store_config,
                ));
            }
            (None, None) => {}
        }
        self.columns = columns;
        self.sync_layout();
        self.mark(DirtyFlags {
            columns: true,
            sort: true,
            ..DirtyFlags::default()
        });
    }

    /// Replaces the row data.
    ///
    /// The new top-level order becomes the order restored when client-side
    /// sorting is cleared.
    pub fn set_data<I, R>(&mut self, rows: I)
    where
        I: IntoIterator<Item = R>,
        R: Into<Arc<Row>>,
    {
        self.data = rows.into_iter().map(Into::into).collect();
        // Recaptured on every call, not only the first, so a new page or data
        // set restores to its own order.
        self.sort.clear_original();
        self.sort.capture_original(&self.data);
        debug!("Table data set: {} top-level rows", self.data.len());
        self.mark(DirtyFlags {
            data: true,
            ..DirtyFlags::default()
        });
    }

    /// Replaces the pagination state without emitting a request.
    pub fn set_pagination(&mut self, pagination: Pagination) {
        self.pagination = pagination;
    }

    /// Returns the pagination state.
    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    /// Moves to a page and requests its data.
    pub fn set_page(&mut self, page: usize) {
        if self.pagination.set_page(page) {
            self.request();
        }
    }

    /// Changes the page size and requests the first page.
    pub fn set_page_size(&mut self, page_size: usize) {
        if self.pagination.set_page_size(page_size) {
            self.request();
        }
    }

    /// Requests data for the current page and sort order.
    pub fn refresh(&mut self) {
        self.request();
    }

    fn request(&mut self) {
        let payload = RequestPayload::new(&self.pagination, self.sort.state().items().to_vec());
        debug!("Request page {} size {}", payload.page, payload.page_size);
        self.events.push_back(TableEvent::Request(payload));
    }

    // -------------------------------------------------------------------------
    // Sorting
    // -------------------------------------------------------------------------

    /// Handles a click on a header. Unknown and non-sortable columns are
    /// ignored.
    pub fn header_click(&mut self, key: &str) {
        let Some(column) = leaf_columns(&self.columns)
            .into_iter()
            .find(|c| c.key == key)
            .cloned()
        else {
            warn!("{}", ConfigError::UnknownColumn(key.to_string()));
            return;
        };
        let events = self.sort.handle_header_click(&column, &self.pagination);
        self.apply_sort_events(events);
    }

    /// Clears the sort order.
    pub fn reset_sort(&mut self) {
        let events = self.sort.reset_sort(&self.pagination);
        self.apply_sort_events(events);
    }

    /// Replaces the sort order with caller-owned state.
    pub fn set_sort_state(&mut self, items: Vec<SortItem>) {
        self.sort.set_sort_state(items);
        self.mark(DirtyFlags {
            sort: true,
            ..DirtyFlags::default()
        });
    }

    /// Returns the sort descriptor.
    pub fn sort_state(&self) -> &SortState {
        self.sort.state()
    }

    /// Returns the indicator state of a column.
    pub fn column_sort_state(&self, key: &str) -> ColumnSortState {
        self.sort.get_sort_state(key)
    }

    fn apply_sort_events(&mut self, events: Vec<SortEvent>) {
        if events.is_empty() {
            return;
        }
        self.mark(DirtyFlags {
            sort: true,
            ..DirtyFlags::default()
        });
        self.events.extend(events.into_iter().map(TableEvent::from));
    }

    // -------------------------------------------------------------------------
    // Expansion
    // -------------------------------------------------------------------------

    /// Handles a click on a row's expand control.
    pub fn toggle_expand(&mut self, id: &str) {
        match self.expansion.toggle(id) {
            ExpandAction::Applied { .. } => self.mark(DirtyFlags {
                expansion: true,
                ..DirtyFlags::default()
            }),
            ExpandAction::Requested { id, expanded } => {
                self.events
                    .push_back(TableEvent::ExpandRequested { id, expanded });
            }
        }
    }

    /// Sets the expansion of a row.
    pub fn set_expanded(&mut self, id: &str, expanded: bool) {
        if self.expansion.set_expanded(id, expanded) {
            self.mark(DirtyFlags {
                expansion: true,
                ..DirtyFlags::default()
            });
        }
    }

    /// Expands every row with children.
    pub fn expand_all(&mut self) {
        if self.expansion.expand_all(&self.data, &self.config.id_field) {
            self.mark(DirtyFlags {
                expansion: true,
                ..DirtyFlags::default()
            });
        }
    }

    /// Collapses every row.
    pub fn collapse_all(&mut self) {
        if self.expansion.collapse_all() {
            self.mark(DirtyFlags {
                expansion: true,
                ..DirtyFlags::default()
            });
        }
    }

    /// Returns `true` if the row is expanded.
    pub fn is_expanded(&self, id: &str) -> bool {
        self.expansion.is_expanded(id)
    }

    /// Returns the expansion state.
    pub fn expansion(&self) -> &RowExpansion {
        &self.expansion
    }

    // -------------------------------------------------------------------------
    // Resizing
    // -------------------------------------------------------------------------

    /// Starts dragging a column edge. Returns `false` for flexible or unknown
    /// columns.
    pub fn start_resize(&mut self, key: &str, pointer_x: f32, measured_width: Option<f32>) -> bool {
        self.sync_store();
        self.layout.start_resize(key, pointer_x, measured_width)
    }

    /// Moves the pointer of the active drag. Returns the new width.
    pub fn on_pointer_move(&mut self, pointer_x: f32) -> Option<f32> {
        let width = self.layout.on_pointer_move(pointer_x);
        if width.is_some() {
            self.mark(DirtyFlags {
                resize: true,
                ..DirtyFlags::default()
            });
        }
        width
    }

    /// Ends the active drag.
    pub fn stop_resize(&mut self) {
        self.layout.stop_resize();
    }

    /// Removes the width override of a column.
    pub fn reset_column(&mut self, key: &str) {
        self.layout.reset_column(key);
        self.mark(DirtyFlags {
            resize: true,
            ..DirtyFlags::default()
        });
    }

    /// Removes all width overrides.
    pub fn reset_widths(&mut self) {
        self.layout.reset_all();
        self.mark(DirtyFlags {
            resize: true,
            ..DirtyFlags::default()
        });
    }

    // -------------------------------------------------------------------------
    // Column configuration
    // -------------------------------------------------------------------------

    /// Returns the column configuration store, if persistence is configured.
    pub fn column_store(&self) -> Option<&ColumnConfigStore> {
        self.store.as_ref()
    }

    /// Returns the column setup items, or one visible item per leaf column
    /// without a store.
    pub fn column_setup(&self) -> Vec<ColumnSetupItem> {
        match &self.store {
            Some(store) => store.items(),
            None => {
                let leaves = leaf_columns(&self.columns);
                crate::columns::reconcile(&leaves, None, self.config.initial_visible.as_deref())
            }
        }
    }

    /// Flips the visibility of a column.
    pub fn toggle_column_visibility(&mut self, key: &str) -> bool {
        let changed = self
            .store
            .as_ref()
            .is_some_and(|store| store.toggle_visibility(key));
        self.sync_store();
        changed
    }

    /// Moves a column in the configured order.
    pub fn reorder_columns(&mut self, from: usize, to: usize) -> bool {
        let changed = self
            .store
            .as_ref()
            .is_some_and(|store| store.reorder(from, to));
        self.sync_store();
        changed
    }

    /// Returns to the default column configuration and deletes the saved one.
    pub fn reset_columns(&mut self) {
        if let Some(store) = &self.store {
            store.reset();
        }
        self.sync_store();
    }

    /// Rebuilds the layout if the store changed, e.g. after a background load.
    fn sync_store(&mut self) {
        let revision = self.store.as_ref().map_or(0, ColumnConfigStore::revision);
        if revision != self.store_revision {
            self.sync_layout();
            self.mark(DirtyFlags {
                columns: true,
                ..DirtyFlags::default()
            });
        }
    }

    fn sync_layout(&mut self) {
        let visible = match &self.store {
            Some(store) => {
                self.store_revision = store.revision();
                store.visible_columns()
            }
            None => match &self.config.initial_visible {
                Some(keys) => leaf_columns(&self.columns)
                    .into_iter()
                    .filter(|c| keys.contains(&c.key))
                    .cloned()
                    .collect(),
                None => self.columns.clone(),
            },
        };
        self.layout.set_columns(&visible);
    }

    // -------------------------------------------------------------------------
    // Outputs
    // -------------------------------------------------------------------------

    /// Returns the column layout of the visible columns.
    pub fn layout(&mut self) -> &ColumnLayout {
        self.sync_store();
        &self.layout
    }

    /// Returns the layout for listener registration.
    pub fn layout_mut(&mut self) -> &mut ColumnLayout {
        self.sync_store();
        &mut self.layout
    }

    /// Returns the full flattened row sequence, recomputing it if inputs
    /// changed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRowId`] if an expandable row has no id.
    pub fn rows(&mut self) -> Result<&[FlattenedRow], ConfigError> {
        if self.rows_stale {
            let sorted = self.sort.sorted_view(&self.data, &self.columns);
            let rows = flatten(&sorted, self.expansion.expanded(), &self.config.id_field)?;
            self.virtualizer
                .set_item_keys(rows.iter().map(|row| row.key.clone()).collect());
            self.rows = rows;
            self.rows_stale = false;
        }
        Ok(&self.rows)
    }

    /// Computes the window for a scroll position and returns the rows to
    /// render with their positions.
    pub fn window(
        &mut self,
        scroll_offset: f32,
        viewport_size: f32,
    ) -> Result<Vec<(VirtualItem, FlattenedRow)>, ConfigError> {
        let count = self.rows()?.len();
        self.virtualizer
            .recompute_range(scroll_offset, viewport_size, count);
        let items = self.virtualizer.virtual_items();
        Ok(items
            .into_iter()
            .filter_map(|item| self.rows.get(item.index).cloned().map(|row| (item, row)))
            .collect())
    }

    /// Returns the last computed range.
    pub fn range(&self) -> &VirtualRange {
        self.virtualizer.range()
    }

    /// Returns the windowing engine, e.g. to record measured row heights.
    pub fn virtualizer(&mut self) -> &mut Virtualizer {
        &mut self.virtualizer
    }

    /// Returns the total content height.
    pub fn total_extent(&mut self) -> Result<f32, ConfigError> {
        self.rows()?;
        Ok(self.virtualizer.total_extent())
    }

    /// Removes and returns the queued events.
    pub fn drain_events(&mut self) -> Vec<TableEvent> {
        self.events.drain(..).collect()
    }

    /// Returns and clears the dirty flags.
    pub fn take_dirty(&mut self) -> DirtyFlags {
        self.sync_store();
        std::mem::take(&mut self.dirty)
    }

    fn mark(&mut self, flags: DirtyFlags) {
        if flags.affects_rows() {
            self.rows_stale = true;
        }
        self.dirty.merge(flags);
    }
}
