//! Column configuration store

use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::RwLock;

use log::debug;
use log::warn;
use serde::Deserialize;
use tokio::runtime::Handle;
use tokio::sync::Mutex;

use crate::layout::leaf_columns;
use crate::model::ColumnDefinition;

use super::reconcile;
use super::ColumnSetupItem;
use super::ColumnStorage;
use super::SavedColumns;

/// Configuration for a [`ColumnConfigStore`].
///
/// # Example
///
/// ```
/// use datagrid_lib::columns::ColumnStoreConfig;
///
/// let config = ColumnStoreConfig::new("users-table")
///     .with_initial_visible(["id", "name"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ColumnStoreConfig {
    /// Storage key of this table's record.
    pub key: String,

    /// Columns visible when nothing is saved. `None` shows all.
    pub initial_visible: Option<Vec<String>>,
}

impl ColumnStoreConfig {
    /// Creates a config for the given storage key.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            initial_visible: None,
        }
    }

    /// Sets the initially visible columns.
    pub fn with_initial_visible<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.initial_visible = Some(keys.into_iter().map(Into::into).collect());
        self
    }
}

/// Shared state behind a [`ColumnConfigStore`].
struct StoreInner {
    config: ColumnStoreConfig,
    storage: Option<ColumnStorage>,
    columns: RwLock<Vec<ColumnDefinition>>,
    items: RwLock<Vec<ColumnSetupItem>>,
    /// Bumped by every local mutation, under the `items` write lock.
    generation: AtomicU64,
    /// Bumped by every change of `items`, including loads.
    revision: AtomicU64,
    /// `false` after a reset: persisting deletes the record.
    has_record: AtomicBool,
    /// Serializes writes; holds the last persisted generation.
    written: Mutex<u64>,
}

/// Per-table column visibility and order, persisted asynchronously.
///
/// Mutations update the in-memory list synchronously and schedule a
/// best-effort write on the ambient tokio runtime. Writes are serialized and
/// coalesced: a write that finds a newer generation already persisted is
/// dropped. A load that completes after a local mutation is ignored.
///
/// Cloning is cheap; clones share state.
#[derive(Clone)]
pub struct ColumnConfigStore {
    inner: Arc<StoreInner>,
}

impl ColumnConfigStore {
    /// Creates a store for the given columns.
    ///
    /// Starts from the default items and, when storage is given and a tokio
    /// runtime is running, loads the saved record in the background.
    pub fn new(
        columns: &[ColumnDefinition],
        storage: Option<ColumnStorage>,
        config: ColumnStoreConfig,
    ) -> Self {
        let store = Self::detached(columns, storage, config);
        if store.inner.storage.is_some() {
            match Handle::try_current() {
                Ok(handle) => {
                    let background = store.clone();
                    let started = store.inner.generation.load(Ordering::SeqCst);
                    handle.spawn(async move {
                        background.load_from(started).await;
                    });
                }
                Err(_) => warn!(
                    "No async runtime; column configuration \"{}\" not loaded",
                    store.inner.config.key
                ),
            }
        }
        store
    }

    /// Creates a store and waits for the saved record to load.
    pub async fn open(
        columns: &[ColumnDefinition],
        storage: Option<ColumnStorage>,
        config: ColumnStoreConfig,
    ) -> Self {
        let store = Self::detached(columns, storage, config);
        store.load().await;
        store
    }

    fn detached(
        columns: &[ColumnDefinition],
        storage: Option<ColumnStorage>,
        config: ColumnStoreConfig,
    ) -> Self {
        let leaves: Vec<ColumnDefinition> = leaf_columns(columns).into_iter().cloned().collect();
        let refs: Vec<&ColumnDefinition> = leaves.iter().collect();
        let items = reconcile(&refs, None, config.initial_visible.as_deref());

        Self {
            inner: Arc::new(StoreInner {
                config,
                storage,
                columns: RwLock::new(leaves),
                items: RwLock::new(items),
                generation: AtomicU64::new(0),
                revision: AtomicU64::new(0),
                has_record: AtomicBool::new(false),
                written: Mutex::new(0),
            }),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ColumnStoreConfig {
        &self.inner.config
    }

    /// Returns the change counter; bumped whenever the items change.
    pub fn revision(&self) -> u64 {
        self.inner.revision.load(Ordering::SeqCst)
    }

    // -------------------------------------------------------------------------
    // Loading
    // -------------------------------------------------------------------------

    /// Loads the saved record and reconciles it against the live columns.
    ///
    /// Read failures count as "nothing saved". If the store was mutated while
    /// the read was in flight, the result is discarded. Returns the items
    /// after loading.
    pub async fn load(&self) -> Vec<ColumnSetupItem> {
        self.load_from(self.inner.generation.load(Ordering::SeqCst)).await
    }

    /// Loads the saved record, discarding it if the store was mutated since
    /// generation `started`.
    async fn load_from(&self, started: u64) -> Vec<ColumnSetupItem> {
        let Some(storage) = &self.inner.storage else {
            return self.items();
        };

        let saved = match storage.get::<SavedColumns>(&self.inner.config.key).await {
            Ok(saved) => saved,
            Err(e) => {
                warn!(
                    "Failed to load column configuration \"{}\": {}",
                    self.inner.config.key, e
                );
                None
            }
        };

        let Ok(mut items) = self.inner.items.write() else {
            return Vec::new();
        };
        if self.inner.generation.load(Ordering::SeqCst) != started {
            debug!(
                "Discarding stale load of column configuration \"{}\"",
                self.inner.config.key
            );
            return items.clone();
        }
        if let Some(saved) = saved {
            let columns = self.inner.columns.read().map(|c| c.clone()).unwrap_or_default();
            let refs: Vec<&ColumnDefinition> = columns.iter().collect();
            *items = reconcile(&refs, Some(&saved), self.inner.config.initial_visible.as_deref());
            self.inner.has_record.store(true, Ordering::SeqCst);
            self.inner.revision.fetch_add(1, Ordering::SeqCst);
            debug!(
                "Loaded column configuration \"{}\" ({} columns)",
                self.inner.config.key,
                items.len()
            );
        }
        items.clone()
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Returns the setup items in order.
    pub fn items(&self) -> Vec<ColumnSetupItem> {
        self.inner
            .items
            .read()
            .map(|items| items.clone())
            .unwrap_or_default()
    }

    /// Returns the setup item of a column.
    pub fn item(&self, key: &str) -> Option<ColumnSetupItem> {
        self.inner
            .items
            .read()
            .ok()
            .and_then(|items| items.iter().find(|item| item.key == key).cloned())
    }

    /// Returns the visible column definitions in display order.
    pub fn visible_columns(&self) -> Vec<ColumnDefinition> {
        let (Ok(items), Ok(columns)) = (self.inner.items.read(), self.inner.columns.read()) else {
            return Vec::new();
        };
        let mut visible: Vec<&ColumnSetupItem> = items.iter().filter(|i| i.visible).collect();
        visible.sort_by_key(|item| item.order);
        visible
            .into_iter()
            .filter_map(|item| columns.iter().find(|c| c.key == item.key).cloned())
            .collect()
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Flips the visibility of a column. Returns `false` for unknown keys.
    pub fn toggle_visibility(&self, key: &str) -> bool {
        self.mutate(|items| match items.iter_mut().find(|item| item.key == key) {
            Some(item) => {
                item.visible = !item.visible;
                true
            }
            None => false,
        })
    }

    /// Sets the visibility of a column. Returns `false` for unknown keys.
    pub fn set_visibility(&self, key: &str, visible: bool) -> bool {
        self.mutate(|items| match items.iter_mut().find(|item| item.key == key) {
            Some(item) => {
                item.visible = visible;
                true
            }
            None => false,
        })
    }

    /// Moves the column at `from` to `to` and renumbers the order.
    ///
    /// Returns `false` if either index is out of range.
    pub fn reorder(&self, from: usize, to: usize) -> bool {
        self.mutate(|items| {
            if from >= items.len() || to >= items.len() {
                return false;
            }
            let item = items.remove(from);
            items.insert(to, item);
            for (index, item) in items.iter_mut().enumerate() {
                item.order = index;
            }
            true
        })
    }

    /// Shows every column.
    pub fn show_all(&self) {
        self.mutate(|items| {
            items.iter_mut().for_each(|item| item.visible = true);
            true
        });
    }

    /// Hides every column.
    pub fn hide_all(&self) {
        self.mutate(|items| {
            items.iter_mut().for_each(|item| item.visible = false);
            true
        });
    }

    /// Deletes the saved record and returns to the defaults.
    pub fn reset(&self) {
        let Ok(mut items) = self.inner.items.write() else {
            return;
        };
        let columns = self.inner.columns.read().map(|c| c.clone()).unwrap_or_default();
        let refs: Vec<&ColumnDefinition> = columns.iter().collect();
        *items = reconcile(&refs, None, self.inner.config.initial_visible.as_deref());
        self.inner.has_record.store(false, Ordering::SeqCst);
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.revision.fetch_add(1, Ordering::SeqCst);
        drop(items);

        debug!("Reset column configuration \"{}\"", self.inner.config.key);
        self.schedule_persist();
    }

    /// Replaces the live column set, keeping the current order and
    /// visibility of columns that remain. Not persisted.
    pub fn set_columns(&self, columns: &[ColumnDefinition]) {
        let leaves: Vec<ColumnDefinition> = leaf_columns(columns).into_iter().cloned().collect();
        let Ok(mut items) = self.inner.items.write() else {
            return;
        };
        let current = SavedColumns::from_items(&items);
        let refs: Vec<&ColumnDefinition> = leaves.iter().collect();
        *items = reconcile(&refs, Some(&current), None);
        if let Ok(mut live) = self.inner.columns.write() {
            *live = leaves;
        }
        self.inner.revision.fetch_add(1, Ordering::SeqCst);
    }

    fn mutate<F>(&self, apply: F) -> bool
    where
        F: FnOnce(&mut Vec<ColumnSetupItem>) -> bool,
    {
        let Ok(mut items) = self.inner.items.write() else {
            return false;
        };
        if !apply(&mut items) {
            return false;
        }
        self.inner.has_record.store(true, Ordering::SeqCst);
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.revision.fetch_add(1, Ordering::SeqCst);
        drop(items);

        self.schedule_persist();
        true
    }

    // -------------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------------

    fn schedule_persist(&self) {
        if self.inner.storage.is_none() {
            return;
        }
        match Handle::try_current() {
            Ok(handle) => {
                let inner = self.inner.clone();
                handle.spawn(async move {
                    persist(&inner).await;
                });
            }
            Err(_) => warn!(
                "No async runtime; column configuration \"{}\" kept until flush",
                self.inner.config.key
            ),
        }
    }

    /// Waits until the latest state is persisted.
    pub async fn flush(&self) {
        persist(&self.inner).await;
    }
}

/// Writes the current state unless it is already persisted.
async fn persist(inner: &StoreInner) {
    let Some(storage) = &inner.storage else {
        return;
    };
    let mut written = inner.written.lock().await;

    let (generation, record) = {
        let Ok(items) = inner.items.read() else {
            return;
        };
        let generation = inner.generation.load(Ordering::SeqCst);
        let record = inner
            .has_record
            .load(Ordering::SeqCst)
            .then(|| SavedColumns::from_items(&items));
        (generation, record)
    };
    if generation <= *written {
        return;
    }

    let key = &inner.config.key;
    let result = match &record {
        Some(record) => storage.set(key, record).await,
        None => storage.delete(key).await,
    };
    match result {
        Ok(()) => {
            debug!("Persisted column configuration \"{}\" (generation {})", key, generation);
            *written = generation;
        }
        Err(e) => warn!("Failed to save column configuration \"{}\": {}", key, e),
    }
}

impl std::fmt::Debug for ColumnConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnConfigStore")
            .field("config", &self.inner.config)
            .field("items", &self.items())
            .field("generation", &self.inner.generation.load(Ordering::SeqCst))
            .finish()
    }
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

    fn order(store: &ColumnConfigStore) -> Vec<String> {
        store.items().into_iter().map(|item| item.key).collect()
    }

    #[test]
    fn test_mutations_without_storage() {
        let store = ColumnConfigStore::new(&columns(), None, ColumnStoreConfig::new("t"));

        assert!(store.toggle_visibility("name"));
        assert!(!store.toggle_visibility("missing"));
        assert_eq!(store.item("name").map(|i| i.visible), Some(false));

        assert!(store.reorder(2, 0));
        assert_eq!(order(&store), vec!["email", "id", "name"]);
        assert_eq!(
            store.items().iter().map(|i| i.order).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert!(!store.reorder(5, 0));

        let visible: Vec<String> = store.visible_columns().into_iter().map(|c| c.key).collect();
        assert_eq!(visible, vec!["email", "id"]);

        store.hide_all();
        assert!(store.visible_columns().is_empty());
        store.show_all();
        assert_eq!(store.visible_columns().len(), 3);
    }

    #[test]
    fn test_initial_visible_and_reset() {
        let config = ColumnStoreConfig::new("t").with_initial_visible(["id"]);
        let store = ColumnConfigStore::new(&columns(), None, config);
        assert_eq!(store.visible_columns().len(), 1);

        store.show_all();
        store.reorder(0, 2);
        store.reset();
        assert_eq!(order(&store), vec!["id", "name", "email"]);
        assert_eq!(store.visible_columns().len(), 1);
    }

    #[test]
    fn test_grouped_columns_flattened() {
        let columns = vec![ColumnDefinition::group(
            "contact",
            "Contact",
            vec![
                ColumnDefinition::new("email", "Email"),
                ColumnDefinition::new("phone", "Phone"),
            ],
        )];
        let store = ColumnConfigStore::new(&columns, None, ColumnStoreConfig::new("t"));
        assert_eq!(order(&store), vec!["email", "phone"]);
    }

    #[test]
    fn test_set_columns_keeps_state() {
        let store = ColumnConfigStore::new(&columns(), None, ColumnStoreConfig::new("t"));
        store.reorder(2, 0);
        store.set_visibility("id", false);

        let mut next = columns();
        next.remove(1);
        next.push(ColumnDefinition::new("phone", "Phone"));
        store.set_columns(&next);

        assert_eq!(order(&store), vec!["email", "id", "phone"]);
        assert_eq!(store.item("id").map(|i| i.visible), Some(false));
        assert_eq!(store.item("phone").map(|i| i.visible), Some(true));
    }

    #[tokio::test]
    async fn test_persist_and_reload() {
        let storage = ColumnStorage::in_memory();
        let config = ColumnStoreConfig::new("users");

        let store = ColumnConfigStore::open(&columns(), Some(storage.clone()), config.clone()).await;
        store.reorder(0, 2);
        store.set_visibility("email", false);
        store.flush().await;

        let saved: Option<SavedColumns> = storage.get("users").await.unwrap();
        assert_eq!(
            saved,
            Some(SavedColumns {
                visible: vec!["name".into(), "id".into()],
                order: vec!["name".into(), "email".into(), "id".into()],
            })
        );

        let reopened = ColumnConfigStore::open(&columns(), Some(storage.clone()), config).await;
        assert_eq!(reopened.items(), store.items());
    }

    #[tokio::test]
    async fn test_reset_deletes_record() {
        let storage = ColumnStorage::in_memory();
        let store =
            ColumnConfigStore::open(&columns(), Some(storage.clone()), ColumnStoreConfig::new("t"))
                .await;

        store.hide_all();
        store.flush().await;
        assert!(storage.get::<SavedColumns>("t").await.unwrap().is_some());

        store.reset();
        store.flush().await;
        assert!(storage.get::<SavedColumns>("t").await.unwrap().is_none());
        assert_eq!(store.visible_columns().len(), 3);
    }

    /// Backend whose reads wait for a signal.
    struct GatedBackend {
        inner: crate::columns::InMemoryBackend,
        gate: tokio::sync::Notify,
    }

    #[async_trait::async_trait]
    impl crate::columns::StorageBackend for GatedBackend {
        async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, crate::error::StorageError> {
            self.gate.notified().await;
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), crate::error::StorageError> {
            self.inner.set(key, value).await
        }

        async fn delete(&self, key: &str) -> Result<(), crate::error::StorageError> {
            self.inner.delete(key).await
        }

        async fn clear(&self) -> Result<(), crate::error::StorageError> {
            self.inner.clear().await
        }
    }

    #[tokio::test]
    async fn test_load_after_mutation_is_ignored() {
        use crate::columns::StorageBackend;

        let backend = Arc::new(GatedBackend {
            inner: crate::columns::InMemoryBackend::new(),
            gate: tokio::sync::Notify::new(),
        });
        let saved = serde_json::to_vec(&SavedColumns {
            visible: vec![],
            order: vec!["email".into(), "name".into(), "id".into()],
        })
        .unwrap();
        backend.inner.set("t", saved).await.unwrap();

        let storage = ColumnStorage::from_arc(backend.clone());
        let store = ColumnConfigStore::detached(&columns(), Some(storage), ColumnStoreConfig::new("t"));

        let loading = tokio::spawn({
            let store = store.clone();
            async move { store.load().await }
        });
        tokio::task::yield_now().await;

        store.toggle_visibility("id");
        backend.gate.notify_one();
        loading.await.unwrap();

        assert_eq!(order(&store), vec!["id", "name", "email"]);
        assert_eq!(store.item("id").map(|i| i.visible), Some(false));
        assert_eq!(store.item("name").map(|i| i.visible), Some(true));
    }

    #[tokio::test]
    async fn test_mutation_before_background_load_wins() {
        let storage = ColumnStorage::in_memory();
        storage
            .set(
                "t",
                &SavedColumns {
                    visible: vec!["id".into(), "name".into()],
                    order: vec!["id".into(), "name".into(), "email".into()],
                },
            )
            .await
            .unwrap();

        let store = ColumnConfigStore::new(&columns(), Some(storage.clone()), ColumnStoreConfig::new("t"));
        assert!(store.set_visibility("name", false));

        tokio::task::yield_now().await;
        store.flush().await;

        assert_eq!(store.item("name").map(|i| i.visible), Some(false));
        assert_eq!(store.item("email").map(|i| i.visible), Some(true));
        let saved: Option<SavedColumns> = storage.get("t").await.unwrap();
        assert_eq!(
            saved.map(|s| s.visible),
            Some(vec!["id".to_string(), "email".to_string()])
        );
    }

    #[tokio::test]
    async fn test_corrupt_record_falls_back_to_defaults() {
        let backend = Arc::new(crate::columns::InMemoryBackend::new());
        crate::columns::StorageBackend::set(backend.as_ref(), "t", b"{oops".to_vec())
            .await
            .unwrap();
        let storage = ColumnStorage::from_arc(backend);

        let store = ColumnConfigStore::open(&columns(), Some(storage), ColumnStoreConfig::new("t")).await;
        assert_eq!(order(&store), vec!["id", "name", "email"]);
    }
}
