//! Viewport windowing
//!
//! Given the number of items, their (estimated or measured) sizes and the
//! scroll position, computes which index range has to be rendered.

mod options;

pub use options::*;

use std::collections::HashMap;
use std::ops::Range;

use log::debug;

/// Index range produced by [`Virtualizer::recompute_range`].
///
/// Both ranges are half-open and within `[0, item_count)`; an empty table or
/// viewport gives `0..0` for both.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VirtualRange {
    /// Items intersecting the viewport.
    pub visible: Range<usize>,
    /// Items to render: `visible` extended by the overscan.
    pub items: Range<usize>,
}

impl VirtualRange {
    /// Returns `true` if nothing is to be rendered.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A rendered item with its position.
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualItem {
    pub index: usize,
    /// Item key in dynamic mode.
    pub key: Option<String>,
    /// Offset from the top of the content.
    pub start: f32,
    pub size: f32,
}

impl VirtualItem {
    /// Offset of the item's far edge.
    pub fn end(&self) -> f32 {
        self.start + self.size
    }
}

/// Identifies the item a measurement belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemRef<'a> {
    Index(usize),
    Key(&'a str),
}

impl From<usize> for ItemRef<'_> {
    fn from(index: usize) -> Self {
        ItemRef::Index(index)
    }
}

impl<'a> From<&'a str> for ItemRef<'a> {
    fn from(key: &'a str) -> Self {
        ItemRef::Key(key)
    }
}

/// Where [`Virtualizer::scroll_to_index`] places the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollAlign {
    Start,
    Center,
    End,
    /// Scroll only as far as needed to bring the item fully into view.
    #[default]
    Auto,
}

/// Viewport windowing engine for one scroll container.
#[derive(Debug, Clone)]
pub struct Virtualizer {
    options: VirtualizerOptions,
    item_count: usize,
    /// Item keys by index (dynamic mode).
    keys: Vec<String>,
    index_sizes: HashMap<usize, f32>,
    keyed_sizes: HashMap<String, f32>,
    /// `offsets[i]` is the start of item `i`; `offsets[item_count]` the total.
    offsets: Vec<f32>,
    offsets_dirty: bool,
    scroll_offset: f32,
    viewport_size: f32,
    range: VirtualRange,
    detached: bool,
}

impl Virtualizer {
    /// Creates an engine with no items.
    pub fn new(options: VirtualizerOptions) -> Self {
        Self {
            options,
            item_count: 0,
            keys: Vec::new(),
            index_sizes: HashMap::new(),
            keyed_sizes: HashMap::new(),
            offsets: vec![0.0],
            offsets_dirty: false,
            scroll_offset: 0.0,
            viewport_size: 0.0,
            range: VirtualRange::default(),
            detached: false,
        }
    }

    /// Returns the options.
    pub fn options(&self) -> &VirtualizerOptions {
        &self.options
    }

    /// Returns the current item count.
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Returns the last computed range.
    pub fn range(&self) -> &VirtualRange {
        &self.range
    }

    /// Returns `true` while detached.
    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// Sets the stable item keys, one per index. Also sets the item count.
    ///
    /// In dynamic mode measurements follow the key, so a reordered item keeps
    /// its size.
    pub fn set_item_keys(&mut self, keys: Vec<String>) {
        self.item_count = keys.len();
        self.keys = keys;
        self.offsets_dirty = true;
    }

    fn set_item_count(&mut self, item_count: usize) {
        if item_count != self.item_count {
            self.item_count = item_count;
            self.keys.truncate(item_count);
            self.offsets_dirty = true;
        }
    }

    // -------------------------------------------------------------------------
    // Sizes
    // -------------------------------------------------------------------------

    /// Records the measured size of an item.
    pub fn measure<'a>(&mut self, item: impl Into<ItemRef<'a>>, size: f32) {
        let size = size.max(0.0);
        let previous = match item.into() {
            ItemRef::Key(key) => match self.options.mode {
                SizeMode::Dynamic => self.keyed_sizes.insert(key.to_string(), size),
                SizeMode::Fixed => match self.keys.iter().position(|k| k == key) {
                    Some(index) => self.index_sizes.insert(index, size),
                    None => {
                        debug!("Ignoring measurement of unknown item \"{}\"", key);
                        return;
                    }
                },
            },
            ItemRef::Index(index) => match (self.options.mode, self.keys.get(index)) {
                (SizeMode::Dynamic, Some(key)) => self.keyed_sizes.insert(key.clone(), size),
                _ => self.index_sizes.insert(index, size),
            },
        };
        if previous != Some(size) {
            self.offsets_dirty = true;
        }
    }

    /// Returns the size of an item: measured if known, else the estimate.
    pub fn size_of(&self, index: usize) -> f32 {
        let keyed = match self.options.mode {
            SizeMode::Dynamic => self
                .keys
                .get(index)
                .and_then(|key| self.keyed_sizes.get(key)),
            SizeMode::Fixed => None,
        };
        keyed
            .or_else(|| self.index_sizes.get(&index))
            .copied()
            .unwrap_or(self.options.estimate_size)
    }

    fn rebuild_offsets(&mut self) {
        if !self.offsets_dirty && self.offsets.len() == self.item_count + 1 {
            return;
        }
        let mut offsets = Vec::with_capacity(self.item_count + 1);
        let mut total = 0.0;
        offsets.push(total);
        for index in 0..self.item_count {
            total += self.size_of(index);
            offsets.push(total);
        }
        self.offsets = offsets;
        self.offsets_dirty = false;
    }

    /// Returns the total content size.
    pub fn total_extent(&mut self) -> f32 {
        self.rebuild_offsets();
        self.offsets.last().copied().unwrap_or(0.0)
    }

    // -------------------------------------------------------------------------
    // Range
    // -------------------------------------------------------------------------

    /// Computes the range to render.
    ///
    /// While detached the last range is returned unchanged.
    pub fn recompute_range(
        &mut self,
        scroll_offset: f32,
        viewport_size: f32,
        item_count: usize,
    ) -> VirtualRange {
        if self.detached {
            return self.range.clone();
        }
        self.scroll_offset = scroll_offset.max(0.0);
        self.viewport_size = viewport_size.max(0.0);
        self.set_item_count(item_count);
        self.range = self.compute_range();
        self.range.clone()
    }

    fn compute_range(&mut self) -> VirtualRange {
        if self.item_count == 0 || self.viewport_size <= 0.0 {
            return VirtualRange::default();
        }
        self.rebuild_offsets();

        let start = self.scroll_offset;
        let end = start + self.viewport_size;
        // offsets[1..] are item ends
        let first = self.offsets[1..]
            .partition_point(|&item_end| item_end <= start)
            .min(self.item_count - 1);
        let last = self.offsets[..self.item_count]
            .partition_point(|&item_start| item_start < end)
            .max(first + 1);

        let overscan = self.options.overscan;
        VirtualRange {
            visible: first..last,
            items: first.saturating_sub(overscan)..(last + overscan).min(self.item_count),
        }
    }

    /// Returns the items of the current range with their positions.
    pub fn virtual_items(&mut self) -> Vec<VirtualItem> {
        self.rebuild_offsets();
        self.range
            .items
            .clone()
            .filter(|&index| index < self.item_count)
            .map(|index| VirtualItem {
                index,
                key: self.keys.get(index).cloned(),
                start: self.offsets[index],
                size: self.offsets[index + 1] - self.offsets[index],
            })
            .collect()
    }

    /// Returns the scroll offset that brings an item into view, or `None` for
    /// an out-of-range index.
    pub fn scroll_to_index(&mut self, index: usize, align: ScrollAlign) -> Option<f32> {
        if index >= self.item_count {
            return None;
        }
        self.rebuild_offsets();

        let start = self.offsets[index];
        let size = self.offsets[index + 1] - start;
        let viewport = self.viewport_size;
        let current = self.scroll_offset;

        let offset = match align {
            ScrollAlign::Start => start,
            ScrollAlign::End => start + size - viewport,
            ScrollAlign::Center => start - (viewport - size) / 2.0,
            ScrollAlign::Auto => {
                if start < current {
                    start
                } else if start + size > current + viewport {
                    start + size - viewport
                } else {
                    current
                }
            }
        };
        let max = (self.total_extent() - viewport).max(0.0);
        Some(offset.clamp(0.0, max))
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Freezes the engine while its container is not displayed.
    pub fn detach(&mut self) {
        self.detached = true;
    }

    /// Resumes after [`detach`](Self::detach) with the re-measured viewport
    /// size and recomputes the range.
    pub fn reactivate(&mut self, viewport_size: f32) -> VirtualRange {
        debug!("Virtualizer reactivated with viewport {}px", viewport_size);
        self.detached = false;
        self.recompute_range(self.scroll_offset, viewport_size, self.item_count)
    }

    /// Drops all measurements, as on a fresh mount.
    pub fn remount(&mut self) {
        self.index_sizes.clear();
        self.keyed_sizes.clear();
        self.offsets_dirty = true;
    }
}

impl Default for Virtualizer {
    fn default() -> Self {
        Self::new(VirtualizerOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let mut v = Virtualizer::default();
        let range = v.recompute_range(0.0, 500.0, 0);
        assert!(range.is_empty());
        assert_eq!(range.visible, 0..0);
        assert_eq!(v.total_extent(), 0.0);
    }

    #[test]
    fn test_zero_viewport() {
        let mut v = Virtualizer::default();
        assert!(v.recompute_range(0.0, 0.0, 100).is_empty());
    }

    #[test]
    fn test_viewport_taller_than_content() {
        let mut v = Virtualizer::default();
        let range = v.recompute_range(0.0, 10_000.0, 10);
        assert_eq!(range.visible, 0..10);
        assert_eq!(range.items, 0..10);
    }

    #[test]
    fn test_range_with_overscan() {
        let mut v = Virtualizer::default();
        // items of 50px; viewport 200px at offset 1000 shows items 20..24
        let range = v.recompute_range(1000.0, 200.0, 1000);
        assert_eq!(range.visible, 20..24);
        assert_eq!(range.items, 18..26);
        assert_eq!(v.total_extent(), 50_000.0);
    }

    #[test]
    fn test_partial_items() {
        let mut v = Virtualizer::default();
        let range = v.recompute_range(25.0, 100.0, 1000);
        assert_eq!(range.visible, 0..3);
        assert_eq!(range.items, 0..5);
    }

    #[test]
    fn test_clamped_at_end() {
        let mut v = Virtualizer::default();
        let range = v.recompute_range(100_000.0, 200.0, 10);
        assert_eq!(range.visible, 9..10);
        assert!(range.items.end <= 10);
    }

    #[test]
    fn test_measure_by_index() {
        let mut v = Virtualizer::default();
        v.recompute_range(0.0, 100.0, 10);
        v.measure(0usize, 100.0);

        let range = v.recompute_range(0.0, 100.0, 10);
        assert_eq!(range.visible, 0..1);
        assert_eq!(v.total_extent(), 550.0);
    }

    #[test]
    fn test_dynamic_sizes_follow_keys() {
        let mut v = Virtualizer::new(VirtualizerOptions::default().with_mode(SizeMode::Dynamic));
        v.set_item_keys(vec!["a".into(), "b".into(), "c".into()]);
        v.measure(0usize, 80.0);
        v.measure("c", 20.0);
        assert_eq!(v.size_of(0), 80.0);
        assert_eq!(v.size_of(2), 20.0);

        v.set_item_keys(vec!["c".into(), "a".into(), "b".into()]);
        assert_eq!(v.size_of(0), 20.0);
        assert_eq!(v.size_of(1), 80.0);
        assert_eq!(v.total_extent(), 150.0);

        v.remount();
        assert_eq!(v.size_of(0), 50.0);
    }

    #[test]
    fn test_fixed_mode_measure_by_key() {
        let mut v = Virtualizer::default();
        v.set_item_keys(vec!["a".into(), "b".into()]);
        v.measure("b", 20.0);
        v.measure("missing", 500.0);
        assert_eq!(v.size_of(1), 20.0);
        assert_eq!(v.total_extent(), 70.0);

        // sizes stay with the position
        v.set_item_keys(vec!["b".into(), "a".into()]);
        assert_eq!(v.size_of(1), 20.0);
    }

    #[test]
    fn test_detach_and_reactivate() {
        let mut v = Virtualizer::default();
        let before = v.recompute_range(0.0, 100.0, 100);
        v.detach();

        assert_eq!(v.recompute_range(5000.0, 100.0, 100), before);

        let range = v.reactivate(300.0);
        assert_eq!(range.visible, 0..6);
        assert!(!v.is_detached());
    }

    #[test]
    fn test_virtual_items() {
        let mut v = Virtualizer::new(VirtualizerOptions::default().with_overscan(0));
        v.recompute_range(100.0, 100.0, 10);
        let items = v.virtual_items();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].index, 2);
        assert_eq!(items[0].start, 100.0);
        assert_eq!(items[1].end(), 200.0);
    }

    #[test]
    fn test_scroll_to_index() {
        let mut v = Virtualizer::default();
        v.recompute_range(0.0, 200.0, 100);

        assert_eq!(v.scroll_to_index(10, ScrollAlign::Start), Some(500.0));
        assert_eq!(v.scroll_to_index(10, ScrollAlign::End), Some(350.0));
        assert_eq!(v.scroll_to_index(10, ScrollAlign::Center), Some(425.0));
        assert_eq!(v.scroll_to_index(1, ScrollAlign::Auto), Some(0.0));
        assert_eq!(v.scroll_to_index(10, ScrollAlign::Auto), Some(350.0));
        assert_eq!(v.scroll_to_index(99, ScrollAlign::Start), Some(4800.0));
        assert_eq!(v.scroll_to_index(100, ScrollAlign::Start), None);
    }
}
