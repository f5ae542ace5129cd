//! Headless table/data-grid engine
//!
//! Computes what a presentation layer has to draw for very large, possibly
//! hierarchical datasets: column tracks and pinned offsets, the flattened row
//! sequence, the windowed index range, multi-column sort state and the
//! persisted per-table column configuration.

pub mod columns;
pub mod error;
pub mod hierarchy;
pub mod layout;
pub mod model;
pub mod pagination;
pub mod sort;
pub mod window;

mod table;

pub use table::*;
