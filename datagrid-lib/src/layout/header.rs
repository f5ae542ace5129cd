//! Grouped header geometry

use crate::model::ColumnDefinition;

/// One cell of a (possibly multi-level) header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub key: String,
    pub label: String,
    /// Number of leaf columns spanned.
    pub colspan: usize,
    /// Number of header levels spanned; leaves reach down to the last level.
    pub rowspan: usize,
    pub is_group: bool,
    /// Header level, 0 is the top.
    pub level: usize,
}

/// Returns the leaf columns depth-first, in render order.
pub fn leaf_columns(columns: &[ColumnDefinition]) -> Vec<&ColumnDefinition> {
    let mut leaves = Vec::new();
    collect_leaves(columns, &mut leaves);
    leaves
}

fn collect_leaves<'a>(columns: &'a [ColumnDefinition], leaves: &mut Vec<&'a ColumnDefinition>) {
    for column in columns {
        if column.is_group() {
            collect_leaves(&column.children, leaves);
        } else {
            leaves.push(column);
        }
    }
}

fn header_depth(columns: &[ColumnDefinition]) -> usize {
    columns
        .iter()
        .map(|c| 1 + header_depth(&c.children))
        .max()
        .unwrap_or(0)
}

/// Builds the header rows for a column tree.
///
/// A flat column set yields a single row. Groups span their leaves
/// horizontally; leaves span down to the bottom level.
pub fn header_rows(columns: &[ColumnDefinition]) -> Vec<Vec<HeaderCell>> {
    let depth = header_depth(columns);
    let mut rows = vec![Vec::new(); depth];
    fill_rows(columns, 0, depth, &mut rows);
    rows
}

fn fill_rows(
    columns: &[ColumnDefinition],
    level: usize,
    depth: usize,
    rows: &mut [Vec<HeaderCell>],
) {
    for column in columns {
        let is_group = column.is_group();
        rows[level].push(HeaderCell {
            key: column.key.clone(),
            label: column.label.clone(),
            colspan: if is_group {
                leaf_columns(&column.children).len()
            } else {
                1
            },
            rowspan: if is_group { 1 } else { depth - level },
            is_group,
            level,
        });
        if is_group {
            fill_rows(&column.children, level + 1, depth, rows);
        }
    }
}
