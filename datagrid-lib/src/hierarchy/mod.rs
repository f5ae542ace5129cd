//! Row hierarchy flattening
//!
//! Turns a row forest plus the set of expanded row ids into the flat,
//! indexable sequence the windowing engine works on. Children of an expanded
//! row follow their parent immediately, one level deeper.

mod expansion;

pub use expansion::*;

use std::collections::HashSet;
use std::ops::Deref;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::model::Row;

/// Default field holding row identity.
pub const DEFAULT_ID_FIELD: &str = "id";

/// A row placed in the flattened sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct FlattenedRow {
    /// Shared handle to the source row.
    pub row: Arc<Row>,
    /// Row identity, or a positional key (`#0.2`) for leaf rows without one.
    pub key: String,
    /// Nesting depth, 0 for top-level rows.
    pub depth: usize,
    /// Key of the parent row.
    pub parent_key: Option<String>,
    pub has_children: bool,
    pub is_expanded: bool,
}

impl Deref for FlattenedRow {
    type Target = Row;

    fn deref(&self) -> &Row {
        &self.row
    }
}

/// Flattens a row forest depth-first.
///
/// Every row is emitted; children follow their parent only when the parent's
/// id is in `expanded`. Rows with children must carry an id (explicit or in
/// `id_field`) since expansion is keyed by it.
///
/// # Errors
///
/// Returns [`ConfigError::MissingRowId`] for an expandable row without an id.
///
/// # Example
///
/// ```
/// use std::collections::HashSet;
/// use std::sync::Arc;
///
/// use datagrid_lib::hierarchy::flatten;
/// use datagrid_lib::model::Row;
///
/// let rows = vec![
///     Arc::new(Row::with_id("row1").child(Row::with_id("row1a"))),
///     Arc::new(Row::with_id("row2")),
/// ];
/// let expanded = HashSet::from(["row1".to_string()]);
///
/// let flat = flatten(&rows, &expanded, "id").unwrap();
/// let keys: Vec<_> = flat.iter().map(|r| (r.key.as_str(), r.depth)).collect();
/// assert_eq!(keys, vec![("row1", 0), ("row1a", 1), ("row2", 0)]);
/// ```
pub fn flatten(
    rows: &[Arc<Row>],
    expanded: &HashSet<String>,
    id_field: &str,
) -> Result<Vec<FlattenedRow>, ConfigError> {
    let mut out = Vec::with_capacity(rows.len());
    flatten_into(rows, expanded, id_field, 0, None, "", &mut out)?;
    Ok(out)
}

fn flatten_into(
    rows: &[Arc<Row>],
    expanded: &HashSet<String>,
    id_field: &str,
    depth: usize,
    parent_key: Option<&str>,
    parent_path: &str,
    out: &mut Vec<FlattenedRow>,
) -> Result<(), ConfigError> {
    for (index, row) in rows.iter().enumerate() {
        let path = if parent_path.is_empty() {
            index.to_string()
        } else {
            format!("{}.{}", parent_path, index)
        };
        let has_children = row.has_children();

        let key = match row.identity(id_field) {
            Some(id) => id,
            None if has_children => {
                return Err(ConfigError::MissingRowId {
                    path,
                    id_field: id_field.to_string(),
                });
            }
            None => format!("#{}", path),
        };
        let is_expanded = has_children && expanded.contains(&key);

        out.push(FlattenedRow {
            row: row.clone(),
            key: key.clone(),
            depth,
            parent_key: parent_key.map(str::to_string),
            has_children,
            is_expanded,
        });

        if is_expanded {
            flatten_into(
                row.children(),
                expanded,
                id_field,
                depth + 1,
                Some(key.as_str()),
                &path,
                out,
            )?;
        }
    }
    Ok(())
}

/// Collects the ids of every row that has children, at any depth.
///
/// Rows without an id are skipped.
pub fn expandable_ids(rows: &[Arc<Row>], id_field: &str) -> Vec<String> {
    let mut ids = Vec::new();
    let mut stack: Vec<&Arc<Row>> = rows.iter().rev().collect();
    while let Some(row) = stack.pop() {
        if row.has_children() {
            if let Some(id) = row.identity(id_field) {
                ids.push(id);
            }
            stack.extend(row.children().iter().rev());
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forest() -> Vec<Arc<Row>> {
        vec![
            Arc::new(
                Row::with_id("row1")
                    .child(Row::with_id("row1a").child(Row::with_id("row1a-x")))
                    .child(Row::new().set("name", "anonymous leaf")),
            ),
            Arc::new(Row::with_id("row2")),
        ]
    }

    fn summary(rows: &[FlattenedRow]) -> Vec<(String, usize, bool, bool)> {
        rows.iter()
            .map(|r| (r.key.clone(), r.depth, r.has_children, r.is_expanded))
            .collect()
    }

    #[test]
    fn test_flatten_collapsed() {
        let flat = flatten(&forest(), &HashSet::new(), "id").unwrap();
        assert_eq!(
            summary(&flat),
            vec![
                ("row1".to_string(), 0, true, false),
                ("row2".to_string(), 0, false, false),
            ]
        );
    }

    #[test]
    fn test_flatten_expanded() {
        let expanded = HashSet::from(["row1".to_string()]);
        let flat = flatten(&forest(), &expanded, "id").unwrap();

        assert_eq!(
            summary(&flat),
            vec![
                ("row1".to_string(), 0, true, true),
                ("row1a".to_string(), 1, true, false),
                ("#0.1".to_string(), 1, false, false),
                ("row2".to_string(), 0, false, false),
            ]
        );
        assert_eq!(flat[1].parent_key.as_deref(), Some("row1"));
        assert_eq!(flat[2].get("name").and_then(|v| v.as_str()), Some("anonymous leaf"));
    }

    #[test]
    fn test_flatten_nested_expansion() {
        let expanded = HashSet::from(["row1".to_string(), "row1a".to_string()]);
        let flat = flatten(&forest(), &expanded, "id").unwrap();

        let keys: Vec<&str> = flat.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["row1", "row1a", "row1a-x", "#0.1", "row2"]);
        assert_eq!(flat[2].depth, 2);
        assert_eq!(flat[2].parent_key.as_deref(), Some("row1a"));
    }

    #[test]
    fn test_flatten_expanded_child_of_collapsed_parent_is_hidden() {
        let expanded = HashSet::from(["row1a".to_string()]);
        let flat = flatten(&forest(), &expanded, "id").unwrap();
        assert_eq!(flat.len(), 2);
    }

    #[test]
    fn test_flatten_idempotent() {
        let expanded = HashSet::from(["row1".to_string()]);
        let rows = forest();
        assert_eq!(
            flatten(&rows, &expanded, "id").unwrap(),
            flatten(&rows, &expanded, "id").unwrap()
        );
    }

    #[test]
    fn test_missing_id_on_expandable_row() {
        let rows = vec![Arc::new(Row::new().child(Row::with_id("c")))];
        let err = flatten(&rows, &HashSet::new(), "id").unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingRowId {
                path: "0".into(),
                id_field: "id".into(),
            }
        );
    }

    #[test]
    fn test_custom_id_field() {
        let rows = vec![Arc::new(
            Row::new().set("uuid", "u-1").child(Row::new().set("uuid", "u-2")),
        )];
        let expanded = HashSet::from(["u-1".to_string()]);
        let flat = flatten(&rows, &expanded, "uuid").unwrap();
        assert_eq!(flat[1].key, "u-2");
    }

    #[test]
    fn test_expandable_ids() {
        assert_eq!(expandable_ids(&forest(), "id"), vec!["row1", "row1a"]);
    }
}
