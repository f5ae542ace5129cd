//! Hierarchical row type

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use super::Value;

/// Field name holding child rows in the serialized form.
pub const CHILDREN_FIELD: &str = "children";

/// A caller-owned data row.
///
/// Rows hold field values as a `HashMap<String, Value>` plus an optional
/// explicit identifier and an ordered list of child rows, which makes a slice
/// of rows a forest. Children are shared (`Arc`) so flattening and sorting can
/// hand out rows without copying field maps.
///
/// When deserialized from JSON every key except `children` becomes a field;
/// the row identity is then read from the configured id field (see
/// [`Row::identity`]).
///
/// # Example
///
/// ```
/// use datagrid_lib::model::Row;
///
/// let row = Row::with_id("acme")
///     .set("name", "Acme")
///     .set("revenue", 1_000_000i64)
///     .child(Row::with_id("acme-eu").set("name", "Acme EU"));
///
/// assert_eq!(row.get("name").and_then(|v| v.as_str()), Some("Acme"));
/// assert!(row.has_children());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RowRepr", into = "RowRepr")]
pub struct Row {
    /// Explicit identifier, takes precedence over the id field.
    pub(crate) id: Option<String>,

    /// The field values.
    pub(crate) fields: HashMap<String, Value>,

    /// Ordered child rows.
    pub(crate) children: Vec<Arc<Row>>,
}

impl Row {
    /// Creates an empty row without an explicit id.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty row with an explicit id.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Sets a field value (builder style).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Appends a child row (builder style).
    pub fn child(mut self, row: Row) -> Self {
        self.children.push(Arc::new(row));
        self
    }

    /// Replaces the child rows (builder style).
    pub fn children_from(mut self, rows: impl IntoIterator<Item = Row>) -> Self {
        self.children = rows.into_iter().map(Arc::new).collect();
        self
    }

    /// Returns the explicit id, if one was set.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Resolves the row identity.
    ///
    /// The explicit id wins; otherwise the value of `id_field` is used when
    /// it is present and not null.
    pub fn identity(&self, id_field: &str) -> Option<String> {
        if let Some(id) = &self.id {
            return Some(id.clone());
        }
        match self.fields.get(id_field) {
            None | Some(Value::Null) => None,
            Some(value) => Some(value.to_string()),
        }
    }

    /// Returns a reference to the field value, if it exists.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Resolves a dotted path (`"address.city"`) through nested maps.
    ///
    /// A field whose name literally contains the dots wins over traversal.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        if let Some(value) = self.fields.get(path) {
            return Some(value);
        }
        let mut parts = path.split('.');
        let mut current = self.fields.get(parts.next()?)?;
        for part in parts {
            current = current.get(part)?;
        }
        Some(current)
    }

    /// Sets a field value in place.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Returns all fields.
    pub fn fields(&self) -> &HashMap<String, Value> {
        &self.fields
    }

    /// Returns the child rows.
    pub fn children(&self) -> &[Arc<Row>] {
        &self.children
    }

    /// Returns `true` if this row has at least one child.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Serialized shape: a flat object with an optional `children` array.
#[derive(Serialize, Deserialize)]
struct RowRepr {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<Arc<Row>>,
    #[serde(flatten)]
    fields: HashMap<String, Value>,
}

impl From<RowRepr> for Row {
    fn from(repr: RowRepr) -> Self {
        Self {
            id: None,
            fields: repr.fields,
            children: repr.children,
        }
    }
}

impl From<Row> for RowRepr {
    fn from(row: Row) -> Self {
        let mut fields = row.fields;
        if let Some(id) = row.id {
            fields.entry("id".to_string()).or_insert(Value::String(id));
        }
        Self {
            children: row.children,
            fields,
        }
    }
}
