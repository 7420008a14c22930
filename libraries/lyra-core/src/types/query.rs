//! Minimal query and update vocabulary understood by every [`DocumentStore`]
//!
//! [`DocumentStore`]: crate::storage::DocumentStore

use serde::{Deserialize, Serialize};

use super::{DocRef, Document, Fields, Value};

/// A single predicate on a document
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Field equals value (arrays compare element-wise, in order)
    Eq(String, Value),
    /// Field is present and differs from value
    NotEq(String, Value),
    /// Array field contains value
    ArrayContains(String, Value),
    /// Document id is one of the given ids
    IdIn(Vec<String>),
    /// Field is null or missing
    IsNull(String),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq(field.into(), value.into())
    }

    pub fn not_eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::NotEq(field.into(), value.into())
    }

    pub fn array_contains(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::ArrayContains(field.into(), value.into())
    }

    pub fn is_null(field: impl Into<String>) -> Self {
        Self::IsNull(field.into())
    }

    /// Evaluate the predicate against a stored document
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::Eq(field, expected) => doc.get(field).unwrap_or(&Value::Null) == expected,
            Filter::NotEq(field, expected) => {
                matches!(doc.get(field), Some(v) if !v.is_null() && v != expected)
            }
            Filter::ArrayContains(field, needle) => doc
                .get(field)
                .and_then(Value::as_array)
                .is_some_and(|items| items.contains(needle)),
            Filter::IdIn(ids) => ids.iter().any(|id| id == doc.id()),
            Filter::IsNull(field) => doc.get(field).map_or(true, Value::is_null),
        }
    }
}

/// Sort direction for [`Query::order_by`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// Conjunction of filters with optional single-field ordering
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order_by: Option<(String, Direction)>,
}

impl Query {
    /// Query matching every document of a collection
    pub fn all() -> Self {
        Self::default()
    }

    /// Add a filter
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Order results by a field
    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.filters.iter().all(|f| f.matches(doc))
    }

    /// Filter and order a document set the way a backend would
    pub fn apply(&self, docs: impl IntoIterator<Item = Document>) -> Vec<Document> {
        let mut matched: Vec<Document> = docs.into_iter().filter(|d| self.matches(d)).collect();
        if let Some((field, direction)) = &self.order_by {
            matched.sort_by(|a, b| {
                let a = a.get(field).unwrap_or(&Value::Null);
                let b = b.get(field).unwrap_or(&Value::Null);
                match direction {
                    Direction::Asc => a.order_cmp(b),
                    Direction::Desc => b.order_cmp(a),
                }
            });
        }
        matched
    }
}

/// Partial update of one field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    Set(Value),
    /// Append values not already present
    ArrayUnion(Vec<Value>),
    /// Remove every occurrence of the values
    ArrayRemove(Vec<Value>),
    /// Add to a numeric field (missing counts as zero)
    Increment(i64),
    /// Set to the backend clock
    ServerTimestamp,
}

impl FieldUpdate {
    pub fn set(value: impl Into<Value>) -> Self {
        Self::Set(value.into())
    }

    pub fn array_union(value: impl Into<Value>) -> Self {
        Self::ArrayUnion(vec![value.into()])
    }

    pub fn array_remove(value: impl Into<Value>) -> Self {
        Self::ArrayRemove(vec![value.into()])
    }
}

/// Field updates applied together to one document
pub type Updates = Vec<(String, FieldUpdate)>;

/// Writes committed atomically by [`DocumentStore::commit`]
///
/// [`DocumentStore::commit`]: crate::storage::DocumentStore::commit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    writes: Vec<(DocRef, Fields)>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or overwrite a document
    pub fn set(&mut self, doc_ref: DocRef, fields: Fields) -> &mut Self {
        self.writes.push((doc_ref, fields));
        self
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn into_writes(self) -> Vec<(DocRef, Fields)> {
        self.writes
    }
}
