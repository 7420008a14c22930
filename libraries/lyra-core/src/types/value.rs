//! Document value model
//!
//! A backend document is a map of field names to [`Value`]s. Values are either
//! plain data or a [`DocRef`] pointing at another document. References only
//! exist below the resolver; everything handed to callers above it is plain
//! `serde_json` data.

use chrono::{DateTime, Utc};
use serde_json::{Map, Number};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::DocRef;

/// Field map of a document
pub type Fields = BTreeMap<String, Value>;

/// Key used in JSON fixtures to spell a reference: `{"$ref": "users/u1"}`
pub const REF_KEY: &str = "$ref";

/// Key used in JSON fixtures to spell a timestamp: `{"$ts": "2025-01-01T00:00:00Z"}`
pub const TIMESTAMP_KEY: &str = "$ts";

/// A single field value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Timestamp(DateTime<Utc>),
    Array(Vec<Value>),
    Map(Fields),
    Ref(DocRef),
    /// Write-only sentinel, replaced with the backend clock when stored
    ServerTimestamp,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_doc_ref(&self) -> Option<&DocRef> {
        match self {
            Value::Ref(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Render as plain JSON.
    ///
    /// References collapse to their target id; callers that need the target's
    /// data must go through the resolver.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null | Value::ServerTimestamp => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::Number((*i).into()),
            Value::Float(f) => Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Timestamp(ts) => serde_json::Value::String(ts.to_rfc3339()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(fields) => serde_json::Value::Object(fields_to_json(fields)),
            Value::Ref(r) => serde_json::Value::String(r.id.clone()),
        }
    }

    /// Build a value from fixture JSON, recognising `$ref` and `$ts` objects
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or_default()),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => {
                if map.len() == 1 {
                    if let Some(special) = special_value(&map) {
                        return special;
                    }
                }
                Value::Map(
                    map.into_iter()
                        .map(|(k, v)| (k, Value::from_json(v)))
                        .collect(),
                )
            }
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            Value::Null | Value::ServerTimestamp => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::Float(_) => 2,
            Value::Timestamp(_) => 3,
            Value::String(_) => 4,
            Value::Ref(_) => 5,
            Value::Array(_) => 6,
            Value::Map(_) => 7,
        }
    }

    /// Total order used for `order_by`: values of different kinds sort by kind,
    /// values of the same kind by their natural order.
    pub fn order_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
                let a = self.as_f64().unwrap_or_default();
                let b = other.as_f64().unwrap_or_default();
                a.partial_cmp(&b).unwrap_or(Ordering::Equal)
            }
            (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Ref(a), Value::Ref(b)) => a.cmp(b),
            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }
}

fn special_value(map: &Map<String, serde_json::Value>) -> Option<Value> {
    if let Some(serde_json::Value::String(path)) = map.get(REF_KEY) {
        return DocRef::parse(path).ok().map(Value::Ref);
    }
    if let Some(serde_json::Value::String(ts)) = map.get(TIMESTAMP_KEY) {
        return DateTime::parse_from_rfc3339(ts)
            .ok()
            .map(|ts| Value::Timestamp(ts.with_timezone(&Utc)));
    }
    None
}

/// Render a field map as a JSON object
pub fn fields_to_json(fields: &Fields) -> Map<String, serde_json::Value> {
    fields.iter().map(|(k, v)| (k.clone(), v.to_json())).collect()
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<DocRef> for Value {
    fn from(r: DocRef) -> Self {
        Value::Ref(r)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(ts: DateTime<Utc>) -> Self {
        Value::Timestamp(ts)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

/// A stored document: its own reference plus its fields
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub doc_ref: DocRef,
    pub fields: Fields,
}

impl Document {
    pub fn new(doc_ref: DocRef, fields: Fields) -> Self {
        Self { doc_ref, fields }
    }

    /// Document id within its collection
    pub fn id(&self) -> &str {
        &self.doc_ref.id
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    pub fn get_ref(&self, field: &str) -> Option<&DocRef> {
        self.get(field).and_then(Value::as_doc_ref)
    }

    /// References held in an array field, in stored order
    pub fn get_refs(&self, field: &str) -> Vec<&DocRef> {
        self.get(field)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_doc_ref).collect())
            .unwrap_or_default()
    }

    /// Strings held in an array field, in stored order
    pub fn get_strings(&self, field: &str) -> Vec<&str> {
        self.get(field)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Plain JSON rendering `{id, ...fields}` with references collapsed to ids
    pub fn to_json(&self) -> serde_json::Value {
        let mut object = fields_to_json(&self.fields);
        object.insert(
            "id".to_string(),
            serde_json::Value::String(self.doc_ref.id.clone()),
        );
        serde_json::Value::Object(object)
    }
}

/// Build a [`Fields`] map from `key => value` pairs
#[macro_export]
macro_rules! fields {
    ($($key:expr => $value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut map = $crate::types::Fields::new();
        $(map.insert($key.to_string(), $crate::types::Value::from($value));)*
        map
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Collection;
    use serde_json::json;

    #[test]
    fn fixture_json_recognises_refs_and_timestamps() {
        let value = Value::from_json(json!({
            "author": {"$ref": "users/u1"},
            "createdAt": {"$ts": "2025-03-01T10:00:00Z"},
            "tracks": [{"$ref": "tracks/t1"}, {"$ref": "tracks/t2"}],
            "title": "Blue",
        }));

        let Value::Map(fields) = value else {
            panic!("expected map");
        };
        assert_eq!(
            fields["author"],
            Value::Ref(DocRef::new(Collection::Users, "u1"))
        );
        assert!(matches!(fields["createdAt"], Value::Timestamp(_)));
        assert_eq!(fields["tracks"].as_array().map(<[Value]>::len), Some(2));
        assert_eq!(fields["title"].as_str(), Some("Blue"));
    }

    #[test]
    fn refs_collapse_to_ids_in_json() {
        let doc = Document::new(
            DocRef::new(Collection::Tracks, "t1"),
            crate::fields! {
                "title" => "Intro",
                "album" => DocRef::new(Collection::Albums, "a1"),
            },
        );

        assert_eq!(
            doc.to_json(),
            json!({"id": "t1", "title": "Intro", "album": "a1"})
        );
    }

    #[test]
    fn order_cmp_mixes_ints_and_floats() {
        assert_eq!(Value::Int(2).order_cmp(&Value::Float(2.5)), Ordering::Less);
        assert_eq!(Value::Null.order_cmp(&Value::Int(0)), Ordering::Less);
    }
}
