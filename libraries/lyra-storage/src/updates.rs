//! Field update semantics

use chrono::{DateTime, Utc};
use lyra_core::types::{FieldUpdate, Fields, Value};

/// Replace every server-timestamp sentinel with `now`
pub(crate) fn stamp(fields: Fields, now: DateTime<Utc>) -> Fields {
    fields
        .into_iter()
        .map(|(k, v)| (k, stamp_value(v, now)))
        .collect()
}

fn stamp_value(value: Value, now: DateTime<Utc>) -> Value {
    match value {
        Value::ServerTimestamp => Value::Timestamp(now),
        Value::Array(items) => Value::Array(items.into_iter().map(|v| stamp_value(v, now)).collect()),
        Value::Map(fields) => Value::Map(stamp(fields, now)),
        other => other,
    }
}

/// Apply one field update in place
pub(crate) fn apply(fields: &mut Fields, field: &str, update: FieldUpdate, now: DateTime<Utc>) {
    match update {
        FieldUpdate::Set(value) => {
            fields.insert(field.to_string(), stamp_value(value, now));
        }
        FieldUpdate::ServerTimestamp => {
            fields.insert(field.to_string(), Value::Timestamp(now));
        }
        FieldUpdate::ArrayUnion(values) => {
            let mut items = take_array(fields, field);
            for value in values {
                let value = stamp_value(value, now);
                if !items.contains(&value) {
                    items.push(value);
                }
            }
            fields.insert(field.to_string(), Value::Array(items));
        }
        FieldUpdate::ArrayRemove(values) => {
            let mut items = take_array(fields, field);
            items.retain(|item| !values.contains(item));
            fields.insert(field.to_string(), Value::Array(items));
        }
        FieldUpdate::Increment(by) => {
            let updated = match fields.get(field) {
                Some(Value::Float(f)) => Value::Float(f + by as f64),
                Some(Value::Int(i)) => Value::Int(i.saturating_add(by)),
                _ => Value::Int(by),
            };
            fields.insert(field.to_string(), updated);
        }
    }
}

/// Current array contents; a non-array value is overwritten
fn take_array(fields: &mut Fields, field: &str) -> Vec<Value> {
    match fields.remove(field) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyra_core::fields;

    #[test]
    fn array_union_skips_existing_values() {
        let mut doc = fields! { "likedTracks" => vec!["t1", "t2"] };
        apply(
            &mut doc,
            "likedTracks",
            FieldUpdate::ArrayUnion(vec!["t2".into(), "t3".into()]),
            Utc::now(),
        );
        assert_eq!(doc["likedTracks"], Value::from(vec!["t1", "t2", "t3"]));
    }

    #[test]
    fn array_remove_on_missing_field_leaves_empty_array() {
        let mut doc = fields! {};
        apply(&mut doc, "likedAlbums", FieldUpdate::array_remove("a1"), Utc::now());
        assert_eq!(doc["likedAlbums"], Value::Array(vec![]));
    }

    #[test]
    fn increment_treats_missing_as_zero() {
        let mut doc = fields! { "replies" => 2 };
        apply(&mut doc, "replies", FieldUpdate::Increment(1), Utc::now());
        apply(&mut doc, "likes", FieldUpdate::Increment(1), Utc::now());
        assert_eq!(doc["replies"], Value::Int(3));
        assert_eq!(doc["likes"], Value::Int(1));
    }

    #[test]
    fn stamp_replaces_nested_sentinels() {
        let now = Utc::now();
        let doc = stamp(
            fields! {
                "createdAt" => Value::ServerTimestamp,
                "meta" => Value::Map(fields! { "at" => Value::ServerTimestamp }),
            },
            now,
        );
        assert_eq!(doc["createdAt"], Value::Timestamp(now));
        assert_eq!(doc["meta"], Value::Map(fields! { "at" => Value::Timestamp(now) }));
    }
}
