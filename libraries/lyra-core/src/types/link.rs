//! Resolved-or-id links and serde helpers shared by the entity types

use serde::{Deserialize, Deserializer, Serialize};

/// Entities that carry their own document id
pub trait Identified {
    fn id_str(&self) -> &str;
}

/// A reference field after resolution
///
/// Fields named by a resolution shape arrive as the target's data; fields the
/// shape leaves alone arrive as the plain target id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Link<T> {
    Resolved(T),
    Id(String),
}

impl<T: Identified> Link<T> {
    /// Id of the linked document, resolved or not
    pub fn id(&self) -> &str {
        match self {
            Link::Resolved(entity) => entity.id_str(),
            Link::Id(id) => id,
        }
    }
}

impl<T> Link<T> {
    pub fn resolved(&self) -> Option<&T> {
        match self {
            Link::Resolved(entity) => Some(entity),
            Link::Id(_) => None,
        }
    }
}

/// Treat an explicit `null` like a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decode a list of resolved targets, dropping absent ones
pub(crate) fn present<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let items = Option::<Vec<Option<T>>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(items.into_iter().flatten().collect())
}
