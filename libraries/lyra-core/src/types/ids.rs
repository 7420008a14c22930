/// ID and reference types for Lyra documents
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::LyraError;

/// Backend collection a document lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Users,
    Tracks,
    Albums,
    Comments,
    Chats,
    Messages,
    Reports,
}

impl Collection {
    /// All collections, in a stable order
    pub const ALL: [Collection; 7] = [
        Collection::Users,
        Collection::Tracks,
        Collection::Albums,
        Collection::Comments,
        Collection::Chats,
        Collection::Messages,
        Collection::Reports,
    ];

    /// Collection name as stored by the backend
    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Tracks => "tracks",
            Collection::Albums => "albums",
            Collection::Comments => "comments",
            Collection::Chats => "chats",
            Collection::Messages => "messages",
            Collection::Reports => "reports",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = LyraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| LyraError::invalid_input(format!("unknown collection: {s}")))
    }
}

/// Reference to a document in another collection
///
/// An opaque `(collection, id)` pointer. It is never dereferenced implicitly;
/// the resolver turns it into data with an explicit fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocRef {
    pub collection: Collection,
    pub id: String,
}

impl DocRef {
    /// Create a new reference
    pub fn new(collection: Collection, id: impl Into<String>) -> Self {
        Self {
            collection,
            id: id.into(),
        }
    }

    /// Backend path of the referenced document (`collection/id`)
    pub fn path(&self) -> String {
        format!("{}/{}", self.collection, self.id)
    }

    /// Parse a `collection/id` path
    pub fn parse(path: &str) -> Result<Self, LyraError> {
        let (collection, id) = path
            .split_once('/')
            .ok_or_else(|| LyraError::invalid_input(format!("not a document path: {path}")))?;
        if id.is_empty() || id.contains('/') {
            return Err(LyraError::invalid_input(format!(
                "not a document path: {path}"
            )));
        }
        Ok(Self::new(collection.parse()?, id))
    }
}

impl fmt::Display for DocRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

macro_rules! document_id {
    ($(#[$meta:meta])* $name:ident => $collection:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create an ID from an existing string
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a new random ID
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Get the inner string
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Reference to the document this ID names
            pub fn doc_ref(&self) -> DocRef {
                DocRef::new($collection, self.0.clone())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

document_id!(
    /// User identifier (also the auth provider's uid)
    UserId => Collection::Users
);
document_id!(
    /// Track identifier
    TrackId => Collection::Tracks
);
document_id!(
    /// Album identifier
    AlbumId => Collection::Albums
);
document_id!(
    /// Comment identifier
    CommentId => Collection::Comments
);
document_id!(
    /// Chat identifier
    ChatId => Collection::Chats
);
document_id!(
    /// Message identifier
    MessageId => Collection::Messages
);
document_id!(
    /// Report identifier
    ReportId => Collection::Reports
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_generation_creates_unique_ids() {
        let id1 = UserId::generate();
        let id2 = UserId::generate();
        assert_ne!(id1, id2);
    }

    #[test]
    fn track_id_points_at_tracks_collection() {
        let id = TrackId::new("track-123");
        assert_eq!(id.doc_ref(), DocRef::new(Collection::Tracks, "track-123"));
        assert_eq!(id.doc_ref().path(), "tracks/track-123");
    }

    #[test]
    fn doc_ref_parse_roundtrips_path() {
        let parsed = DocRef::parse("albums/a1").unwrap();
        assert_eq!(parsed.collection, Collection::Albums);
        assert_eq!(parsed.id, "a1");
        assert_eq!(parsed.to_string(), "albums/a1");
    }

    #[test]
    fn doc_ref_parse_rejects_bad_paths() {
        assert!(DocRef::parse("albums").is_err());
        assert!(DocRef::parse("albums/").is_err());
        assert!(DocRef::parse("playlists/p1").is_err());
        assert!(DocRef::parse("albums/a1/tracks").is_err());
    }
}
