/// Track domain type
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::link::{null_as_default, Link};
use super::{AlbumSummary, TrackId, User};

/// Audio track with its author and album resolved as far as the query asked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: TrackId,

    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    #[serde(default)]
    pub author: Option<Link<User>>,

    #[serde(default)]
    pub album: Option<Link<AlbumSummary>>,

    #[serde(default)]
    pub genre: Option<String>,

    /// Cover art (shared with the album)
    #[serde(rename = "imageURL", default)]
    pub image_url: Option<String>,

    /// Durable URL of the audio blob
    #[serde(rename = "audioURL", default, deserialize_with = "null_as_default")]
    pub audio_url: String,

    /// Duration in seconds
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration: f64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub is_explicit: bool,

    /// Position within the album
    #[serde(default)]
    pub order: Option<u32>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Track {
    /// Author display name, when the author was resolved
    pub fn author_name(&self) -> Option<&str> {
        self.author
            .as_ref()
            .and_then(Link::resolved)
            .map(|user| user.display_name.as_str())
    }
}

/// Input for one track of [`CreateAlbum`](super::CreateAlbum)
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTrack {
    pub title: String,
    pub genre: Option<String>,
    /// Duration in seconds
    pub duration: f64,
    pub is_explicit: bool,
    pub audio: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unresolved_refs_decode_as_ids() {
        let track: Track = serde_json::from_value(json!({
            "id": "t1",
            "title": "Intro",
            "author": "u1",
            "album": "a1",
            "audioURL": "memory://tracks/x",
            "duration": 93.5,
        }))
        .unwrap();

        assert_eq!(track.author.as_ref().map(Link::id), Some("u1"));
        assert_eq!(track.album.as_ref().map(Link::id), Some("a1"));
        assert!(track.author_name().is_none());
        assert!(!track.is_explicit);
    }

    #[test]
    fn resolved_author_exposes_name() {
        let track: Track = serde_json::from_value(json!({
            "id": "t1",
            "title": "Intro",
            "author": {"id": "u1", "displayName": "Mira"},
            "album": null,
        }))
        .unwrap();

        assert_eq!(track.author_name(), Some("Mira"));
        assert!(track.album.is_none());
    }
}
