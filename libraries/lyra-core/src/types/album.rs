//! Album types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::link::{null_as_default, present, Identified, Link};
use super::{AlbumId, CreateTrack, Track, TrackId, User};

/// An album with its author and tracks resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: AlbumId,

    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    #[serde(rename = "imageURL", default)]
    pub image_url: Option<String>,

    #[serde(default)]
    pub genre: Option<String>,

    /// Author, with `listeners_count` filled in
    #[serde(default)]
    pub author: Option<Link<User>>,

    /// Tracks in album order; absent tracks are dropped
    #[serde(default, deserialize_with = "present")]
    pub tracks: Vec<Track>,

    /// Sum of track durations in seconds, computed at creation
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration: f64,

    /// Whether any track is explicit, computed at creation
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_explicit: bool,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Album fields without resolved references (track list as ids)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumSummary {
    pub id: AlbumId,

    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    #[serde(rename = "imageURL", default)]
    pub image_url: Option<String>,

    #[serde(default)]
    pub genre: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub tracks: Vec<TrackId>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub duration: f64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub is_explicit: bool,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Identified for AlbumSummary {
    fn id_str(&self) -> &str {
        self.id.as_str()
    }
}

/// Data for creating a new album
#[derive(Debug, Clone, PartialEq)]
pub struct CreateAlbum {
    pub title: String,
    pub description: Option<String>,
    pub genre: Option<String>,
    /// Cover image bytes, shared by every track
    pub cover: Vec<u8>,
    pub tracks: Vec<CreateTrack>,
}

impl CreateAlbum {
    /// Sum of the track durations in seconds
    pub fn total_duration(&self) -> f64 {
        self.tracks.iter().map(|t| t.duration).sum()
    }

    /// Whether any track is explicit
    pub fn is_explicit(&self) -> bool {
        self.tracks.iter().any(|t| t.is_explicit)
    }
}
