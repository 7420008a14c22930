//! Artist types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::link::null_as_default;
use super::{AlbumSummary, Track, UserId};

/// An artist is a user seen through their published albums and tracks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    pub id: UserId,

    #[serde(default, deserialize_with = "null_as_default")]
    pub display_name: String,

    #[serde(rename = "imageURL", default)]
    pub image_url: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub social_links: Option<serde_json::Value>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// Users who liked at least one of the artist's tracks, as of the request
    #[serde(default)]
    pub listeners_count: u64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub albums: Vec<AlbumSummary>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub tracks: Vec<Track>,
}
