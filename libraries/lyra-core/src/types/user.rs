/// User domain type
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::link::{null_as_default, Identified};
use super::{AlbumId, TrackId, UserId};

/// Account role stored on the user document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// User account (also an artist when they publish albums)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Same id as the auth provider's uid
    pub id: UserId,

    #[serde(default, deserialize_with = "null_as_default")]
    pub display_name: String,

    /// Avatar URL
    #[serde(rename = "imageURL", default)]
    pub image_url: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub role: Role,

    #[serde(default, deserialize_with = "null_as_default")]
    pub liked_tracks: Vec<TrackId>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub liked_albums: Vec<AlbumId>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub liked_artists: Vec<UserId>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub social_links: Option<serde_json::Value>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// Present when the user was resolved as an album author
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listeners_count: Option<u64>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn has_liked_track(&self, id: &TrackId) -> bool {
        self.liked_tracks.contains(id)
    }
}

impl Identified for User {
    fn id_str(&self) -> &str {
        self.id.as_str()
    }
}

/// Editable profile fields; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    #[serde(rename = "imageURL")]
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub social_links: Option<serde_json::Value>,
}
