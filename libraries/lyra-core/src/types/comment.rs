//! Album comment types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::link::{null_as_default, Identified, Link};
use super::{AlbumSummary, CommentId, User};

/// A comment on an album, optionally replying to another comment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,

    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,

    #[serde(default)]
    pub user: Option<Link<User>>,

    #[serde(default)]
    pub album: Option<Link<AlbumSummary>>,

    /// `None` for root comments
    #[serde(default)]
    pub parent: Option<Box<Link<Comment>>>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub likes: i64,

    /// Number of direct replies
    #[serde(default, deserialize_with = "null_as_default")]
    pub replies: i64,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Comment {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

impl Identified for Comment {
    fn id_str(&self) -> &str {
        self.id.as_str()
    }
}
