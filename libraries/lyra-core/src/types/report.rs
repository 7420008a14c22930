//! Moderation report types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Collection, ReportId, User, UserId};

/// What kind of document a report targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Comment,
    Album,
    User,
}

impl ReportType {
    /// Collection holding the reported document
    pub fn target_collection(self) -> Collection {
        match self {
            ReportType::Comment => Collection::Comments,
            ReportType::Album => Collection::Albums,
            ReportType::User => Collection::Users,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    #[default]
    Pending,
    Resolved,
    Rejected,
}

/// Moderator action taken when resolving a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportAction {
    Delete,
    Warn,
    Ban,
}

/// A report with all four references resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: ReportId,
    #[serde(rename = "type")]
    pub kind: ReportType,
    /// Reported document; its shape depends on `kind`
    #[serde(default)]
    pub target: Option<serde_json::Value>,
    #[serde(default)]
    pub target_user: Option<User>,
    #[serde(default)]
    pub reporter_user: Option<User>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: ReportStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resolved_by: Option<User>,
    #[serde(default)]
    pub action: Option<ReportAction>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Input for filing a report
#[derive(Debug, Clone, PartialEq)]
pub struct CreateReport {
    pub kind: ReportType,
    pub target_id: String,
    pub target_user_id: UserId,
    pub reporter_user_id: UserId,
    pub reason: String,
    pub description: Option<String>,
}

/// Moderator decision on a report
#[derive(Debug, Clone, PartialEq)]
pub struct ReportResolution {
    pub status: ReportStatus,
    pub action: Option<ReportAction>,
    pub notes: Option<String>,
    pub admin_id: UserId,
}

impl ReportStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Resolved => "resolved",
            ReportStatus::Rejected => "rejected",
        }
    }
}

impl ReportAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportAction::Delete => "delete",
            ReportAction::Warn => "warn",
            ReportAction::Ban => "ban",
        }
    }
}

impl ReportType {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportType::Comment => "comment",
            ReportType::Album => "album",
            ReportType::User => "user",
        }
    }
}
