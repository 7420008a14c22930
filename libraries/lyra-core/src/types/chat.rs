//! Chat and message types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::link::{null_as_default, present, Link};
use super::{ChatId, MessageId, User, UserId};

/// Message payload; only text is produced today
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageContent {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

impl MessageContent {
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,

    #[serde(default)]
    pub sender: Option<Link<User>>,

    /// Owning chat id
    #[serde(default)]
    pub chat: Option<ChatId>,

    pub content: MessageContent,

    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Message {
    pub fn sender_id(&self) -> Option<&str> {
        self.sender.as_ref().map(Link::id)
    }
}

/// A two-party conversation with participants and messages resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: ChatId,

    #[serde(default, deserialize_with = "present")]
    pub participants: Vec<User>,

    /// Messages in send order
    #[serde(default, deserialize_with = "present")]
    pub messages: Vec<Message>,

    #[serde(default)]
    pub last_message: Option<Message>,

    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Chat {
    /// The participant that is not `me`
    pub fn peer(&self, me: &UserId) -> Option<&User> {
        self.participants.iter().find(|p| &p.id != me)
    }
}

/// A chat document as stored, references left as ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSummary {
    pub id: ChatId,

    #[serde(default, deserialize_with = "null_as_default")]
    pub participants: Vec<UserId>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<MessageId>,

    #[serde(default)]
    pub last_message: Option<MessageId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn peer_is_the_other_participant() {
        let chat: Chat = serde_json::from_value(json!({
            "id": "c1",
            "participants": [
                {"id": "u1", "displayName": "Me"},
                {"id": "u2", "displayName": "You"},
            ],
            "messages": [],
            "lastMessage": null,
        }))
        .unwrap();

        let peer = chat.peer(&UserId::new("u1")).unwrap();
        assert_eq!(peer.display_name, "You");
    }

    #[test]
    fn message_content_uses_type_key() {
        let json = serde_json::to_value(MessageContent::text("hi")).unwrap();
        assert_eq!(json, json!({"type": "text", "value": "hi"}));
    }
}
