//! Message records
//!
//! Room and direct messages as handed to the message store, and the
//! `ChatMessage` payload they are delivered as.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payload of every chat message event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub from_user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_user: Option<String>,
    pub message: String,
    pub date_sent: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoomMessage {
    pub from_user: String,
    pub room: String,
    pub message: String,
    pub date_sent: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectMessage {
    pub from_user: String,
    pub to_user: String,
    pub message: String,
    pub date_sent: DateTime<Utc>,
}

impl RoomMessage {
    pub fn new(
        from_user: impl Into<String>,
        room: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            from_user: from_user.into(),
            room: room.into(),
            message: message.into(),
            date_sent: Utc::now(),
        }
    }
}

impl DirectMessage {
    pub fn new(
        from_user: impl Into<String>,
        to_user: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            from_user: from_user.into(),
            to_user: to_user.into(),
            message: message.into(),
            date_sent: Utc::now(),
        }
    }
}

impl From<&RoomMessage> for ChatMessage {
    fn from(msg: &RoomMessage) -> Self {
        ChatMessage {
            from_user: msg.from_user.clone(),
            room: Some(msg.room.clone()),
            to_user: None,
            message: msg.message.clone(),
            date_sent: msg.date_sent,
        }
    }
}

impl From<&DirectMessage> for ChatMessage {
    fn from(msg: &DirectMessage) -> Self {
        ChatMessage {
            from_user: msg.from_user.clone(),
            room: None,
            to_user: Some(msg.to_user.clone()),
            message: msg.message.clone(),
            date_sent: msg.date_sent,
        }
    }
}
