//! Module `events`
//!
//! Inbound and outbound event types. Both are adjacently tagged:
//! `{"event": "<name>", "data": <payload>}`, with the payload omitted for
//! events that carry none.

use serde::{Deserialize, Serialize};

use super::ChatMessage;

/// Events a client may send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    JoinRoom { username: String, room: String },
    ChatMessage { message: String },
    PrivateMessage { to_user: String, message: String },
    Typing,
    StopTyping,
    LeaveRoom,
}

impl ClientEvent {
    /// Event name as it appears on the wire, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::JoinRoom { .. } => "joinRoom",
            ClientEvent::ChatMessage { .. } => "chatMessage",
            ClientEvent::PrivateMessage { .. } => "privateMessage",
            ClientEvent::Typing => "typing",
            ClientEvent::StopTyping => "stopTyping",
            ClientEvent::LeaveRoom => "leaveRoom",
        }
    }
}

/// Events the relay delivers to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Recent messages of the joined room, oldest first.
    RoomHistory(Vec<ChatMessage>),
    Message(ChatMessage),
    PrivateMessage(ChatMessage),
    /// Full member list of a room.
    RoomUsers(Vec<String>),
    Typing { username: String },
    StopTyping { username: String },
    Error { message: String },
}

impl ServerEvent {
    pub fn error(message: impl Into<String>) -> Self {
        ServerEvent::Error {
            message: message.into(),
        }
    }
}
