//! System messages
//!
//! Announcements and greetings sent on behalf of the relay bot.

use chrono::Utc;

use crate::protocol::{ChatMessage, ServerEvent};

pub fn joined_text(username: &str) -> String {
    format!("{username} has joined the chat")
}

pub fn left_text(username: &str) -> String {
    format!("{username} has left the chat")
}

/// A `message` event from the bot, stamped now.
pub fn system_message(bot_name: &str, text: impl Into<String>) -> ServerEvent {
    ServerEvent::Message(ChatMessage {
        from_user: bot_name.to_string(),
        room: None,
        to_user: None,
        message: text.into(),
        date_sent: Utc::now(),
    })
}
