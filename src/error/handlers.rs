//! Error handlers
//!
//! Logs controller errors and renders them for clients.

use crate::error::types::ChatError;
use crate::presence::ConnectionId;
use log::{info, warn};

/// Log an error raised while handling an event from `connection_id`
pub fn handle_error(connection_id: ConnectionId, err: &ChatError) {
    match err {
        ChatError::Persistence(_) => warn!("Store failure for {}: {}", connection_id, err),
        _ => info!("Rejected event from {}: {}", connection_id, err),
    }
}

/// Text sent to the client in an `error` event.
///
/// Internal identifiers are never exposed, so `NotJoined` renders without the id.
pub fn client_message(err: &ChatError) -> String {
    match err {
        ChatError::NotJoined(_) => "Join a room first".to_string(),
        other => other.to_string(),
    }
}
