//! Logging middleware
//!
//! Connection and event log lines shared by the transport layer.

use log::{debug, info};
use std::net::SocketAddr;

use crate::presence::ConnectionId;
use crate::protocol::ClientEvent;

/// Log an accepted connection
pub fn log_connection(connection_id: ConnectionId, peer: SocketAddr, active: usize, max: usize) {
    info!("Client connected: {} from {} ({}/{} clients)", connection_id, peer, active, max);
}

/// Log an inbound event. Message bodies are never logged.
pub fn log_event(connection_id: ConnectionId, event: &ClientEvent) {
    match event {
        ClientEvent::JoinRoom { username, room } => {
            info!("{} joining room {} as {}", connection_id, room, username)
        }
        other => debug!("{} sent {}", connection_id, other.name()),
    }
}

/// Log a closed connection
pub fn log_disconnect(connection_id: ConnectionId, peer: SocketAddr) {
    info!("Client disconnected: {} ({})", connection_id, peer);
}
