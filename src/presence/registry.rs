//! Module `registry`
//!
//! Maps live connections to the (username, room) they joined with.
//! A connection is a member of exactly one room, or none. Rooms are not
//! stored; they are derived from the entries that share a room name.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::ConnectionId;

/// Registry shared between the router and the lifecycle controller.
///
/// Every read-modify-write sequence must run under a single lock acquisition.
pub type SharedRegistry = Arc<Mutex<PresenceRegistry>>;

/// Which user occupies which room, for one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceEntry {
    pub connection_id: ConnectionId,
    pub username: String,
    pub room: String,
}

#[derive(Debug, Default)]
pub struct PresenceRegistry {
    entries: HashMap<ConnectionId, PresenceEntry>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a fresh registry for sharing across tasks.
    pub fn shared() -> SharedRegistry {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Inserts or replaces the entry for `connection_id`, returning the previous one.
    pub fn upsert(
        &mut self,
        connection_id: ConnectionId,
        username: impl Into<String>,
        room: impl Into<String>,
    ) -> Option<PresenceEntry> {
        let entry = PresenceEntry {
            connection_id,
            username: username.into(),
            room: room.into(),
        };
        self.entries.insert(connection_id, entry)
    }

    /// Removes the entry if present. Absence is not an error: a disconnect may
    /// race with an explicit leave.
    pub fn remove(&mut self, connection_id: &ConnectionId) -> Option<PresenceEntry> {
        self.entries.remove(connection_id)
    }

    /// Usernames currently in `room`, one per entry, in no particular order.
    pub fn members_of(&self, room: &str) -> Vec<String> {
        self.entries
            .values()
            .filter(|entry| entry.room == room)
            .map(|entry| entry.username.clone())
            .collect()
    }

    /// Connections currently in `room`.
    pub fn connections_in(&self, room: &str) -> Vec<ConnectionId> {
        self.entries
            .values()
            .filter(|entry| entry.room == room)
            .map(|entry| entry.connection_id)
            .collect()
    }

    /// First connection registered under `username`.
    ///
    /// When several connections share a username, which one is returned is
    /// unspecified.
    pub fn find_by_username(&self, username: &str) -> Option<ConnectionId> {
        self.entries
            .values()
            .find(|entry| entry.username == username)
            .map(|entry| entry.connection_id)
    }

    /// Whether a connection other than `connection_id` holds `username`.
    pub fn is_username_taken_by_other(&self, username: &str, connection_id: &ConnectionId) -> bool {
        self.entries
            .values()
            .any(|entry| entry.username == username && &entry.connection_id != connection_id)
    }

    pub fn entry_of(&self, connection_id: &ConnectionId) -> Option<&PresenceEntry> {
        self.entries.get(connection_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
