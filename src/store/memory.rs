//! In-memory message store
//!
//! Keeps a bounded log per room and a bounded log of direct messages. Direct
//! messages are write-only from the relay's point of view.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use tokio::sync::RwLock;

use super::MessageStore;
use crate::error::StoreError;
use crate::protocol::{DirectMessage, RoomMessage};

const DEFAULT_CAPACITY: usize = 1000;

#[derive(Debug)]
pub struct MemoryMessageStore {
    rooms: RwLock<HashMap<String, VecDeque<RoomMessage>>>,
    direct: RwLock<VecDeque<DirectMessage>>,
    capacity: usize,
}

impl MemoryMessageStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// `capacity` bounds each room log and the direct message log separately.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            direct: RwLock::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }
}

#[cfg(test)]
impl MemoryMessageStore {
    /// Every retained direct message, oldest first.
    pub(crate) async fn direct_messages(&self) -> Vec<DirectMessage> {
        self.direct.read().await.iter().cloned().collect()
    }
}

impl Default for MemoryMessageStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Last `limit` items of `items`, preserving order.
fn tail<T>(items: impl DoubleEndedIterator<Item = T>, limit: usize) -> Vec<T> {
    let mut recent: Vec<T> = items.rev().take(limit).collect();
    recent.reverse();
    recent
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn append_room_message(&self, message: &RoomMessage) -> Result<(), StoreError> {
        let mut rooms = self.rooms.write().await;
        let log = rooms.entry(message.room.clone()).or_default();
        if log.len() >= self.capacity {
            log.pop_front();
        }
        log.push_back(message.clone());
        Ok(())
    }

    async fn append_direct_message(&self, message: &DirectMessage) -> Result<(), StoreError> {
        let mut direct = self.direct.write().await;
        if direct.len() >= self.capacity {
            direct.pop_front();
        }
        direct.push_back(message.clone());
        Ok(())
    }

    async fn recent_room_history(
        &self,
        room: &str,
        limit: usize,
    ) -> Result<Vec<RoomMessage>, StoreError> {
        let rooms = self.rooms.read().await;
        Ok(rooms
            .get(room)
            .map(|log| tail(log.iter().cloned(), limit))
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn history_is_ascending_and_bounded() {
        let store = MemoryMessageStore::new();
        for i in 0..5 {
            store
                .append_room_message(&RoomMessage::new("alice", "general", format!("m{i}")))
                .await
                .unwrap();
        }
        store
            .append_room_message(&RoomMessage::new("bob", "random", "elsewhere"))
            .await
            .unwrap();

        let history = store.recent_room_history("general", 3).await.unwrap();
        let bodies: Vec<&str> = history.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(bodies, vec!["m2", "m3", "m4"]);
        assert!(store.recent_room_history("nowhere", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn capacity_drops_oldest() {
        let store = MemoryMessageStore::with_capacity(2);
        for body in ["a", "b", "c"] {
            store
                .append_room_message(&RoomMessage::new("alice", "general", body))
                .await
                .unwrap();
        }
        let history = store.recent_room_history("general", 10).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].message, "b");
    }

    #[tokio::test]
    async fn direct_messages_are_kept_in_order_and_bounded() {
        let store = MemoryMessageStore::with_capacity(2);
        let sent = [("alice", "bob", "hi"), ("bob", "alice", "hey"), ("alice", "carol", "psst")];
        for (from, to, body) in sent {
            store
                .append_direct_message(&DirectMessage::new(from, to, body))
                .await
                .unwrap();
        }

        let kept = store.direct_messages().await;
        let bodies: Vec<&str> = kept.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(bodies, vec!["hey", "psst"]);
    }
}
