//! Message store
//!
//! Persistence collaborator for room and direct messages. The relay only
//! depends on the `MessageStore` trait; `MemoryMessageStore` is the bundled
//! implementation.

pub mod memory;

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::StoreError;
use crate::protocol::{DirectMessage, RoomMessage};

pub use memory::MemoryMessageStore;

pub type SharedStore = Arc<dyn MessageStore>;

#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn append_room_message(&self, message: &RoomMessage) -> Result<(), StoreError>;

    async fn append_direct_message(&self, message: &DirectMessage) -> Result<(), StoreError>;

    /// Up to `limit` most recent messages of `room`, oldest first.
    async fn recent_room_history(
        &self,
        room: &str,
        limit: usize,
    ) -> Result<Vec<RoomMessage>, StoreError>;
}
