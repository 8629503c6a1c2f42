//! Presence tracking
//!
//! Single source of truth for which connection holds which username in which room.

pub mod connection;
pub mod registry;

pub use connection::ConnectionId;
pub use registry::{PresenceEntry, PresenceRegistry, SharedRegistry};
