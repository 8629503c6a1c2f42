//! RAX Chat Relay
//!
//! Real-time chat relay: connections join named rooms, exchange room and
//! direct messages, and receive live presence and typing updates.

pub mod client;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod middleware;
pub mod presence;
pub mod protocol;
pub mod router;
pub mod server;
pub mod store;
pub mod validation;

pub use config::ServerConfig;
pub use lifecycle::LifecycleController;
pub use server::Server;
