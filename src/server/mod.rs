//! Server core functionality
//!
//! Listener, accept loop and wiring of the shared relay state.

pub mod core;

pub use self::core::Server;
