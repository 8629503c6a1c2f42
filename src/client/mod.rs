//! Client connection handling
//!
//! Per-connection reader loop and writer task.

pub mod handler;

pub use handler::handle_client;
