//! Error types
//!
//! Defines domain-specific error types for each module of the chat relay.

use std::io;

use crate::presence::ConnectionId;

/// Input validation errors, raised before any registry mutation
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: &'static str },
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("{field} contains invalid characters")]
    InvalidCharacters { field: &'static str },
}

/// Message store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Message store unavailable: {0}")]
    Unavailable(String),
}

/// Wire protocol errors
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Malformed event: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Event exceeds {max} bytes")]
    TooLong { max: usize },
    #[error("Event is not valid UTF-8")]
    InvalidUtf8,
}

/// Errors surfaced by the lifecycle controller to the triggering connection
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),
    #[error("Failed to save message: {0}")]
    Persistence(#[from] StoreError),
    #[error("Connection {0} has not joined a room")]
    NotJoined(ConnectionId),
    #[error("Username {0} is already in use")]
    UsernameTaken(String),
    #[error("Rate limit exceeded")]
    RateLimited,
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// General relay error for the transport layer
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}
