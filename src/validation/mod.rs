//! Input validation
//!
//! Checks client-supplied usernames, room names and message bodies before
//! they reach the presence registry or the message store.

pub mod validator;

pub use validator::{validate_join, validate_message, validate_room, validate_username};
