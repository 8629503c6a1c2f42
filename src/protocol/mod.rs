//! Chat wire protocol
//!
//! Closed event types exchanged with clients, encoded as one JSON object per line.

pub mod events;
pub mod messages;
pub mod parser;
pub mod responses;

pub use events::{ClientEvent, ServerEvent};
pub use messages::{ChatMessage, DirectMessage, RoomMessage};
pub use parser::{encode_event, parse_event, parse_line};
