//! Room routing
//!
//! Computes recipient sets from the presence registry and delivers events to
//! the selected connections.

pub mod room_router;

pub use room_router::{OutboundReceiver, OutboundSender, RoomRouter};
