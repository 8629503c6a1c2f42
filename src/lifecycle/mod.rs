//! Connection lifecycle
//!
//! Orchestrates join, message, typing, leave and disconnect transitions over
//! the presence registry and the room router.

pub mod controller;

pub use controller::LifecycleController;
