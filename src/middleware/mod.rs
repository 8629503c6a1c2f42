//! Relay middleware
//!
//! Provides logging helpers and per-connection rate limiting.

pub mod logging;
pub mod rate_limit;

pub use rate_limit::RateLimiter;
