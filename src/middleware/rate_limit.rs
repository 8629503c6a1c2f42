//! Rate limiting middleware
//!
//! Sliding-window limiter applied to chat and private messages, one window
//! per connection.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use crate::presence::ConnectionId;

pub struct RateLimiter {
    requests: HashMap<ConnectionId, VecDeque<Instant>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            requests: HashMap::new(),
            max_requests,
            window,
        }
    }

    pub fn is_allowed(&mut self, connection_id: ConnectionId) -> bool {
        self.is_allowed_at(connection_id, Instant::now())
    }

    /// Records a request at `now` if the connection is under its limit.
    pub fn is_allowed_at(&mut self, connection_id: ConnectionId, now: Instant) -> bool {
        let entry = self.requests.entry(connection_id).or_default();

        while let Some(&oldest) = entry.front() {
            if now.duration_since(oldest) > self.window {
                entry.pop_front();
            } else {
                break;
            }
        }

        if entry.len() < self.max_requests {
            entry.push_back(now);
            true
        } else {
            false
        }
    }

    /// Drops the window of a closed connection.
    pub fn forget(&mut self, connection_id: &ConnectionId) {
        self.requests.remove(connection_id);
    }

    /// Replaces the limits; existing windows are kept.
    pub fn reconfigure(&mut self, max_requests: usize, window: Duration) {
        self.max_requests = max_requests;
        self.window = window;
    }
}
