//! Module `room_router`
//!
//! Delivery is fire-and-forget: each connection owns an unbounded FIFO
//! channel drained by its writer task, so a connection observes its events in
//! the order the router issued them. Lock order is registry, then outbound.

use log::debug;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

use crate::presence::{ConnectionId, SharedRegistry};
use crate::protocol::ServerEvent;

pub type OutboundSender = mpsc::UnboundedSender<ServerEvent>;
pub type OutboundReceiver = mpsc::UnboundedReceiver<ServerEvent>;

#[derive(Clone)]
pub struct RoomRouter {
    registry: SharedRegistry,
    outbound: Arc<Mutex<HashMap<ConnectionId, OutboundSender>>>,
}

impl RoomRouter {
    pub fn new(registry: SharedRegistry) -> Self {
        Self {
            registry,
            outbound: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Registers the outbound channel of a new connection.
    pub async fn register(&self, connection_id: ConnectionId, sender: OutboundSender) {
        self.outbound.lock().await.insert(connection_id, sender);
    }

    /// Forgets a connection's outbound channel. Later deliveries to it are dropped.
    pub async fn unregister(&self, connection_id: &ConnectionId) {
        self.outbound.lock().await.remove(connection_id);
    }

    /// Number of connections with a registered outbound channel.
    pub async fn connection_count(&self) -> usize {
        self.outbound.lock().await.len()
    }

    /// Delivers `event` to every connection in `room`, except `exclude`.
    ///
    /// Recipients are taken from a registry snapshot under the registry lock,
    /// held until every push is done. Returns the number of deliveries.
    pub async fn broadcast_to_room(
        &self,
        room: &str,
        event: ServerEvent,
        exclude: Option<ConnectionId>,
    ) -> usize {
        let registry = self.registry.lock().await;
        let outbound = self.outbound.lock().await;

        let mut delivered = 0;
        for connection_id in registry.connections_in(room) {
            if exclude == Some(connection_id) {
                continue;
            }
            if push(&outbound, &connection_id, event.clone()) {
                delivered += 1;
            }
        }
        debug!("Broadcast to room {} reached {} connection(s)", room, delivered);
        delivered
    }

    /// Best-effort delivery to a single connection. Returns whether it was queued.
    pub async fn send_to_connection(
        &self,
        connection_id: &ConnectionId,
        event: ServerEvent,
    ) -> bool {
        let outbound = self.outbound.lock().await;
        push(&outbound, connection_id, event)
    }

    /// Pushes the full member list of `room` to every current member.
    pub async fn refresh_room_presence(&self, room: &str) -> Vec<String> {
        let registry = self.registry.lock().await;
        let outbound = self.outbound.lock().await;

        let members = registry.members_of(room);
        for connection_id in registry.connections_in(room) {
            push(&outbound, &connection_id, ServerEvent::RoomUsers(members.clone()));
        }
        members
    }
}

/// Queues `event` for `connection_id`. A missing or closed channel is a silent drop.
fn push(
    outbound: &HashMap<ConnectionId, OutboundSender>,
    connection_id: &ConnectionId,
    event: ServerEvent,
) -> bool {
    match outbound.get(connection_id) {
        Some(sender) => sender.send(event).is_ok(),
        None => false,
    }
}
