//! Module `controller`
//!
//! Per connection: Disconnected -> Joined(room) -> Disconnected. A new join
//! while joined moves the connection to the new room in one registry update.
//!
//! Store calls are awaited outside the registry lock. Whether delivery
//! proceeds after a store failure is governed by `PersistencePolicy`; the
//! failure itself is always returned so the caller can tell the sender.

use log::{info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::{PersistencePolicy, RuntimeConfig, SharedRuntimeConfig, StartupConfig};
use crate::error::{ChatError, StoreError};
use crate::middleware::RateLimiter;
use crate::presence::{ConnectionId, PresenceEntry, SharedRegistry};
use crate::protocol::responses::{joined_text, left_text, system_message};
use crate::protocol::{ChatMessage, ClientEvent, DirectMessage, RoomMessage, ServerEvent};
use crate::router::{OutboundSender, RoomRouter};
use crate::store::SharedStore;
use crate::validation::{validate_join, validate_message, validate_username};

pub struct LifecycleController {
    registry: SharedRegistry,
    router: RoomRouter,
    store: SharedStore,
    startup: Arc<StartupConfig>,
    runtime: SharedRuntimeConfig,
    rate_limiter: Mutex<RateLimiter>,
}

impl LifecycleController {
    pub fn new(
        registry: SharedRegistry,
        store: SharedStore,
        startup: Arc<StartupConfig>,
        runtime: SharedRuntimeConfig,
    ) -> Self {
        let defaults = RuntimeConfig::default();
        Self {
            router: RoomRouter::new(Arc::clone(&registry)),
            registry,
            store,
            startup,
            runtime,
            rate_limiter: Mutex::new(RateLimiter::new(
                defaults.rate_limit_messages,
                defaults.rate_limit_window(),
            )),
        }
    }

    pub fn router(&self) -> &RoomRouter {
        &self.router
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// Registers a new connection's outbound channel. The connection starts out
    /// not joined to any room.
    pub async fn connect(&self, connection_id: ConnectionId, sender: OutboundSender) {
        self.router.register(connection_id, sender).await;
    }

    /// Dispatches one inbound event.
    pub async fn handle(
        &self,
        connection_id: ConnectionId,
        event: ClientEvent,
    ) -> Result<(), ChatError> {
        match event {
            ClientEvent::JoinRoom { username, room } => {
                self.join(connection_id, &username, &room).await
            }
            ClientEvent::ChatMessage { message } => {
                self.send_room_message(connection_id, &message).await
            }
            ClientEvent::PrivateMessage { to_user, message } => {
                self.send_direct_message(connection_id, &to_user, &message).await
            }
            ClientEvent::Typing => self.typing(connection_id).await,
            ClientEvent::StopTyping => self.stop_typing(connection_id).await,
            ClientEvent::LeaveRoom => self.leave(connection_id).await,
        }
    }

    pub async fn join(
        &self,
        connection_id: ConnectionId,
        username: &str,
        room: &str,
    ) -> Result<(), ChatError> {
        let (username, room) = validate_join(username, room, &self.startup)?;
        let (history_limit, allow_duplicates) = {
            let runtime = self.runtime.read().await;
            (runtime.history_limit, runtime.allow_duplicate_usernames)
        };

        let previous = {
            let mut registry = self.registry.lock().await;
            if !allow_duplicates && registry.is_username_taken_by_other(&username, &connection_id) {
                return Err(ChatError::UsernameTaken(username));
            }
            registry.upsert(connection_id, username.as_str(), room.as_str())
        };
        info!("{} joined room {} as {}", connection_id, room, username);

        let bot = &self.startup.bot_name;
        if let Some(previous) = previous {
            if previous.room != room {
                // Members of the room we moved out of must not keep a stale list.
                self.announce_departure(connection_id, &previous).await;
            } else if previous.username != username {
                // Same room, new name: the old name leaves, the refresh below follows.
                self.router
                    .broadcast_to_room(
                        &room,
                        system_message(bot, left_text(&previous.username)),
                        Some(connection_id),
                    )
                    .await;
            }
        }

        let history = self.store.recent_room_history(&room, history_limit).await;
        let (history, history_error) = match history {
            Ok(messages) => (messages.iter().map(ChatMessage::from).collect(), None),
            Err(e) => {
                warn!("Failed to load history for room {}: {}", room, e);
                (Vec::new(), Some(e))
            }
        };
        self.router
            .send_to_connection(&connection_id, ServerEvent::RoomHistory(history))
            .await;

        self.router
            .broadcast_to_room(
                &room,
                system_message(bot, joined_text(&username)),
                Some(connection_id),
            )
            .await;
        let welcome = system_message(bot, self.startup.welcome_message.as_str());
        self.router.send_to_connection(&connection_id, welcome).await;
        self.router.refresh_room_presence(&room).await;

        match history_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// Broadcasts `body` to the sender's room, sender included.
    pub async fn send_room_message(
        &self,
        connection_id: ConnectionId,
        body: &str,
    ) -> Result<(), ChatError> {
        let entry = self.joined_entry(connection_id).await?;
        validate_message(body, &self.startup)?;
        self.check_rate(connection_id).await?;

        let message = RoomMessage::new(entry.username, entry.room, body);
        let persisted = self.store.append_room_message(&message).await;

        if self.should_deliver(&persisted).await {
            let event = ServerEvent::Message(ChatMessage::from(&message));
            self.router.broadcast_to_room(&message.room, event, None).await;
        }
        persisted.map_err(ChatError::from)
    }

    /// Delivers a private message to the recipient, if online, and always
    /// echoes it to the sender. A self-message is therefore delivered twice.
    pub async fn send_direct_message(
        &self,
        connection_id: ConnectionId,
        to_user: &str,
        body: &str,
    ) -> Result<(), ChatError> {
        let entry = self.joined_entry(connection_id).await?;
        let to_user = validate_username(to_user, &self.startup)?;
        validate_message(body, &self.startup)?;
        self.check_rate(connection_id).await?;

        let message = DirectMessage::new(entry.username, to_user, body);
        let persisted = self.store.append_direct_message(&message).await;

        if self.should_deliver(&persisted).await {
            let event = ServerEvent::PrivateMessage(ChatMessage::from(&message));
            let recipient = self.registry.lock().await.find_by_username(&message.to_user);
            if let Some(recipient) = recipient {
                self.router.send_to_connection(&recipient, event.clone()).await;
            }
            self.router.send_to_connection(&connection_id, event).await;
        }
        persisted.map_err(ChatError::from)
    }

    pub async fn typing(&self, connection_id: ConnectionId) -> Result<(), ChatError> {
        self.signal(connection_id, |username| ServerEvent::Typing { username }).await;
        Ok(())
    }

    pub async fn stop_typing(&self, connection_id: ConnectionId) -> Result<(), ChatError> {
        self.signal(connection_id, |username| ServerEvent::StopTyping { username }).await;
        Ok(())
    }

    /// Leaves the current room. Not being joined is a no-op.
    pub async fn leave(&self, connection_id: ConnectionId) -> Result<(), ChatError> {
        let removed = self.registry.lock().await.remove(&connection_id);
        if let Some(entry) = removed {
            info!("{} left room {}", connection_id, entry.room);
            self.announce_departure(connection_id, &entry).await;
        }
        Ok(())
    }

    /// Tears down a connection. If it was joined, its room sees the same
    /// announcement and refresh as an explicit leave.
    pub async fn disconnect(&self, connection_id: ConnectionId) {
        let removed = self.registry.lock().await.remove(&connection_id);
        if let Some(entry) = removed {
            info!("{} dropped out of room {}", connection_id, entry.room);
            self.announce_departure(connection_id, &entry).await;
        }
        self.router.unregister(&connection_id).await;
        self.rate_limiter.lock().await.forget(&connection_id);
    }

    async fn announce_departure(&self, connection_id: ConnectionId, entry: &PresenceEntry) {
        self.router
            .broadcast_to_room(
                &entry.room,
                system_message(&self.startup.bot_name, left_text(&entry.username)),
                Some(connection_id),
            )
            .await;
        self.router.refresh_room_presence(&entry.room).await;
    }

    /// Typing signals are stateless and dropped for connections not in a room.
    async fn signal(&self, connection_id: ConnectionId, build: impl FnOnce(String) -> ServerEvent) {
        let entry = self.registry.lock().await.entry_of(&connection_id).cloned();
        if let Some(entry) = entry {
            self.router
                .broadcast_to_room(&entry.room, build(entry.username), Some(connection_id))
                .await;
        }
    }

    async fn joined_entry(&self, connection_id: ConnectionId) -> Result<PresenceEntry, ChatError> {
        self.registry
            .lock()
            .await
            .entry_of(&connection_id)
            .cloned()
            .ok_or(ChatError::NotJoined(connection_id))
    }

    async fn check_rate(&self, connection_id: ConnectionId) -> Result<(), ChatError> {
        let (max_requests, window) = {
            let runtime = self.runtime.read().await;
            (runtime.rate_limit_messages, runtime.rate_limit_window())
        };
        let mut limiter = self.rate_limiter.lock().await;
        limiter.reconfigure(max_requests, window);
        if limiter.is_allowed(connection_id) {
            Ok(())
        } else {
            Err(ChatError::RateLimited)
        }
    }

    async fn should_deliver(&self, persisted: &Result<(), StoreError>) -> bool {
        persisted.is_ok()
            || self.runtime.read().await.persistence_policy == PersistencePolicy::Optimistic
    }
}
