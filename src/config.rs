//! Configuration management for RAX Chat Relay
//!
//! Separates startup configuration (requires restart) from runtime configuration
//! (read on every event through a shared lock).

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Environment variable prefix, e.g. `RAX_CHAT_PORT=4000`.
pub const ENV_PREFIX: &str = "RAX_CHAT";

/// Complete server configuration with startup/runtime separation
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ServerConfig {
    #[serde(flatten)]
    pub startup: StartupConfig,

    #[serde(flatten)]
    pub runtime: RuntimeConfig,
}

/// Configuration that requires a server restart to take effect
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StartupConfig {
    // ═══ NETWORK ═══
    /// IP address to bind the relay listener
    pub bind_address: String,

    /// TCP port for the relay listener (0 picks an ephemeral port)
    pub port: u16,

    /// Maximum length of one inbound line, in bytes
    pub max_line_length: usize,

    // ═══ INPUT LIMITS ═══
    pub max_username_length: usize,
    pub max_room_length: usize,
    pub max_message_length: usize,

    // ═══ SYSTEM MESSAGES ═══
    /// Sender name used for join/leave announcements and the welcome message
    pub bot_name: String,
    pub welcome_message: String,
}

/// Configuration consulted while the server is running
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RuntimeConfig {
    /// Maximum concurrent connections
    /// Environment: RAX_CHAT_MAX_CLIENTS
    pub max_clients: usize,

    /// Number of room messages replayed to a joining connection
    pub history_limit: usize,

    /// Whether two connections may hold the same username at once
    pub allow_duplicate_usernames: bool,

    /// What happens to delivery when the message store fails
    pub persistence_policy: PersistencePolicy,

    /// Chat and private messages allowed per connection per window
    pub rate_limit_messages: usize,
    pub rate_limit_window_secs: u64,
}

/// Ordering between persistence and delivery.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PersistencePolicy {
    /// Deliver even when the store fails, then tell the sender.
    #[default]
    Optimistic,
    /// Only deliver what the store acknowledged.
    Durable,
}

/// Thread-safe runtime configuration wrapper
pub type SharedRuntimeConfig = Arc<RwLock<RuntimeConfig>>;

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 3000,
            max_line_length: 4096,
            max_username_length: 32,
            max_room_length: 64,
            max_message_length: 2000,
            bot_name: "Chat App Bot".to_string(),
            welcome_message: "Welcome to chat app :)".to_string(),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_clients: 100,
            history_limit: 50,
            allow_duplicate_usernames: false,
            persistence_policy: PersistencePolicy::Optimistic,
            rate_limit_messages: 20,
            rate_limit_window_secs: 10,
        }
    }
}

impl ServerConfig {
    /// Load configuration from `./config.toml` (optional) with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration layered as defaults, then `path` (optional), then environment
    pub fn load_from(path: &str) -> Result<Self, config::ConfigError> {
        let settings = Config::builder()
            .add_source(Config::try_from(&ServerConfig::default())?)
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Split into startup (immutable) and runtime (shared) parts
    pub fn split(self) -> (StartupConfig, SharedRuntimeConfig) {
        let runtime = Arc::new(RwLock::new(self.runtime));
        (self.startup, runtime)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.startup.bind_address.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "bind_address cannot be empty".into(),
            ));
        }

        if self.startup.max_line_length < 64 {
            return Err(config::ConfigError::Message(
                "max_line_length must be at least 64 bytes".into(),
            ));
        }

        if self.startup.max_username_length == 0 || self.startup.max_room_length == 0 {
            return Err(config::ConfigError::Message(
                "username and room length limits must be greater than 0".into(),
            ));
        }

        if self.startup.max_message_length == 0 {
            return Err(config::ConfigError::Message(
                "max_message_length must be greater than 0".into(),
            ));
        }

        if self.startup.bot_name.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "bot_name cannot be empty".into(),
            ));
        }

        if self.runtime.max_clients == 0 {
            return Err(config::ConfigError::Message(
                "max_clients must be greater than 0".into(),
            ));
        }

        if self.runtime.rate_limit_messages == 0 || self.runtime.rate_limit_window_secs == 0 {
            return Err(config::ConfigError::Message(
                "rate limit values must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}

impl StartupConfig {
    /// Bind address and port as a socket string
    pub fn listen_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

impl RuntimeConfig {
    /// Rate limit window as Duration
    pub fn rate_limit_window(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.rate_limit_window_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.startup.listen_socket(), "127.0.0.1:3000");
        assert_eq!(config.runtime.history_limit, 50);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = ServerConfig::load_from("does-not-exist/relay").unwrap();
        assert_eq!(config.startup.bot_name, "Chat App Bot");
        assert_eq!(config.runtime.persistence_policy, PersistencePolicy::Optimistic);
    }

    #[test]
    fn rejects_zero_max_clients() {
        let mut config = ServerConfig::default();
        config.runtime.max_clients = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_blank_bot_name() {
        let mut config = ServerConfig::default();
        config.startup.bot_name = "  ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_file_surfaces_as_relay_error() {
        let path = std::env::temp_dir().join(format!("rax-chat-{}", std::process::id()));
        let file = path.with_extension("toml");
        std::fs::write(&file, "max_clients = 0\n").unwrap();

        let result = ServerConfig::load_from(path.to_str().unwrap());
        std::fs::remove_file(&file).unwrap();

        let err = crate::error::RelayError::from(result.unwrap_err());
        assert!(matches!(err, crate::error::RelayError::Config(_)));
        assert!(err.to_string().contains("max_clients must be greater than 0"));
    }

    #[tokio::test]
    async fn split_shares_runtime_config() {
        let (startup, runtime) = ServerConfig::default().split();
        runtime.write().await.max_clients = 5;
        assert_eq!(runtime.read().await.max_clients, 5);
        assert_eq!(startup.port, 3000);
    }
}
