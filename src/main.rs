//! RAX Chat Relay - Entry Point

use log::{error, info};
use std::sync::Arc;

use rax_chat_relay::error::RelayError;
use rax_chat_relay::store::MemoryMessageStore;
use rax_chat_relay::{Server, ServerConfig};

#[tokio::main]
async fn main() {
    // RUST_LOG overrides the default `info` filter
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Launching chat relay...");

    if let Err(e) = run().await {
        error!("Server startup failed: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), RelayError> {
    let config = ServerConfig::load()?;
    let server = Server::bind(config, Arc::new(MemoryMessageStore::new())).await?;
    server.start().await;
    Ok(())
}
