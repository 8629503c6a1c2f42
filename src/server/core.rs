use log::{error, info, warn};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use crate::client::handle_client;
use crate::config::{ServerConfig, SharedRuntimeConfig, StartupConfig};
use crate::error::RelayError;
use crate::lifecycle::LifecycleController;
use crate::middleware::logging::log_connection;
use crate::presence::{ConnectionId, PresenceRegistry};
use crate::protocol::{ServerEvent, encode_event};
use crate::store::SharedStore;

pub struct Server {
    listener: TcpListener,
    controller: Arc<LifecycleController>,
    startup: Arc<StartupConfig>,
    runtime: SharedRuntimeConfig,
}

impl Server {
    /// Binds the listener and builds the shared registry, router and controller.
    pub async fn bind(config: ServerConfig, store: SharedStore) -> Result<Self, RelayError> {
        let (startup, runtime) = config.split();
        let startup = Arc::new(startup);

        let socket = startup.listen_socket();
        let listener = match TcpListener::bind(&socket).await {
            Ok(listener) => {
                info!("Server bound to {}", socket);
                listener
            }
            Err(e) => {
                error!("Failed to bind to {}: {}", socket, e);
                return Err(e.into());
            }
        };

        let controller = Arc::new(LifecycleController::new(
            PresenceRegistry::shared(),
            store,
            Arc::clone(&startup),
            Arc::clone(&runtime),
        ));

        Ok(Self {
            listener,
            controller,
            startup,
            runtime,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, RelayError> {
        Ok(self.listener.local_addr()?)
    }

    /// Serves until Ctrl-C.
    pub async fn start(self) {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;
    }

    /// Accepts connections until `shutdown` completes.
    pub async fn run_until(self, shutdown: impl Future<Output = ()>) {
        let max_clients = self.runtime.read().await.max_clients;
        info!(
            "Starting RAX chat relay on {} (max {} clients)",
            self.startup.listen_socket(),
            max_clients
        );
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutting down chat relay");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => self.admit(stream, peer).await,
                    Err(e) => error!("Error accepting connection: {}", e),
                },
            }
        }
    }

    /// Registers the connection and spawns its handler, or turns it away when full.
    ///
    /// Runs on the accept loop, so the capacity check and the registration
    /// cannot interleave with another admission.
    async fn admit(&self, stream: TcpStream, peer: SocketAddr) {
        let max_clients = self.runtime.read().await.max_clients;
        let active = self.controller.router().connection_count().await;

        if active >= max_clients {
            warn!("Rejecting {}: server full ({}/{} clients)", peer, active, max_clients);
            tokio::spawn(reject(stream, peer));
            return;
        }

        let connection_id = ConnectionId::new();
        let (tx, rx) = mpsc::unbounded_channel();
        self.controller.connect(connection_id, tx).await;
        log_connection(connection_id, peer, active + 1, max_clients);

        let controller = Arc::clone(&self.controller);
        let startup = Arc::clone(&self.startup);

        // Spawn a task for each client so accept loop doesn't block
        tokio::spawn(handle_client(stream, peer, connection_id, rx, controller, startup));
    }
}

async fn reject(mut stream: TcpStream, peer: SocketAddr) {
    let event = ServerEvent::error("Too many connections. Try again later.");
    let result = match encode_event(&event) {
        Ok(line) => stream.write_all(line.as_bytes()).await,
        Err(e) => Err(e.into()),
    };
    if let Err(e) = result {
        warn!("Failed to notify rejected client {}: {}", peer, e);
    }
    let _ = stream.shutdown().await;
}
