//! `FlipsideServer` builder and server loop.
//!
//! This is the entry point for running a Flipside game server. It ties
//! together all the layers: transport → protocol → room registry, plus
//! the periodic sweep that reaps expired sessions.

use std::sync::Arc;
use std::time::Duration;

use flipside_protocol::JsonCodec;
use flipside_room::{RegistryConfig, SessionRegistry};
use flipside_transport::{Transport, TransportError, WebSocketTransport};
use tokio::sync::Mutex;

use crate::directory::Directory;
use crate::handler::handle_connection;
use crate::FlipsideError;

/// How often the registry sweep runs by default.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The
/// registry and directory each sit behind one `Mutex`; room mutation
/// itself happens inside per-room actors, so these locks only guard the
/// maps and are held across no network I/O other than actor channels.
pub(crate) struct ServerState {
    pub(crate) registry: Mutex<SessionRegistry>,
    pub(crate) directory: Mutex<Directory>,
    pub(crate) codec: JsonCodec,
}

/// Builder for configuring and starting a Flipside server.
///
/// # Example
///
/// ```rust,no_run
/// use flipside::ServerBuilder;
///
/// # async fn run() -> Result<(), flipside::FlipsideError> {
/// let server = ServerBuilder::new()
///     .bind("0.0.0.0:8080")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct ServerBuilder {
    bind_addr: String,
    registry_config: RegistryConfig,
    sweep_interval: Duration,
}

impl ServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            registry_config: RegistryConfig::default(),
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the registry configuration (retention, lobby, spectators).
    pub fn registry_config(mut self, config: RegistryConfig) -> Self {
        self.registry_config = config;
        self
    }

    /// Sets how often expired sessions are swept.
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Builds the server, binding the WebSocket listener.
    pub async fn build(self) -> Result<FlipsideServer, FlipsideError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            registry: Mutex::new(SessionRegistry::new(
                self.registry_config,
            )),
            directory: Mutex::new(Directory::new()),
            codec: JsonCodec,
        });

        Ok(FlipsideServer {
            transport,
            state,
            sweep_interval: self.sweep_interval,
        })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Flipside game server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct FlipsideServer {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
    sweep_interval: Duration,
}

impl FlipsideServer {
    /// Creates a new builder.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(
        &self,
    ) -> Result<std::net::SocketAddr, TransportError> {
        self.transport.local_addr()
    }

    /// Runs the server: the sweep timer plus the accept loop. Accepted
    /// connections each get their own handler task. Runs until the
    /// process is terminated.
    pub async fn run(mut self) -> Result<(), FlipsideError> {
        tracing::info!("Flipside server running");

        let sweep_state = Arc::clone(&self.state);
        let sweep_interval = self.sweep_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(sweep_interval);
            // The first tick fires immediately; skip it.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let swept =
                    sweep_state.registry.lock().await.sweep().await;
                if swept > 0 {
                    tracing::info!(swept, "sweep reaped expired rooms");
                }
            }
        });

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_connection(conn, state).await
                        {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
