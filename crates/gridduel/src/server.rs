//! `GridduelServer` builder and server loop.
//!
//! This is the entry point for running a Gridduel server. It ties together
//! all the layers: transport → protocol → room registry.

use std::sync::Arc;
use std::time::Duration;

use gridduel_protocol::{Codec, JsonCodec};
use gridduel_room::RoomRegistry;
use gridduel_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::GridduelError;
use crate::handler::handle_connection;

/// Shared server state passed to each connection handler task.
///
/// The registry sits behind one mutex: every join, move and disconnect
/// cleanup holds it from start to finish, which keeps turn order intact
/// even though handlers run on many threads.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) registry: Mutex<RoomRegistry>,
    pub(crate) codec: C,
    pub(crate) idle_timeout: Option<Duration>,
}

/// Builder for configuring and starting a Gridduel server.
///
/// # Example
///
/// ```rust,ignore
/// let server = GridduelServer::builder()
///     .bind("0.0.0.0:3000")
///     .idle_timeout(Duration::from_secs(300))
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct GridduelServerBuilder {
    bind_addr: String,
    idle_timeout: Option<Duration>,
}

impl GridduelServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            idle_timeout: None,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Closes connections that send nothing for `timeout`.
    ///
    /// Disabled by default: a player may think as long as they like.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    /// Binds the transport and builds the server.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<GridduelServer<JsonCodec>, GridduelError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            registry: Mutex::new(RoomRegistry::new()),
            codec: JsonCodec,
            idle_timeout: self.idle_timeout,
        });

        Ok(GridduelServer { transport, state })
    }
}

impl Default for GridduelServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Gridduel server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct GridduelServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl GridduelServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> GridduelServerBuilder {
        GridduelServerBuilder::new()
    }
}

impl<C: Codec> GridduelServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Spawns a handler task per accepted connection. Accept failures are
    /// logged and never stop the loop. Runs until the process is
    /// terminated.
    pub async fn run(mut self) -> Result<(), GridduelError> {
        tracing::info!("Gridduel server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
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
