//! `ScrawlServer` builder and accept loop.
//!
//! Ties the layers together: transport → protocol → session.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use scrawl_protocol::{Codec, JsonCodec, SessionId};
use scrawl_session::{GameConfig, SessionHandle, SessionManager};
use scrawl_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::{ScrawlError, ServerConfig};

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) sessions: Mutex<SessionManager>,
    /// The session every new connection is attached to.
    pub(crate) lobby: SessionId,
    pub(crate) codec: C,
    pub(crate) idle_timeout: Duration,
    /// How often the writer pings a connected peer.
    pub(crate) ping_interval: Duration,
}

/// Builder for configuring and starting a Scrawl server.
///
/// # Example
///
/// ```rust,ignore
/// use scrawl::prelude::*;
///
/// let server = ScrawlServer::builder()
///     .bind("0.0.0.0:3000")
///     .game_config(GameConfig { round_secs: 90, ..GameConfig::default() })
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct ScrawlServerBuilder {
    bind_addr: String,
    game_config: GameConfig,
    idle_timeout: Duration,
}

impl ScrawlServerBuilder {
    pub fn new() -> Self {
        Self::from_config(ServerConfig::default())
    }

    /// Start from a complete [`ServerConfig`].
    pub fn from_config(config: ServerConfig) -> Self {
        Self {
            bind_addr: config.bind,
            game_config: config.game,
            idle_timeout: config.idle_timeout,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    pub fn game_config(mut self, config: GameConfig) -> Self {
        self.game_config = config;
        self
    }

    /// How long a connection may go without any inbound frame before it is
    /// dropped. The server pings at a third of this interval.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Binds the listener and starts the lobby session.
    pub async fn build(self) -> Result<ScrawlServer, ScrawlError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let mut sessions = SessionManager::new();
        let lobby = sessions.create_session(self.game_config)?;

        let state = Arc::new(ServerState {
            sessions: Mutex::new(sessions),
            lobby,
            codec: JsonCodec,
            idle_timeout: self.idle_timeout,
            ping_interval: ping_interval(self.idle_timeout),
        });

        Ok(ScrawlServer { transport, state })
    }
}

/// A third of the idle timeout, never below 10 ms.
fn ping_interval(idle_timeout: Duration) -> Duration {
    (idle_timeout / 3).max(Duration::from_millis(10))
}

impl Default for ScrawlServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Scrawl server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct ScrawlServer<C: Codec = JsonCodec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl ScrawlServer {
    pub fn builder() -> ScrawlServerBuilder {
        ScrawlServerBuilder::new()
    }
}

impl<C: Codec> ScrawlServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ScrawlError> {
        Ok(self.transport.local_addr()?)
    }

    /// Id of the session new connections join.
    pub fn lobby(&self) -> SessionId {
        self.state.lobby
    }

    /// A handle to the lobby session, for inspection from outside the
    /// connection handlers.
    pub async fn lobby_handle(&self) -> Option<SessionHandle> {
        self.state.sessions.lock().await.handle(self.state.lobby)
    }

    /// Runs the accept loop, spawning one handler task per connection.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), ScrawlError> {
        tracing::info!(lobby = %self.state.lobby, "scrawl server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
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
