//! `ParlorServer` builder and accept loop.
//!
//! This ties the layers together: transport → protocol → session →
//! rooms → scores. Each accepted connection gets its own handler task;
//! everything they share lives in one `Arc<ServerState>`.

use std::sync::Arc;

use parlor_protocol::JsonCodec;
use parlor_room::RoomRegistry;
use parlor_score::ScoreBoard;
use parlor_session::{Authenticator, SessionManager};
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::transport::WebSocketTransport;
use crate::ParlorError;

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<A: Authenticator> {
    pub(crate) registry: RoomRegistry,
    pub(crate) sessions: Mutex<SessionManager>,
    /// Doubles as the rooms' result recorder and the handler's
    /// leaderboard source.
    pub(crate) scores: Arc<ScoreBoard>,
    pub(crate) auth: A,
    pub(crate) codec: JsonCodec,
}

/// Builder for configuring and starting a parlor server.
///
/// # Example
///
/// ```rust,ignore
/// let server = ParlorServerBuilder::new()
///     .bind("0.0.0.0:8080")
///     .build(my_auth)
///     .await?;
/// server.run().await
/// ```
pub struct ParlorServerBuilder {
    bind_addr: String,
}

impl ParlorServerBuilder {
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
        }
    }

    /// Sets the address to bind to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Binds the listener and assembles the server with the given
    /// authenticator.
    pub async fn build<A: Authenticator>(
        self,
        auth: A,
    ) -> Result<ParlorServer<A>, ParlorError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let scores = Arc::new(ScoreBoard::new());
        let state = Arc::new(ServerState {
            registry: RoomRegistry::new(scores.clone()),
            sessions: Mutex::new(SessionManager::new()),
            scores,
            auth,
            codec: JsonCodec,
        });

        Ok(ParlorServer { transport, state })
    }
}

impl Default for ParlorServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running parlor server. Call [`run()`](Self::run) to start
/// accepting connections.
pub struct ParlorServer<A: Authenticator> {
    transport: WebSocketTransport,
    state: Arc<ServerState<A>>,
}

impl<A: Authenticator> ParlorServer<A> {
    pub fn builder() -> ParlorServerBuilder {
        ParlorServerBuilder::new()
    }

    /// The address the listener actually bound.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(mut self) -> Result<(), ParlorError> {
        tracing::info!("parlor server running");

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
