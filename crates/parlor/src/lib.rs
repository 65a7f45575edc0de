//! # Parlor
//!
//! WebSocket server for small multiplayer parlor games: tic-tac-toe,
//! snake, tetris, and pong. The server is authoritative — clients send
//! intents, rooms apply them (or silently refuse), and every member
//! receives the resulting state.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use parlor::prelude::*;
//!
//! struct AcceptEveryone;
//!
//! impl Authenticator for AcceptEveryone {
//!     async fn authenticate(
//!         &self,
//!         token: Option<&str>,
//!     ) -> Result<Identity, SessionError> {
//!         let id = token.and_then(|t| t.parse().ok()).unwrap_or(0);
//!         Ok(Identity::guest(PlayerId(id)))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ParlorError> {
//!     let server = ParlorServerBuilder::new()
//!         .bind("0.0.0.0:8080")
//!         .build(AcceptEveryone)
//!         .await?;
//!     server.run().await
//! }
//! ```

mod error;
mod handler;
mod server;
mod transport;

pub use error::ParlorError;
pub use server::{ParlorServer, ParlorServerBuilder};
pub use transport::{ConnectionId, TransportError, WebSocketConnection, WebSocketTransport};

/// The names most servers need, in one import.
pub mod prelude {
    pub use crate::{ParlorError, ParlorServer, ParlorServerBuilder};
    pub use parlor_games::{GameAction, GameKind, GameState};
    pub use parlor_protocol::{
        ClientMessage, Identity, PlayerId, ServerMessage,
    };
    pub use parlor_session::{Authenticator, SessionError};
}
