//! Error types for the session layer.

use parlor_protocol::PlayerId;

/// Errors from authentication and session tracking.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The handshake token was rejected by the
    /// [`Authenticator`](crate::Authenticator).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// No session exists for the given player.
    #[error("session not found for player {0}")]
    NotFound(PlayerId),

    /// The player already has a live connection. One connection per
    /// identity; the second handshake is refused.
    #[error("player {0} already has an active session")]
    AlreadyConnected(PlayerId),
}
