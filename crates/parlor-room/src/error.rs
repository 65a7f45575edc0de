//! Error types for the room layer.
//!
//! Only join and leave report errors back to the caller; action,
//! restart, and tick failures are silent no-ops by design (the client
//! resynchronizes from the next broadcast).

use parlor_games::GameKind;
use parlor_protocol::{PlayerId, RoomKey};

/// Errors from room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// All seats are taken and the game doesn't admit spectators.
    #[error("{0} room '{1}' is full")]
    RoomFull(GameKind, RoomKey),

    /// The player already joined this room.
    #[error("player {0} already in {1} room '{2}'")]
    AlreadyInRoom(PlayerId, GameKind, RoomKey),

    /// The player never joined this room.
    #[error("player {0} not in {1} room '{2}'")]
    NotInRoom(PlayerId, GameKind, RoomKey),

    /// The room actor's channel is closed or full; the room is gone or
    /// wedged.
    #[error("{0} room '{1}' is unavailable")]
    Unavailable(GameKind, RoomKey),
}
