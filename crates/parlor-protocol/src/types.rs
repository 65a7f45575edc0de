//! Core protocol types for the parlor wire format.
//!
//! Inbound messages target a room by `(game, room)` — the room key is an
//! opaque string chosen by clients, and a room is created lazily on the
//! first join to a key. Outbound messages carry the authoritative state
//! snapshot the room fanned out after handling an action.

use std::fmt;

use parlor_games::{GameAction, GameKind, GameState};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// `#[serde(transparent)]` serializes the newtype as the bare number, so
/// `PlayerId(42)` is `42` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A connection's resolved identity: who they are, and whether the
/// authenticator recognized them. Guests (`recognized == false`) can play
/// but never reach the leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub player_id: PlayerId,
    pub recognized: bool,
}

impl Identity {
    /// An identity the authenticator vouched for.
    pub fn recognized(player_id: PlayerId) -> Self {
        Self { player_id, recognized: true }
    }

    /// A guest identity. Plays normally, never recorded.
    pub fn guest(player_id: PlayerId) -> Self {
        Self { player_id, recognized: false }
    }
}

/// An opaque, client-chosen room name. Rooms are addressed by
/// `(GameKind, RoomKey)`; the same key names different rooms under
/// different game kinds.
pub type RoomKey = String;

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Everything a client can send.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON, e.g.
/// `{ "type": "join", "game": "snake", "room": "lobby-1" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// First message on every connection. `token` is resolved to an
    /// [`Identity`] by the server's authenticator; `None` means guest.
    Hello { token: Option<String> },

    /// Join (and lazily create) the room at `(game, room)`.
    Join { game: GameKind, room: RoomKey },

    /// A game intent for a room the client has joined.
    Action {
        game: GameKind,
        room: RoomKey,
        payload: GameAction,
    },

    /// Replace the room's game state with a fresh one. Seats are kept.
    Restart { game: GameKind, room: RoomKey },

    /// Leave a room's seat list. The room itself stays.
    Leave { game: GameKind, room: RoomKey },

    /// Ask for the top scores of one game kind.
    Leaderboard { game: GameKind, limit: usize },
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player_id: PlayerId,
    pub score: f64,
}

/// Everything the server can send.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Answer to [`ClientMessage::Hello`].
    Welcome {
        player_id: PlayerId,
        recognized: bool,
    },

    /// Fanned out to every room member when someone joins; the joiner
    /// reads their own seat from it. `seat` is `None` for spectators.
    Joined {
        game: GameKind,
        room: RoomKey,
        player_id: PlayerId,
        seat: Option<usize>,
        state: GameState,
    },

    /// The seat quota is met and play has begun.
    Started { game: GameKind, room: RoomKey },

    /// Full authoritative state, fanned out after every handled action —
    /// whether or not the action changed anything.
    Update {
        game: GameKind,
        room: RoomKey,
        state: GameState,
    },

    /// Answer to [`ClientMessage::Leaderboard`].
    Leaderboard {
        game: GameKind,
        entries: Vec<LeaderboardEntry>,
    },

    /// Only sent when the handshake itself cannot proceed; everything
    /// after the handshake fails silently (see the error design notes).
    Error { message: String },
}
