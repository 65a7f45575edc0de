//! Per-room configuration.

use parlor_games::GameKind;
use serde::{Deserialize, Serialize};

/// Settings for one room instance.
///
/// The defaults for each game come from [`RoomConfig::for_kind`]; tests
/// override individual fields to probe edge behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Number of acting seats. Joins beyond this either become
    /// spectators or are refused.
    pub seat_capacity: usize,

    /// Seats required before the game counts as started.
    pub seat_quota: usize,

    /// Timer rate in Hz. 0 means event-driven: the room's scheduler
    /// never fires and only client actions advance the game.
    pub tick_rate_hz: u32,

    /// Whether joiners beyond the seat capacity may stay and watch.
    pub allow_spectators: bool,

    /// Fan out the full state after every handled action, even when the
    /// action was an ignored no-op. Clients rely on the echo to stay
    /// in lockstep, so this defaults to on.
    pub broadcast_on_every_action: bool,
}

impl RoomConfig {
    /// The standard configuration for a game kind.
    pub fn for_kind(kind: GameKind) -> Self {
        Self {
            seat_capacity: kind.seat_capacity(),
            seat_quota: kind.seat_quota(),
            tick_rate_hz: kind.tick_rate_hz(),
            allow_spectators: kind.allows_spectators(),
            broadcast_on_every_action: true,
        }
    }
}
