//! Result recording and leaderboards.
//!
//! Rooms emit one record per recognized identity when a game reaches a
//! terminal state. Recording is strictly fire-and-forget from the room's
//! point of view: a recorder that drops records must never stall or roll
//! back a broadcast that already went out.
//!
//! The [`ScoreBoard`] here is the in-memory implementation; a persistent
//! store would implement [`ResultRecorder`] the same way and swap in
//! behind the trait.

use std::collections::HashMap;
use std::sync::Mutex;

use parlor_games::GameKind;
use parlor_protocol::{LeaderboardEntry, PlayerId};

/// Sink for terminal game outcomes.
pub trait ResultRecorder: Send + Sync + 'static {
    /// Records one identity's score for one finished game. Must not
    /// block; failures are the implementation's problem, not the room's.
    fn record(&self, player_id: PlayerId, game: GameKind, score: f64);
}

#[derive(Debug, Clone)]
struct ScoreRow {
    player_id: PlayerId,
    score: f64,
}

/// In-memory score store with per-game leaderboards.
///
/// Interior mutability via a plain `Mutex`: every operation is a short,
/// non-async critical section, so sharing an `Arc<ScoreBoard>` across the
/// handler and all room actors is safe and cheap.
#[derive(Debug, Default)]
pub struct ScoreBoard {
    rows: Mutex<HashMap<GameKind, Vec<ScoreRow>>>,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Top `limit` scores for a game, highest first. Equal scores keep
    /// their insertion order.
    pub fn leaderboard(&self, game: GameKind, limit: usize) -> Vec<LeaderboardEntry> {
        let rows = self.rows.lock().expect("scoreboard lock poisoned");
        let mut entries: Vec<&ScoreRow> = rows.get(&game).map(Vec::as_slice).unwrap_or(&[]).iter().collect();
        // Stable sort: ties stay in the order they were recorded.
        entries.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        entries
            .into_iter()
            .take(limit)
            .map(|row| LeaderboardEntry {
                player_id: row.player_id,
                score: row.score,
            })
            .collect()
    }

    /// Total number of recorded results for a game.
    pub fn result_count(&self, game: GameKind) -> usize {
        let rows = self.rows.lock().expect("scoreboard lock poisoned");
        rows.get(&game).map_or(0, Vec::len)
    }
}

impl ResultRecorder for ScoreBoard {
    fn record(&self, player_id: PlayerId, game: GameKind, score: f64) {
        tracing::info!(%player_id, %game, score, "result recorded");
        let mut rows = self.rows.lock().expect("scoreboard lock poisoned");
        rows.entry(game).or_default().push(ScoreRow { player_id, score });
    }
}

/// A recorder that drops everything, for servers that don't keep score
/// and for tests that only care about room behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRecorder;

impl ResultRecorder for NullRecorder {
    fn record(&self, _player_id: PlayerId, _game: GameKind, _score: f64) {}
}
