//! Room registry: lazily creates rooms and routes lookups to them.
//!
//! Rooms are addressed by `(GameKind, RoomKey)` — the same client-chosen
//! key names independent rooms under different games. A room is created
//! on the first join to its key and lives for the rest of the process;
//! an emptied room keeps its state and waits for the next joiner.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use parlor_games::GameKind;
use parlor_protocol::RoomKey;
use parlor_score::ResultRecorder;

use crate::room::spawn_room;
use crate::{RoomConfig, RoomHandle};

/// Mailbox depth for each room actor; senders queue when it fills.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// All live rooms, shared across connection handlers.
///
/// The mutex only covers the handle maps — never a room's own state, and
/// never anything async. Lookups clone a handle and drop the lock before
/// any await. Keys are nested (game, then room key) so `get`, which runs
/// on every action, can look up by `&str` without allocating.
pub struct RoomRegistry {
    rooms: Mutex<HashMap<GameKind, HashMap<RoomKey, RoomHandle>>>,
    recorder: Arc<dyn ResultRecorder>,
}

impl RoomRegistry {
    pub fn new(recorder: Arc<dyn ResultRecorder>) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            recorder,
        }
    }

    /// Returns the room at `(game, key)`, spawning it on first use.
    pub fn get_or_create(&self, game: GameKind, key: &str) -> RoomHandle {
        let mut rooms = self.rooms.lock().expect("room registry lock poisoned");
        rooms
            .entry(game)
            .or_default()
            .entry(key.to_owned())
            .or_insert_with(|| {
                tracing::info!(%game, key, "creating room");
                spawn_room(
                    game,
                    key.to_owned(),
                    RoomConfig::for_kind(game),
                    Arc::clone(&self.recorder),
                    DEFAULT_CHANNEL_SIZE,
                )
            })
            .clone()
    }

    /// Returns the room at `(game, key)` if it already exists.
    pub fn get(&self, game: GameKind, key: &str) -> Option<RoomHandle> {
        let rooms = self.rooms.lock().expect("room registry lock poisoned");
        rooms.get(&game).and_then(|by_key| by_key.get(key)).cloned()
    }

    /// Number of rooms ever created (rooms are never evicted).
    pub fn room_count(&self) -> usize {
        let rooms = self.rooms.lock().expect("room registry lock poisoned");
        rooms.values().map(HashMap::len).sum()
    }
}
