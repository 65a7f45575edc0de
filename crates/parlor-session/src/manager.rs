//! Tracks which identities currently hold a live connection.
//!
//! One connection per identity: if a player id that is already connected
//! completes a second handshake, the second connection is refused. The
//! manager holds no transport state — it only answers "is this player
//! here right now", so the handler can enforce the single-connection rule
//! and rooms can be told about departures on disconnect.
//!
//! # Concurrency note
//!
//! `SessionManager` is not thread-safe by itself; it is owned behind a
//! single `Mutex` at the server level. Every operation is a short map
//! lookup, so a plain mutex is fine.

use std::collections::HashMap;

use parlor_protocol::{Identity, PlayerId};

use crate::SessionError;

/// One connected player.
#[derive(Debug, Clone)]
pub struct Session {
    pub identity: Identity,
}

impl Session {
    pub fn player_id(&self) -> PlayerId {
        self.identity.player_id
    }
}

/// Registry of live sessions, keyed by player id.
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: HashMap<PlayerId, Session>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly authenticated connection.
    ///
    /// # Errors
    /// [`SessionError::AlreadyConnected`] if the identity already has a
    /// live session.
    pub fn create(&mut self, identity: Identity) -> Result<&Session, SessionError> {
        let player_id = identity.player_id;
        if self.sessions.contains_key(&player_id) {
            return Err(SessionError::AlreadyConnected(player_id));
        }

        self.sessions.insert(player_id, Session { identity });
        tracing::info!(%player_id, recognized = identity.recognized, "session created");

        // Safe: inserted on the line above.
        Ok(self.sessions.get(&player_id).expect("just inserted"))
    }

    /// Removes a player's session when their connection closes.
    ///
    /// # Errors
    /// [`SessionError::NotFound`] if no session exists.
    pub fn disconnect(&mut self, player_id: PlayerId) -> Result<Session, SessionError> {
        let session = self
            .sessions
            .remove(&player_id)
            .ok_or(SessionError::NotFound(player_id))?;
        tracing::info!(%player_id, "session closed");
        Ok(session)
    }

    /// Looks up a live session by player id.
    pub fn get(&self, player_id: &PlayerId) -> Option<&Session> {
        self.sessions.get(player_id)
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
