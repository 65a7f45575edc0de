//! Pure rule engines for the parlor games.
//!
//! Each game is a plain state value plus transition functions: apply a
//! seat's action, or advance one tick. Engines know nothing about rooms,
//! connections, or broadcasting — they take a state and an action and
//! return events. That separation is what makes them testable without a
//! server.
//!
//! The [`GameState`] / [`GameAction`] tagged unions give the room layer a
//! uniform surface over all four games; nothing above this crate matches
//! on a specific game's internals.
//!
//! Randomness (food placement, piece draws, serve direction) is always
//! passed in by the caller, so tests can seed it and replay transitions
//! deterministically.

mod pong;
mod snake;
mod tetris;
mod tictactoe;

use rand::Rng;
use serde::{Deserialize, Serialize};

pub use pong::{
    Ball, Paddle, PongAction, PongState, Side, BALL_RADIUS, FIELD_HEIGHT,
    FIELD_WIDTH, PADDLE_HEIGHT, SERVE_SPEED,
};
pub use snake::{
    Cell, Direction, SnakeAction, SnakeState, SNAKE_GRID_HEIGHT,
    SNAKE_GRID_WIDTH,
};
pub use tetris::{
    clear_lines, rotate_cw, TetrisAction, TetrisState, BOARD_HEIGHT,
    BOARD_WIDTH, LINE_SCORES, PIECE_COUNT,
};
pub use tictactoe::{evaluate_board, Mark, RoundOutcome, TicTacToeAction, TicTacToeState};

// ---------------------------------------------------------------------------
// GameKind
// ---------------------------------------------------------------------------

/// The four games a room can host.
///
/// Serialized in `snake_case` so the wire names (`"tic_tac_toe"`,
/// `"snake"`, ...) match what clients send when targeting a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    TicTacToe,
    Snake,
    Tetris,
    Pong,
}

impl GameKind {
    /// Number of acting seats. Tic-tac-toe and pong are strictly
    /// two-seat games; snake and tetris rooms share one board that any
    /// member may drive.
    pub fn seat_capacity(self) -> usize {
        match self {
            Self::TicTacToe | Self::Pong => 2,
            Self::Snake | Self::Tetris => 8,
        }
    }

    /// Seats required before the game is considered started.
    pub fn seat_quota(self) -> usize {
        match self {
            Self::TicTacToe | Self::Pong => 2,
            Self::Snake | Self::Tetris => 1,
        }
    }

    /// Tick rate driving the game's timer, in Hz. 0 = event-driven.
    pub fn tick_rate_hz(self) -> u32 {
        match self {
            Self::TicTacToe => 0,
            Self::Tetris => 2,
            Self::Snake => 8,
            Self::Pong => 30,
        }
    }

    /// Whether joiners beyond the seat capacity may watch.
    pub fn allows_spectators(self) -> bool {
        matches!(self, Self::Pong)
    }
}

impl std::fmt::Display for GameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TicTacToe => write!(f, "tic_tac_toe"),
            Self::Snake => write!(f, "snake"),
            Self::Tetris => write!(f, "tetris"),
            Self::Pong => write!(f, "pong"),
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Terminal scores produced by a finished game.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// One match-outcome value per seat (tic-tac-toe: 1 / 0, or 0.5 each
    /// on a draw).
    PerSeat(Vec<(usize, f64)>),
    /// A single board score credited to every seated member (snake,
    /// tetris).
    Shared(f64),
}

/// Events derived from a state transition, beyond the state change itself.
///
/// The room layer turns these into broadcasts and result-recorder calls.
/// Note that state updates are NOT events: the room broadcasts the full
/// state after every handled action regardless of what this returns.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// The seat quota was met and play has begun (pong's ready exchange).
    Started,
    /// The game reached a terminal state with the given scores.
    GameOver(Outcome),
}

// ---------------------------------------------------------------------------
// GameState / GameAction — the tagged unions the room layer dispatches on
// ---------------------------------------------------------------------------

/// Authoritative state of one room's game, one variant per [`GameKind`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum GameState {
    TicTacToe(TicTacToeState),
    Snake(SnakeState),
    Tetris(TetrisState),
    Pong(PongState),
}

/// A validated-shape client intent, one variant per [`GameKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameAction {
    TicTacToe(TicTacToeAction),
    Snake(SnakeAction),
    Tetris(TetrisAction),
    Pong(PongAction),
}

impl GameState {
    /// Kind-specific initial state. Also the restart state: restarts
    /// replace the value wholesale, they never merge.
    pub fn new<R: Rng>(kind: GameKind, rng: &mut R) -> Self {
        match kind {
            GameKind::TicTacToe => Self::TicTacToe(TicTacToeState::new()),
            GameKind::Snake => Self::Snake(SnakeState::new(rng)),
            GameKind::Tetris => Self::Tetris(TetrisState::new(rng)),
            GameKind::Pong => Self::Pong(PongState::new(rng)),
        }
    }

    pub fn kind(&self) -> GameKind {
        match self {
            Self::TicTacToe(_) => GameKind::TicTacToe,
            Self::Snake(_) => GameKind::Snake,
            Self::Tetris(_) => GameKind::Tetris,
            Self::Pong(_) => GameKind::Pong,
        }
    }

    /// Applies a seat's action. Illegal or mismatched actions are silent
    /// no-ops returning no events.
    pub fn apply<R: Rng>(
        &mut self,
        seat: usize,
        action: GameAction,
        rng: &mut R,
    ) -> Vec<GameEvent> {
        match (self, action) {
            (Self::TicTacToe(s), GameAction::TicTacToe(a)) => s.apply(seat, a),
            (Self::Snake(s), GameAction::Snake(a)) => s.apply(a),
            (Self::Tetris(s), GameAction::Tetris(a)) => s.apply(a, rng),
            (Self::Pong(s), GameAction::Pong(a)) => s.apply(seat, a),
            // Action shaped for a different game: drop it.
            _ => Vec::new(),
        }
    }

    /// Advances the game's timer-driven motion (gravity, ball, snake
    /// movement). No-op for event-driven games.
    pub fn tick<R: Rng>(&mut self, rng: &mut R) -> Vec<GameEvent> {
        match self {
            Self::TicTacToe(_) => Vec::new(),
            Self::Snake(s) => s.tick(rng),
            Self::Tetris(s) => s.tick(rng),
            Self::Pong(s) => s.tick(rng),
        }
    }

    /// Whether the state is terminal. Terminal states accept no further
    /// mutating actions.
    pub fn is_over(&self) -> bool {
        match self {
            Self::TicTacToe(s) => s.outcome.is_some(),
            Self::Snake(s) => s.game_over,
            Self::Tetris(s) => s.game_over,
            // Pong has no terminal state: play continues until restart.
            Self::Pong(_) => false,
        }
    }
}

impl GameAction {
    /// The game this action is shaped for, used to reject cross-game
    /// payloads before they reach a room.
    pub fn kind(&self) -> GameKind {
        match self {
            Self::TicTacToe(_) => GameKind::TicTacToe,
            Self::Snake(_) => GameKind::Snake,
            Self::Tetris(_) => GameKind::Tetris,
            Self::Pong(_) => GameKind::Pong,
        }
    }
}
