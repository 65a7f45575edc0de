//! Tic-tac-toe: two seats, strict turn order, terminal on win or draw.

use serde::{Deserialize, Serialize};

use crate::{GameEvent, Outcome};

/// A player's symbol. Seat 0 plays X and always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mark {
    X,
    O,
}

impl Mark {
    fn for_seat(seat: usize) -> Self {
        if seat == 0 { Self::X } else { Self::O }
    }
}

/// How a finished round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundOutcome {
    Won(Mark),
    Draw,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicTacToeState {
    /// Row-major 3×3 grid.
    pub board: [[Option<Mark>; 3]; 3],
    /// Seat index whose turn it is.
    pub turn: usize,
    /// Set exactly once; the state is terminal afterwards.
    pub outcome: Option<RoundOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicTacToeAction {
    Move { row: usize, col: usize },
}

impl TicTacToeState {
    pub fn new() -> Self {
        Self {
            board: [[None; 3]; 3],
            turn: 0,
            outcome: None,
        }
    }

    /// Applies a move for `seat`. Out-of-range cells, occupied cells,
    /// out-of-turn moves, and moves after the game ended are all silent
    /// no-ops.
    pub fn apply(&mut self, seat: usize, action: TicTacToeAction) -> Vec<GameEvent> {
        let TicTacToeAction::Move { row, col } = action;

        if self.outcome.is_some() || row >= 3 || col >= 3 {
            return Vec::new();
        }
        if seat != self.turn || self.board[row][col].is_some() {
            return Vec::new();
        }

        let mark = Mark::for_seat(seat);
        self.board[row][col] = Some(mark);

        match evaluate_board(&self.board) {
            Some(RoundOutcome::Won(winner)) => {
                self.outcome = Some(RoundOutcome::Won(winner));
                vec![GameEvent::GameOver(Outcome::PerSeat(vec![
                    (seat, 1.0),
                    (1 - seat, 0.0),
                ]))]
            }
            Some(RoundOutcome::Draw) => {
                self.outcome = Some(RoundOutcome::Draw);
                vec![GameEvent::GameOver(Outcome::PerSeat(vec![
                    (0, 0.5),
                    (1, 0.5),
                ]))]
            }
            None => {
                self.turn = 1 - self.turn;
                Vec::new()
            }
        }
    }
}

impl Default for TicTacToeState {
    fn default() -> Self {
        Self::new()
    }
}

/// Evaluates a board: a win if any row, column, or diagonal is uniform and
/// non-empty, a draw if all nine cells are filled, otherwise still open.
pub fn evaluate_board(board: &[[Option<Mark>; 3]; 3]) -> Option<RoundOutcome> {
    let lines: [[(usize, usize); 3]; 8] = [
        [(0, 0), (0, 1), (0, 2)],
        [(1, 0), (1, 1), (1, 2)],
        [(2, 0), (2, 1), (2, 2)],
        [(0, 0), (1, 0), (2, 0)],
        [(0, 1), (1, 1), (2, 1)],
        [(0, 2), (1, 2), (2, 2)],
        [(0, 0), (1, 1), (2, 2)],
        [(0, 2), (1, 1), (2, 0)],
    ];

    for line in lines {
        let [a, b, c] = line.map(|(r, cl)| board[r][cl]);
        if let Some(mark) = a {
            if b == Some(mark) && c == Some(mark) {
                return Some(RoundOutcome::Won(mark));
            }
        }
    }

    let full = board
        .iter()
        .all(|row| row.iter().all(|cell| cell.is_some()));
    if full {
        Some(RoundOutcome::Draw)
    } else {
        None
    }
}
