//! Snake on a fixed 40×30 grid, driven by the room's tick timer.
//!
//! Clients only steer; movement happens on ticks. The heading a client
//! sets is provisional until a tick commits it, which is what makes the
//! reversal check robust: you cannot turn 180° relative to the direction
//! the snake actually moved last, no matter how many inputs you queue
//! between ticks.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{GameEvent, Outcome};

pub const SNAKE_GRID_WIDTH: i32 = 40;
pub const SNAKE_GRID_HEIGHT: i32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnakeState {
    /// Occupied cells, head first.
    pub body: Vec<Cell>,
    /// Heading requested by the most recent accepted steer.
    pub heading: Direction,
    /// Heading actually applied by the last tick. Reversal rejection is
    /// checked against this, not against `heading`.
    pub committed: Direction,
    pub food: Cell,
    pub score: u32,
    pub game_over: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnakeAction {
    SetDirection { direction: Direction },
}

impl SnakeState {
    /// Single-cell snake centered on the grid, heading right, food at a
    /// random free cell.
    pub fn new<R: Rng>(rng: &mut R) -> Self {
        let center = Cell {
            x: SNAKE_GRID_WIDTH / 2,
            y: SNAKE_GRID_HEIGHT / 2,
        };
        let body = vec![center];
        let food = random_free_cell(&body, rng).unwrap_or(center);
        Self {
            body,
            heading: Direction::Right,
            committed: Direction::Right,
            food,
            score: 0,
            game_over: false,
        }
    }

    pub fn apply(&mut self, action: SnakeAction) -> Vec<GameEvent> {
        let SnakeAction::SetDirection { direction } = action;
        self.set_direction(direction);
        Vec::new()
    }

    /// Steers the snake. Rejected silently after game over, or when the
    /// new heading would reverse straight into the body.
    pub fn set_direction(&mut self, direction: Direction) {
        if self.game_over || direction == self.committed.opposite() {
            return;
        }
        self.heading = direction;
    }

    /// Advances the snake one cell along its heading.
    ///
    /// The current tail cell is a legal destination: it will be vacated
    /// this tick unless food is eaten, so moving onto it is safe.
    pub fn tick<R: Rng>(&mut self, rng: &mut R) -> Vec<GameEvent> {
        if self.game_over {
            return Vec::new();
        }

        self.committed = self.heading;
        let (dx, dy) = self.committed.delta();
        let head = Cell {
            x: self.body[0].x + dx,
            y: self.body[0].y + dy,
        };

        let out_of_bounds = head.x < 0
            || head.x >= SNAKE_GRID_WIDTH
            || head.y < 0
            || head.y >= SNAKE_GRID_HEIGHT;
        let hits_self = self.body[..self.body.len() - 1].contains(&head);

        if out_of_bounds || hits_self {
            self.game_over = true;
            return vec![GameEvent::GameOver(Outcome::Shared(f64::from(
                self.score,
            )))];
        }

        self.body.insert(0, head);
        if head == self.food {
            self.score += 1;
            if let Some(food) = random_free_cell(&self.body, rng) {
                self.food = food;
            }
            // Tail stays: eating grows the snake by one.
        } else {
            self.body.pop();
        }

        Vec::new()
    }
}

/// Draws cells uniformly at random until one not occupied by the snake
/// comes up. Returns `None` when the snake covers the whole grid.
fn random_free_cell<R: Rng>(body: &[Cell], rng: &mut R) -> Option<Cell> {
    if body.len() as i32 >= SNAKE_GRID_WIDTH * SNAKE_GRID_HEIGHT {
        return None;
    }
    loop {
        let cell = Cell {
            x: rng.random_range(0..SNAKE_GRID_WIDTH),
            y: rng.random_range(0..SNAKE_GRID_HEIGHT),
        };
        if !body.contains(&cell) {
            return Some(cell);
        }
    }
}
