//! Tetris on the classic 10×20 well.
//!
//! The falling piece is a small boolean matrix anchored by its top-left
//! corner; rows above the well (`row < 0`) are legal while falling, so a
//! freshly spawned piece may overlap the ceiling transiently. Gravity is
//! the room's tick timer issuing `Down` moves through the same pipeline
//! as client input.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{GameEvent, Outcome};

pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;
/// Score per cleared-line count (1..=4), multiplied by the level.
pub const LINE_SCORES: [u32; 4] = [100, 300, 500, 800];
pub const PIECE_COUNT: usize = 7;

/// Spawn anchor: top row, roughly centered.
const SPAWN_ROW: i32 = 0;
const SPAWN_COL: i32 = 3;

type Shape = Vec<Vec<bool>>;

/// The seven tetrominoes: I, O, T, S, Z, J, L.
fn piece_shape(index: usize) -> Shape {
    let rows: &[&[u8]] = match index % PIECE_COUNT {
        0 => &[b"1111"],
        1 => &[b"11", b"11"],
        2 => &[b"010", b"111"],
        3 => &[b"011", b"110"],
        4 => &[b"110", b"011"],
        5 => &[b"100", b"111"],
        _ => &[b"001", b"111"],
    };
    rows.iter()
        .map(|row| row.iter().map(|&c| c == b'1').collect())
        .collect()
}

fn draw_piece<R: Rng>(rng: &mut R) -> Shape {
    piece_shape(rng.random_range(0..PIECE_COUNT))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TetrisState {
    /// Row-major well, `board[0]` is the top row.
    pub board: Vec<Vec<bool>>,
    /// The falling piece and its top-left anchor.
    pub piece: Shape,
    pub row: i32,
    pub col: i32,
    /// Pre-rolled next piece, visible to clients before it activates.
    pub next: Shape,
    pub score: u32,
    pub level: u32,
    pub game_over: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TetrisAction {
    Left,
    Right,
    Down,
    Rotate,
}

impl TetrisState {
    pub fn new<R: Rng>(rng: &mut R) -> Self {
        Self {
            board: vec![vec![false; BOARD_WIDTH]; BOARD_HEIGHT],
            piece: draw_piece(rng),
            row: SPAWN_ROW,
            col: SPAWN_COL,
            next: draw_piece(rng),
            score: 0,
            level: 1,
            game_over: false,
        }
    }

    /// Gravity: one forced `Down` per tick.
    pub fn tick<R: Rng>(&mut self, rng: &mut R) -> Vec<GameEvent> {
        self.apply(TetrisAction::Down, rng)
    }

    pub fn apply<R: Rng>(&mut self, action: TetrisAction, rng: &mut R) -> Vec<GameEvent> {
        if self.game_over {
            return Vec::new();
        }

        match action {
            TetrisAction::Left => {
                if self.fits(&self.piece, self.row, self.col - 1) {
                    self.col -= 1;
                }
                Vec::new()
            }
            TetrisAction::Right => {
                if self.fits(&self.piece, self.row, self.col + 1) {
                    self.col += 1;
                }
                Vec::new()
            }
            TetrisAction::Rotate => {
                let rotated = rotate_cw(&self.piece);
                if self.fits(&rotated, self.row, self.col) {
                    self.piece = rotated;
                }
                Vec::new()
            }
            TetrisAction::Down => {
                if self.fits(&self.piece, self.row + 1, self.col) {
                    self.row += 1;
                    Vec::new()
                } else {
                    self.lock(rng)
                }
            }
        }
    }

    /// True iff every filled cell of `piece` at (`row`, `col`) stays inside
    /// the horizontal bounds, above the floor, and clear of placed blocks.
    /// Rows above the top are allowed.
    fn fits(&self, piece: &Shape, row: i32, col: i32) -> bool {
        can_place(&self.board, piece, row, col)
    }

    /// Freezes the piece into the well, clears completed rows, scores,
    /// and activates the pre-rolled next piece. Sets `game_over` when the
    /// fresh piece cannot spawn.
    fn lock<R: Rng>(&mut self, rng: &mut R) -> Vec<GameEvent> {
        for (r, shape_row) in self.piece.iter().enumerate() {
            for (c, &filled) in shape_row.iter().enumerate() {
                if !filled {
                    continue;
                }
                let board_row = self.row + r as i32;
                let board_col = self.col + c as i32;
                if board_row >= 0 {
                    self.board[board_row as usize][board_col as usize] = true;
                }
            }
        }

        let cleared = clear_lines(&mut self.board);
        if cleared > 0 {
            // Multiplier uses the level in force when the lines cleared;
            // the level itself is recomputed from the new score after.
            self.score += LINE_SCORES[cleared - 1] * self.level;
            self.level = 1 + self.score / 1000;
        }

        self.piece = std::mem::replace(&mut self.next, draw_piece(rng));
        self.row = SPAWN_ROW;
        self.col = SPAWN_COL;

        if !self.fits(&self.piece, self.row, self.col) {
            self.game_over = true;
            return vec![GameEvent::GameOver(Outcome::Shared(f64::from(
                self.score,
            )))];
        }
        Vec::new()
    }
}

/// Placement check against an arbitrary well, exposed for tests.
pub fn can_place(board: &[Vec<bool>], piece: &[Vec<bool>], row: i32, col: i32) -> bool {
    for (r, shape_row) in piece.iter().enumerate() {
        for (c, &filled) in shape_row.iter().enumerate() {
            if !filled {
                continue;
            }
            let board_row = row + r as i32;
            let board_col = col + c as i32;
            if board_col < 0 || board_col >= BOARD_WIDTH as i32 {
                return false;
            }
            if board_row >= BOARD_HEIGHT as i32 {
                return false;
            }
            // Above the top is fine while falling.
            if board_row >= 0 && board[board_row as usize][board_col as usize] {
                return false;
            }
        }
    }
    true
}

/// Removes every complete row, shifting the rows above down and inserting
/// empty rows at the top. Returns how many rows were removed.
pub fn clear_lines(board: &mut Vec<Vec<bool>>) -> usize {
    let before = board.len();
    board.retain(|row| !row.iter().all(|&cell| cell));
    let cleared = before - board.len();
    for _ in 0..cleared {
        board.insert(0, vec![false; BOARD_WIDTH]);
    }
    cleared
}

/// Rotates a shape 90° clockwise: transpose of the rows in reverse order.
pub fn rotate_cw(piece: &[Vec<bool>]) -> Shape {
    let rows = piece.len();
    let cols = piece[0].len();
    (0..cols)
        .map(|c| (0..rows).map(|r| piece[rows - 1 - r][c]).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn state() -> TetrisState {
        TetrisState::new(&mut rng())
    }

    #[test]
    fn test_new_state_spawns_at_anchor_with_next_piece() {
        let s = state();
        assert_eq!((s.row, s.col), (0, 3));
        assert_eq!(s.level, 1);
        assert!(!s.next.is_empty());
        assert!(can_place(&s.board, &s.piece, s.row, s.col));
    }

    #[test]
    fn test_horizontal_moves_respect_walls() {
        let mut s = state();
        let mut r = rng();
        // Push hard left: col bottoms out at 0 and stays there.
        for _ in 0..12 {
            s.apply(TetrisAction::Left, &mut r);
        }
        assert_eq!(s.col, 0);
        // And hard right: the piece's rightmost filled cell touches col 9.
        for _ in 0..15 {
            s.apply(TetrisAction::Right, &mut r);
        }
        let width = s.piece[0].len() as i32;
        assert_eq!(s.col, BOARD_WIDTH as i32 - width);
    }

    #[test]
    fn test_down_falls_until_floor_then_locks() {
        let mut s = state();
        let mut r = rng();
        let height = s.piece.len() as i32;
        let falls = BOARD_HEIGHT as i32 - height; // moves until resting on floor
        for _ in 0..falls {
            assert!(s.apply(TetrisAction::Down, &mut r).is_empty());
        }
        let locked_rows: usize = s.board.iter().flatten().filter(|&&c| c).count();
        assert_eq!(locked_rows, 0, "piece must not lock before the floor");

        s.apply(TetrisAction::Down, &mut r); // lands → locks, next activates
        let locked: usize = s.board.iter().flatten().filter(|&&c| c).count();
        let piece_cells: usize = piece_cell_count(&piece_shape(0)); // all shapes have 4
        assert_eq!(locked, piece_cells);
        assert_eq!((s.row, s.col), (0, 3));
    }

    fn piece_cell_count(shape: &[Vec<bool>]) -> usize {
        shape.iter().flatten().filter(|&&c| c).count()
    }

    #[test]
    fn test_all_shapes_have_four_cells() {
        for i in 0..PIECE_COUNT {
            assert_eq!(piece_cell_count(&piece_shape(i)), 4, "shape {i}");
        }
    }

    #[test]
    fn test_rotation_discarded_when_blocked() {
        let mut s = state();
        s.piece = piece_shape(0); // I piece, 1×4
        s.row = 18;
        s.col = 3;
        // Fill the rows above so the vertical I cannot stand.
        for row in 14..18 {
            s.board[row] = vec![true; BOARD_WIDTH];
        }
        let before = s.piece.clone();
        s.apply(TetrisAction::Rotate, &mut rng());
        assert_eq!(s.piece, before);
    }

    #[test]
    fn test_rotating_twice_equals_180_for_all_shapes() {
        for i in 0..PIECE_COUNT {
            let shape = piece_shape(i);
            let twice = rotate_cw(&rotate_cw(&shape));

            // Direct 180°: reverse rows, then reverse each row.
            let direct: Shape = shape
                .iter()
                .rev()
                .map(|row| row.iter().rev().copied().collect())
                .collect();

            assert_eq!(twice, direct, "shape {i}");
        }
    }

    #[test]
    fn test_clear_lines_removes_exactly_the_full_rows() {
        let mut board = vec![vec![false; BOARD_WIDTH]; BOARD_HEIGHT];
        board[17] = vec![true; BOARD_WIDTH];
        board[19] = vec![true; BOARD_WIDTH];
        // A sentinel partial row between them keeps its relative position.
        board[18][4] = true;

        let cleared = clear_lines(&mut board);
        assert_eq!(cleared, 2);
        assert_eq!(board.len(), BOARD_HEIGHT);
        // The partial row slid to the bottom; everything above is empty.
        assert!(board[19][4]);
        assert_eq!(board[19].iter().filter(|&&c| c).count(), 1);
        assert!(board[..19].iter().all(|row| row.iter().all(|&c| !c)));
    }

    #[test]
    fn test_line_scores_scale_with_level() {
        let mut s = state();
        s.level = 3;
        s.score = 2000;
        // Bottom two rows missing only the cells the O piece will fill.
        s.piece = piece_shape(1); // O, 2×2
        s.row = 18;
        s.col = 4;
        for col in 0..BOARD_WIDTH {
            if col != 4 && col != 5 {
                s.board[18][col] = true;
                s.board[19][col] = true;
            }
        }

        s.apply(TetrisAction::Down, &mut rng()); // blocked → locks, clears 2
        assert_eq!(s.score, 2000 + LINE_SCORES[1] * 3);
        assert_eq!(s.level, 1 + s.score / 1000);
    }

    #[test]
    fn test_single_line_clear_scores_100_times_level() {
        let mut s = state();
        s.piece = piece_shape(0); // I piece fills 4 cells of the bottom row
        s.row = 19;
        s.col = 3;
        for col in 0..BOARD_WIDTH {
            if !(3..7).contains(&col) {
                s.board[19][col] = true;
            }
        }

        s.apply(TetrisAction::Down, &mut rng());
        assert_eq!(s.score, 100);
        assert!(s.board[19].iter().all(|&c| !c), "cleared row must be empty");
        assert!(!s.game_over);
    }

    #[test]
    fn test_spawn_collision_sets_game_over() {
        let mut s = state();
        let mut r = rng();
        s.piece = piece_shape(1); // O
        s.next = piece_shape(1);
        // Stack reaching row 2, with a gap in column 0 so nothing clears.
        // The O locks into rows 0-1 at the spawn column, and the next O
        // cannot spawn on top of it.
        for row in 2..BOARD_HEIGHT {
            for col in 1..BOARD_WIDTH {
                s.board[row][col] = true;
            }
        }
        s.col = 4;
        let events = s.apply(TetrisAction::Down, &mut r);
        assert!(s.game_over);
        assert_eq!(
            events,
            vec![GameEvent::GameOver(Outcome::Shared(f64::from(s.score)))]
        );

        // Terminal: nothing moves any more.
        let col = s.col;
        assert!(s.apply(TetrisAction::Left, &mut r).is_empty());
        assert_eq!(s.col, col);
    }

    #[test]
    fn test_can_place_allows_rows_above_the_top() {
        let board = vec![vec![false; BOARD_WIDTH]; BOARD_HEIGHT];
        let piece = piece_shape(2); // T
        assert!(can_place(&board, &piece, -1, 3));
        assert!(!can_place(&board, &piece, -1, -1));
        assert!(!can_place(&board, &piece, BOARD_HEIGHT as i32 - 1, 3));
    }
}
