//! Pong on an 800×600 field at 30 ticks per second.
//!
//! Seats map to paddle sides by join order (seat 0 = left). Two quirks
//! are deliberate: the ready signal is a bare counter, not a set of
//! identities, and the paddle position is taken from the client verbatim
//! with no server-side clamp. Both are called out as trust-boundary gaps
//! in DESIGN.md.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::GameEvent;

pub const FIELD_WIDTH: f32 = 800.0;
pub const FIELD_HEIGHT: f32 = 600.0;
pub const PADDLE_HEIGHT: f32 = 100.0;
pub const PADDLE_WIDTH: f32 = 10.0;
/// Distance from each goal line to the paddle face.
pub const PADDLE_INSET: f32 = 20.0;
pub const BALL_RADIUS: f32 = 8.0;
/// Per-axis serve speed; each axis gets a random sign.
pub const SERVE_SPEED: f32 = 5.0;
/// Spin added per unit of contact offset from the paddle center.
const SPIN_FACTOR: f32 = 0.08;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Which paddle a seat controls; seats beyond the second are
    /// spectators and control nothing.
    pub fn from_seat(seat: usize) -> Option<Self> {
        match seat {
            0 => Some(Self::Left),
            1 => Some(Self::Right),
            _ => None,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    /// Top edge of the paddle, client-supplied while in progress.
    pub y: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PongState {
    pub ball: Ball,
    /// Indexed left, right.
    pub paddles: [Paddle; 2],
    /// Goals scored, indexed left, right. Monotonically non-decreasing.
    pub scores: [u32; 2],
    /// Count of ready signals received. Deliberately not keyed per
    /// identity: two signals start the match wherever they come from.
    pub ready: u32,
    pub in_progress: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PongAction {
    Ready,
    Paddle { y: f32 },
}

impl PongState {
    pub fn new<R: Rng>(rng: &mut R) -> Self {
        let paddle = Paddle {
            y: (FIELD_HEIGHT - PADDLE_HEIGHT) / 2.0,
            height: PADDLE_HEIGHT,
        };
        Self {
            ball: serve_ball(rng),
            paddles: [paddle.clone(), paddle],
            scores: [0, 0],
            ready: 0,
            in_progress: false,
        }
    }

    pub fn apply(&mut self, seat: usize, action: PongAction) -> Vec<GameEvent> {
        match action {
            PongAction::Ready => self.signal_ready(),
            PongAction::Paddle { y } => {
                if let Some(side) = Side::from_seat(seat) {
                    self.move_paddle(side, y);
                }
                Vec::new()
            }
        }
    }

    /// Counts a ready signal; the match starts when the count reaches two.
    pub fn signal_ready(&mut self) -> Vec<GameEvent> {
        self.ready += 1;
        if self.ready == 2 {
            self.in_progress = true;
            vec![GameEvent::Started]
        } else {
            Vec::new()
        }
    }

    /// Sets a paddle's offset directly from the client value. Ignored
    /// until the match is in progress. No bounds clamp (see the module
    /// docs).
    pub fn move_paddle(&mut self, side: Side, y: f32) {
        if self.in_progress {
            self.paddles[side.index()].y = y;
        }
    }

    /// Advances the ball, reflecting off walls and paddles, and scoring
    /// on either goal line.
    pub fn tick<R: Rng>(&mut self, rng: &mut R) -> Vec<GameEvent> {
        if !self.in_progress {
            return Vec::new();
        }

        let ball = &mut self.ball;
        ball.x += ball.vx;
        ball.y += ball.vy;

        // Top and bottom walls flip the vertical velocity.
        if ball.y - ball.radius <= 0.0 && ball.vy < 0.0 {
            ball.vy = -ball.vy;
        }
        if ball.y + ball.radius >= FIELD_HEIGHT && ball.vy > 0.0 {
            ball.vy = -ball.vy;
        }

        // Paddle contact, left then right. Reflection adds spin
        // proportional to the contact offset from the paddle center.
        let left_face = PADDLE_INSET + PADDLE_WIDTH;
        let left = &self.paddles[Side::Left.index()];
        if ball.vx < 0.0
            && ball.x - ball.radius <= left_face
            && ball.y >= left.y
            && ball.y <= left.y + left.height
        {
            ball.vx = -ball.vx;
            ball.vy += (ball.y - (left.y + left.height / 2.0)) * SPIN_FACTOR;
        }

        let right_face = FIELD_WIDTH - PADDLE_INSET - PADDLE_WIDTH;
        let right = &self.paddles[Side::Right.index()];
        if ball.vx > 0.0
            && ball.x + ball.radius >= right_face
            && ball.y >= right.y
            && ball.y <= right.y + right.height
        {
            ball.vx = -ball.vx;
            ball.vy += (ball.y - (right.y + right.height / 2.0)) * SPIN_FACTOR;
        }

        // Goal lines: score and re-serve from the center.
        if ball.x < 0.0 {
            self.scores[Side::Right.index()] += 1;
            self.ball = serve_ball(rng);
        } else if ball.x > FIELD_WIDTH {
            self.scores[Side::Left.index()] += 1;
            self.ball = serve_ball(rng);
        }

        Vec::new()
    }
}

/// A centered ball with ±[`SERVE_SPEED`] on each axis, signs random.
fn serve_ball<R: Rng>(rng: &mut R) -> Ball {
    let sign = |rng: &mut R| if rng.random_bool(0.5) { 1.0 } else { -1.0 };
    Ball {
        x: FIELD_WIDTH / 2.0,
        y: FIELD_HEIGHT / 2.0,
        vx: SERVE_SPEED * sign(rng),
        vy: SERVE_SPEED * sign(rng),
        radius: BALL_RADIUS,
    }
}
