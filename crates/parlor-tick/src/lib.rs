//! Fixed-timestep tick scheduler for room timers.
//!
//! Snake gravity, tetris gravity, and pong ball motion are all driven by
//! a per-room scheduler. The scheduler never mutates game state itself —
//! it just tells the room actor *when* to enqueue a synthetic tick into
//! the same serialized action stream that client moves flow through.
//!
//! # Event-driven mode
//!
//! When `tick_rate_hz` is 0 (tic-tac-toe), [`TickScheduler::wait_for_tick`]
//! pends forever. That is the correct behavior for turn-based games inside
//! a `tokio::select!` loop: the timer branch simply never fires.
//!
//! # Integration
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = mailbox.recv() => { /* handle command */ }
//!         tick = scheduler.wait_for_tick() => {
//!             let events = game.tick(&mut rng);
//!             /* broadcast */
//!         }
//!     }
//! }
//! ```

use std::time::Duration;

use rand::Rng;
use tokio::time::{self, Instant as TokioInstant};
use tracing::{debug, trace, warn};

/// Configuration for a room's tick scheduler.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Tick rate in Hz. 0 = event-driven (the tick never fires).
    pub tick_rate_hz: u32,
    /// Random jitter (0–max µs) added before the *first* tick so rooms
    /// created in the same instant don't all wake together.
    pub initial_jitter_us: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 0,
            initial_jitter_us: 2_000,
        }
    }
}

impl TickConfig {
    /// Highest rate a room may ask for; anything above is clamped.
    pub const MAX_TICK_RATE_HZ: u32 = 128;

    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self {
            tick_rate_hz,
            ..Default::default()
        }
    }

    fn validated(mut self) -> Self {
        if self.tick_rate_hz > Self::MAX_TICK_RATE_HZ {
            warn!(
                rate = self.tick_rate_hz,
                max = Self::MAX_TICK_RATE_HZ,
                "tick_rate_hz exceeds maximum, clamping"
            );
            self.tick_rate_hz = Self::MAX_TICK_RATE_HZ;
        }
        self
    }

    /// Duration of a single tick, `None` in event-driven mode.
    pub fn tick_duration(&self) -> Option<Duration> {
        if self.tick_rate_hz == 0 {
            None
        } else {
            Some(Duration::from_secs_f64(1.0 / f64::from(self.tick_rate_hz)))
        }
    }
}

/// Information about a fired tick.
#[derive(Debug, Clone)]
pub struct TickInfo {
    /// Monotonically increasing tick number, starting at 1.
    pub tick: u64,
    /// The fixed timestep (`1 / tick_rate`), independent of how late the
    /// tick actually fired.
    pub dt: Duration,
}

/// Fixed-timestep scheduler. One per room actor.
///
/// When a tick fires late (the room spent too long handling commands),
/// missed ticks are skipped and the next deadline is re-anchored to now,
/// so a slow room never enters a catch-up spiral.
pub struct TickScheduler {
    config: TickConfig,
    tick_duration: Option<Duration>,
    tick_count: u64,
    next_tick: Option<TokioInstant>,
    paused: bool,
}

impl TickScheduler {
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();
        let tick_duration = config.tick_duration();

        let next_tick = tick_duration.map(|d| {
            let jitter = if config.initial_jitter_us > 0 {
                let us = rand::rng().random_range(0..config.initial_jitter_us);
                Duration::from_micros(us)
            } else {
                Duration::ZERO
            };
            TokioInstant::now() + d + jitter
        });

        if config.tick_rate_hz == 0 {
            debug!("tick scheduler created in event-driven mode");
        } else {
            debug!(rate_hz = config.tick_rate_hz, "tick scheduler created");
        }

        Self {
            config,
            tick_duration,
            tick_count: 0,
            next_tick,
            paused: false,
        }
    }

    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self::new(TickConfig::with_rate(tick_rate_hz))
    }

    /// Waits until the next tick is due.
    ///
    /// In event-driven mode or while paused this future pends forever;
    /// `tokio::select!` keeps servicing its other branches.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        let (next, tick_dur) = match (self.next_tick, self.tick_duration) {
            (Some(next), Some(dur)) if !self.paused => (next, dur),
            _ => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        };

        time::sleep_until(next).await;

        let now = TokioInstant::now();
        self.tick_count += 1;

        let late_by = now.saturating_duration_since(next);
        if late_by > tick_dur {
            let skipped = late_by.as_nanos() / tick_dur.as_nanos();
            warn!(
                tick = self.tick_count,
                skipped = skipped as u64,
                late_ms = late_by.as_secs_f64() * 1000.0,
                "tick overran its slot, skipping ahead"
            );
            // Re-anchor to now rather than replaying the missed ticks.
            self.next_tick = Some(now + tick_dur);
        } else {
            self.next_tick = Some(next + tick_dur);
        }

        trace!(tick = self.tick_count, "tick fired");

        TickInfo {
            tick: self.tick_count,
            dt: tick_dur,
        }
    }

    /// Pauses the tick loop; `wait_for_tick` pends until [`resume`](Self::resume).
    /// Idempotent. Rooms pause their timers when the game reaches a
    /// terminal state.
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            debug!(tick = self.tick_count, "tick scheduler paused");
        }
    }

    /// Resumes after a pause, re-anchoring the next deadline to now so
    /// the paused interval doesn't burst out as back-to-back ticks.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            if let Some(dur) = self.tick_duration {
                self.next_tick = Some(TokioInstant::now() + dur);
            }
            debug!(tick = self.tick_count, "tick scheduler resumed");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether this scheduler is event-driven (tick rate 0).
    pub fn is_event_driven(&self) -> bool {
        self.tick_duration.is_none()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn tick_rate_hz(&self) -> u32 {
        self.config.tick_rate_hz
    }

    pub fn tick_duration(&self) -> Option<Duration> {
        self.tick_duration
    }
}
