//! Room lifecycle for the parlor server.
//!
//! Each room is a Tokio task (actor model) owning one game's state, its
//! member list, and a timer scheduler. The registry creates rooms lazily
//! and hands out clonable handles.
//!
//! # Key types
//!
//! - [`RoomRegistry`] — lazily creates rooms keyed by `(game, key)`
//! - [`RoomHandle`] — send commands to a running room actor
//! - [`RoomConfig`] — per-game seat and timer settings
//! - [`RoomError`] — join/leave refusals

mod config;
mod error;
mod registry;
mod room;

pub use config::RoomConfig;
pub use error::RoomError;
pub use registry::RoomRegistry;
pub use room::{MemberSender, RoomHandle, RoomInfo};
