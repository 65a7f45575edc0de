//! Wire protocol for the parlor server.
//!
//! This crate defines the language clients and server speak:
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`PlayerId`],
//!   [`Identity`]) — the structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages are
//!   converted to and from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while doing so.
//!
//! The protocol layer sits between the transport (raw bytes) and the room
//! layer (authoritative state). It knows message shapes, not rooms or
//! connections.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientMessage, Identity, LeaderboardEntry, PlayerId, RoomKey, ServerMessage,
};
