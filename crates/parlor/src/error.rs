//! Unified error type for the parlor server.

use parlor_protocol::ProtocolError;
use parlor_room::RoomError;
use parlor_session::SessionError;

use crate::transport::TransportError;

/// Top-level error wrapping all layer-specific errors.
///
/// `#[from]` on each variant gives the `?` operator automatic
/// conversions from the sub-crate errors.
#[derive(Debug, thiserror::Error)]
pub enum ParlorError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Room(#[from] RoomError),
}
