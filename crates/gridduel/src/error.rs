//! Unified error type for the Gridduel server.

use gridduel_protocol::ProtocolError;
use gridduel_room::{IllegalMove, RoomError};
use gridduel_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum GridduelError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (full, already seated, unknown room).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// A move the room refused to apply.
    #[error(transparent)]
    IllegalMove(#[from] IllegalMove),
}
