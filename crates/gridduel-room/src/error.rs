//! Error types for the room layer.

use gridduel_protocol::{Marker, RoomId};
use gridduel_transport::ConnectionId;

/// Errors returned to a participant trying to join a room.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// Both seats are taken.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// This connection is already seated in the room.
    #[error("{0} already in room {1}")]
    AlreadyInRoom(ConnectionId, RoomId),

    /// A move addressed a room that doesn't exist.
    #[error("room {0} not found")]
    NotFound(RoomId),
}

/// Why a move was ignored.
///
/// Illegal moves are never reported to peers; the handler only logs the
/// reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IllegalMove {
    /// The sender has no seat in the room.
    #[error("sender is not seated in this room")]
    NotSeated,

    /// Only one seat is filled.
    #[error("waiting for an opponent")]
    WaitingForOpponent,

    /// The index is off the board.
    #[error("cell {0} is outside the board")]
    CellOutOfRange(usize),

    /// The cell already holds a marker.
    #[error("cell {0} is occupied")]
    CellOccupied(usize),

    /// It is the other marker's turn.
    #[error("not your turn, {0} moves next")]
    NotYourTurn(Marker),
}
