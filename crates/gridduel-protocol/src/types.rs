//! Core protocol types for Gridduel's wire format.
//!
//! Every type in this module travels "on the wire": it is serialized to a
//! JSON text frame, sent over the socket, and parsed on the other side by
//! the browser client. Field names are therefore part of the public
//! contract (`roomId`, `index`, `symbol`, `board`, `nextTurn`).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ProtocolError;

/// Number of cells on the board (3 × 3).
pub const CELL_COUNT: usize = 9;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Identifier of a room (one isolated two-player game).
///
/// Clients may pick their own ids (so two friends can meet in `"kitchen"`)
/// or leave it to the server, which generates one. `#[serde(transparent)]`
/// keeps it a plain JSON string on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Wraps a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the empty identifier, which clients send when
    /// they want the server to pick one.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for RoomId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Board types
// ---------------------------------------------------------------------------

/// The symbol a participant places on the board.
///
/// The first participant seated in a room plays `X` and always moves
/// first; the second plays `O`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Marker {
    X,
    O,
}

impl Marker {
    /// Returns the other side's marker.
    pub fn opponent(self) -> Self {
        match self {
            Self::X => Self::O,
            Self::O => Self::X,
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => f.write_str("X"),
            Self::O => f.write_str("O"),
        }
    }
}

/// The 9-cell board, indexed row-major from the top-left corner:
///
/// ```text
///  0 | 1 | 2
///  3 | 4 | 5
///  6 | 7 | 8
/// ```
///
/// On the wire this is a 9-element array of `null`, `"X"` or `"O"`.
/// A fixed-size array makes "always exactly 9 cells" a type-level fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid([Option<Marker>; CELL_COUNT]);

impl Grid {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a board from explicit cell contents.
    pub fn from_cells(cells: [Option<Marker>; CELL_COUNT]) -> Self {
        Self(cells)
    }

    /// Returns all cells in index order.
    pub fn cells(&self) -> &[Option<Marker>; CELL_COUNT] {
        &self.0
    }

    /// Returns the marker at `index`, or `None` if the cell is empty or
    /// off the board.
    pub fn get(&self, index: usize) -> Option<Marker> {
        self.0.get(index).copied().flatten()
    }

    /// Returns `true` if `index` is on the board and the cell is empty.
    pub fn is_vacant(&self, index: usize) -> bool {
        matches!(self.0.get(index), Some(None))
    }

    /// Writes `marker` into an empty cell.
    ///
    /// Cells only go empty → marker; returns `false` (and leaves the board
    /// untouched) if the cell is occupied or off the board.
    pub fn place(&mut self, index: usize, marker: Marker) -> bool {
        match self.0.get_mut(index) {
            Some(cell) if cell.is_none() => {
                *cell = Some(marker);
                true
            }
            _ => false,
        }
    }

    /// Empties every cell.
    pub fn clear(&mut self) {
        self.0 = [None; CELL_COUNT];
    }

    /// Returns `true` if no marker has been placed.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }
}

// ---------------------------------------------------------------------------
// Inbound messages
// ---------------------------------------------------------------------------

/// Messages a browser sends to the server.
///
/// `#[serde(tag = "type")]` gives the flat shape the client uses:
/// `{ "type": "move", "roomId": "r1", "index": 4 }`. Unknown fields are
/// ignored, an unknown `type` fails to decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    /// "Seat me in this room", or in a fresh room when `roomId` is absent
    /// or empty.
    Join {
        #[serde(default, rename = "roomId")]
        room_id: Option<RoomId>,
    },

    /// "Put my marker on cell `index` in room `roomId`."
    Move {
        #[serde(rename = "roomId")]
        room_id: RoomId,
        index: usize,
    },
}

impl ClientMessage {
    /// Checks rules that serde can't express.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidMessage`] for a move addressing a
    /// cell outside the board.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        match self {
            Self::Move { index, .. } if *index >= CELL_COUNT => {
                Err(ProtocolError::InvalidMessage(format!(
                    "cell index {index} is outside the board (0-{})",
                    CELL_COUNT - 1
                )))
            }
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Outbound messages
// ---------------------------------------------------------------------------

/// Why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndReason {
    /// A participant completed a line.
    Win,
    /// The board filled up with no line.
    Draw,
    /// The opponent's connection went away.
    Disconnect,
}

/// Messages the server sends to browsers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    /// Unicast to a participant right after they are seated.
    Init {
        symbol: Marker,
        board: Grid,
        #[serde(rename = "roomId")]
        room_id: RoomId,
    },

    /// Broadcast when the second participant is seated.
    Start { message: String },

    /// Broadcast after a legal move that did not end the game.
    Update {
        board: Grid,
        #[serde(rename = "nextTurn")]
        next_turn: Marker,
    },

    /// Broadcast after a win, a draw, or the opponent disconnecting. The
    /// room resets right after, ready for a rematch.
    End {
        reason: EndReason,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        winner: Option<Marker>,
        message: String,
    },

    /// Unicast to a rejected joiner.
    Error { message: String },
}

impl ServerMessage {
    /// The game-start notice.
    pub fn start() -> Self {
        Self::Start {
            message: "Game Start! Player X goes first.".to_owned(),
        }
    }

    /// A win for `winner`.
    pub fn won(winner: Marker) -> Self {
        Self::End {
            reason: EndReason::Win,
            winner: Some(winner),
            message: format!("Player {winner} wins!"),
        }
    }

    /// A full board with no line.
    pub fn draw() -> Self {
        Self::End {
            reason: EndReason::Draw,
            winner: None,
            message: "It's a draw!".to_owned(),
        }
    }

    /// The opponent left mid-room.
    pub fn opponent_disconnected() -> Self {
        Self::End {
            reason: EndReason::Disconnect,
            winner: None,
            message: "Player disconnected. Game over.".to_owned(),
        }
    }

    /// An error notice for a single recipient.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
