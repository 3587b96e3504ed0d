//! Room lifecycle and game rules for Gridduel.
//!
//! A room seats at most two participants, owns the shared board, and
//! enforces whose turn it is. The registry creates rooms on demand and
//! drops them once the last participant leaves.
//!
//! # Key types
//!
//! - [`rules`]: pure win/draw detection over a [`Grid`](gridduel_protocol::Grid)
//! - [`Room`]: seats, board, turn order, broadcast fan-out
//! - [`RoomRegistry`]: maps room ids to rooms, cleans up on disconnect
//!
//! Nothing in this crate is thread-safe on its own; the server keeps the
//! registry behind a single lock so every join, move and cleanup runs to
//! completion before the next one starts.

mod error;
mod registry;
mod room;
pub mod rules;

pub use error::{IllegalMove, RoomError};
pub use registry::RoomRegistry;
pub use room::{
    Departure, Joined, MAX_PARTICIPANTS, MoveOutcome, Participant,
    ParticipantSender, Room,
};
