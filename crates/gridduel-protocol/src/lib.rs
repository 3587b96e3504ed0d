//! Wire protocol for Gridduel.
//!
//! This crate defines the messages that browsers and the server exchange:
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`Grid`],
//!   [`Marker`], [`RoomId`]): the structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages
//!   are converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and the room
//! layer (game state). It doesn't know about connections or rooms;
//! it only knows the shape of each message kind.
//!
//! ```text
//! Transport (bytes) → Protocol (ClientMessage) → Room (grid, turn)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{Codec, decode_client_message};
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    CELL_COUNT, ClientMessage, EndReason, Grid, Marker, RoomId,
    ServerMessage,
};
