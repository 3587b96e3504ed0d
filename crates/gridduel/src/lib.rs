//! # Gridduel
//!
//! Real-time two-player tic-tac-toe over WebSockets.
//!
//! The server pairs two browsers in a room, keeps the authoritative board,
//! validates every move, and pushes the result to both sides. Rooms are
//! created by the first `join` naming them and disappear when the last
//! participant disconnects.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gridduel::prelude::*;
//!
//! # async fn run() -> Result<(), GridduelError> {
//! let server = GridduelServer::builder()
//!     .bind("0.0.0.0:3000")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::GridduelError;
pub use server::{GridduelServer, GridduelServerBuilder};

/// Everything needed to run a server or speak its protocol.
pub mod prelude {
    pub use crate::{GridduelError, GridduelServer, GridduelServerBuilder};
    pub use gridduel_protocol::{
        ClientMessage, Codec, EndReason, Grid, JsonCodec, Marker, RoomId,
        ServerMessage,
    };
    pub use gridduel_room::{RoomError, RoomRegistry};
}
