//! Error types for the protocol layer.
//!
//! Each crate in Gridduel defines its own error enum. When you see a
//! `ProtocolError`, the problem is in the bytes a peer sent (or in
//! serializing what we send), not in networking or room management.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, an unknown `type` tag, missing
    /// required fields, or wrong field types.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message decoded but violates protocol rules, e.g. a move
    /// addressing a cell outside the board.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
