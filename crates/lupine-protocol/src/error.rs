//! Error types for the protocol layer.
//!
//! Each crate in Lupine defines its own error enum. When you see a
//! `ProtocolError`, the problem is in parsing or serialization, not in the
//! game rules.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The verb is not part of the command vocabulary.
    #[error("unknown verb: {0}")]
    UnknownVerb(String),

    /// The command is structurally invalid (empty line, missing actor, ...).
    #[error("invalid command: {0}")]
    InvalidCommand(String),
}
