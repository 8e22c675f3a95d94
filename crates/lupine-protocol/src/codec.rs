//! Codec trait and implementations for serializing/deserializing messages.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! Transports that deliver notices as JSON, or routers that receive commands
//! as JSON, go through a [`Codec`] so the format can be swapped without
//! touching the game.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because codecs are stored inside long-lived
/// table tasks and sinks.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use lupine_protocol::{Codec, Command, GroupId, JsonCodec, PlayerId, Verb};
///
/// let codec = JsonCodec;
/// let cmd = Command {
///     actor: PlayerId(7),
///     group: GroupId(1),
///     verb: Verb::Vote,
///     argument: "3".into(),
/// };
///
/// let bytes = codec.encode(&cmd).unwrap();
/// let decoded: Command = codec.decode(&bytes).unwrap();
/// assert_eq!(cmd, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{Command, GroupId, PlayerId, Verb};

    #[test]
    fn test_json_codec_decodes_command_from_client_json() {
        let raw = br#"{"actor":42,"group":9,"verb":"wolf-kill","argument":"3"}"#;
        let cmd: Command = JsonCodec.decode(raw).unwrap();
        assert_eq!(cmd.actor, PlayerId(42));
        assert_eq!(cmd.group, GroupId(9));
        assert_eq!(cmd.verb, Verb::WolfKill);
        assert_eq!(cmd.argument, "3");
    }

    #[test]
    fn test_json_codec_rejects_unknown_verb() {
        let raw = br#"{"actor":42,"group":9,"verb":"fly","argument":""}"#;
        let result: Result<Command, _> = JsonCodec.decode(raw);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_json_codec_rejects_truncated_input() {
        let result: Result<Command, _> = JsonCodec.decode(br#"{"actor":"#);
        assert!(result.is_err());
    }
}
