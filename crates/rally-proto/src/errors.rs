//! Protocol error types.

use thiserror::Error;

use crate::MessageKind;

/// Convenience alias for protocol results.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while encoding or decoding envelopes.
///
/// Every variant is recoverable: the frame that produced it is dropped and the
/// channel stays open.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Frame is not a well-formed JSON object.
    #[error("malformed frame: {0}")]
    Json(String),

    /// Frame is a JSON object without a `type` tag.
    #[error("frame has no type tag")]
    MissingType,

    /// Frame carries a tag outside the known set.
    #[error("unknown message type: {tag}")]
    UnknownType {
        /// The unrecognized tag as it appeared on the wire.
        tag: String,
    },

    /// Tag is known but the content does not match its payload shape.
    #[error("invalid {kind} content: {reason}")]
    InvalidContent {
        /// Tag whose payload failed to decode.
        kind: MessageKind,
        /// Decoder message.
        reason: String,
    },

    /// Frame exceeds [`crate::MAX_FRAME_SIZE`].
    #[error("frame too large: {size} bytes (max {max})")]
    FrameTooLarge {
        /// Size of the rejected frame.
        size: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Envelope could not be serialized.
    #[error("encode failed: {0}")]
    Encode(String),
}

impl ProtocolError {
    /// Returns true if the frame was well-formed but used an unrecognized tag.
    ///
    /// Unknown tags are the protocol's extension point and are reported as
    /// diagnostics rather than decode failures.
    pub fn is_unknown_type(&self) -> bool {
        matches!(self, Self::UnknownType { .. })
    }
}
