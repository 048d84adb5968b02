//! Tagged envelopes and the JSON codec.
//!
//! Decoding is two-stage: the outer `{type, content}` object is parsed first,
//! then the tag is matched exhaustively and only the content is decoded as
//! that tag's payload. Nothing beyond payload shape is validated here; which
//! envelopes are meaningful when is decided by the session layer.

use std::fmt;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{
    GameSnapshot, MoveDirection, PlayerId,
    errors::{ProtocolError, Result},
};

/// Largest inbound frame accepted by [`Envelope::decode`].
pub const MAX_FRAME_SIZE: usize = 64 * 1024;

/// Which side of the channel produces a message kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Server to client.
    Inbound,
    /// Client to server.
    Outbound,
}

/// The fixed set of envelope tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Server assigns the local player id.
    Welcome,
    /// Server broadcasts the full roster.
    Players,
    /// Match begins.
    Start,
    /// Authoritative snapshot of the running match.
    GameState,
    /// Match ends.
    GameOver,
    /// Local player challenges a peer.
    Challenge,
    /// Local player moves their paddle.
    Move,
}

impl MessageKind {
    /// Every kind, in wire-table order.
    pub const ALL: [MessageKind; 7] = [
        Self::Welcome,
        Self::Players,
        Self::Start,
        Self::GameState,
        Self::GameOver,
        Self::Challenge,
        Self::Move,
    ];

    /// Tag as it appears in the `type` field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::Players => "players",
            Self::Start => "start",
            Self::GameState => "gameState",
            Self::GameOver => "gameOver",
            Self::Challenge => "challenge",
            Self::Move => "move",
        }
    }

    /// Look up a wire tag. `None` for tags outside the known set.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }

    /// Which side of the channel sends this kind.
    pub fn direction(self) -> Direction {
        match self {
            Self::Welcome | Self::Players | Self::Start | Self::GameState | Self::GameOver => {
                Direction::Inbound
            },
            Self::Challenge | Self::Move => Direction::Outbound,
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single protocol message.
///
/// One variant per [`MessageKind`], each carrying exactly the payload shape its
/// tag defines.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// `welcome`: the id the server assigned to this connection.
    Welcome(PlayerId),
    /// `players`: everyone currently connected, replacing the previous roster.
    Players(Vec<PlayerId>),
    /// `start`: a match has begun. Content is ignored.
    Start,
    /// `gameState`: replaces the current snapshot.
    GameState(GameSnapshot),
    /// `gameOver`: the match has ended. Content is ignored.
    GameOver,
    /// `challenge`: ask the server to start a match against a peer.
    Challenge(PlayerId),
    /// `move`: one paddle step.
    Move(MoveDirection),
}

/// Outgoing wire shape. Field order is `type` then `content`.
#[derive(Serialize)]
struct WireOut<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    content: Value,
}

/// Incoming wire shape. Both fields are optional so their absence can be
/// reported precisely.
#[derive(Deserialize)]
struct WireIn {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    content: Value,
}

impl Envelope {
    /// Tag of this envelope.
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Welcome(_) => MessageKind::Welcome,
            Self::Players(_) => MessageKind::Players,
            Self::Start => MessageKind::Start,
            Self::GameState(_) => MessageKind::GameState,
            Self::GameOver => MessageKind::GameOver,
            Self::Challenge(_) => MessageKind::Challenge,
            Self::Move(_) => MessageKind::Move,
        }
    }

    /// Serialize to the text frame sent on the wire.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::Encode` if serialization fails
    pub fn encode(&self) -> Result<String> {
        let content = match self {
            Self::Welcome(id) | Self::Challenge(id) => to_value(id),
            Self::Players(ids) => to_value(ids),
            Self::Start => Ok(Value::Object(Map::new())),
            Self::GameState(snapshot) => to_value(snapshot),
            Self::GameOver => Ok(Value::Null),
            Self::Move(direction) => to_value(direction),
        }?;

        serde_json::to_string(&WireOut { kind: self.kind().as_str(), content })
            .map_err(|e| ProtocolError::Encode(e.to_string()))
    }

    /// Decode a frame received from the transport.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::FrameTooLarge` if the frame exceeds [`MAX_FRAME_SIZE`]
    /// - `ProtocolError::Json` if the frame is not a JSON object
    /// - `ProtocolError::MissingType` if the object has no `type`
    /// - `ProtocolError::UnknownType` if the tag is not recognized
    /// - `ProtocolError::InvalidContent` if the content has the wrong shape
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > MAX_FRAME_SIZE {
            return Err(ProtocolError::FrameTooLarge { size: bytes.len(), max: MAX_FRAME_SIZE });
        }

        let wire: WireIn =
            serde_json::from_slice(bytes).map_err(|e| ProtocolError::Json(e.to_string()))?;
        Self::from_wire(wire)
    }

    /// Decode a text frame. Same rules as [`Envelope::decode`].
    ///
    /// # Errors
    ///
    /// See [`Envelope::decode`].
    pub fn decode_str(text: &str) -> Result<Self> {
        Self::decode(text.as_bytes())
    }

    fn from_wire(wire: WireIn) -> Result<Self> {
        let tag = wire.kind.ok_or(ProtocolError::MissingType)?;
        let kind = MessageKind::from_tag(&tag).ok_or(ProtocolError::UnknownType { tag })?;
        let content = wire.content;

        Ok(match kind {
            MessageKind::Welcome => Self::Welcome(from_value(kind, content)?),
            MessageKind::Players => Self::Players(from_value(kind, content)?),
            MessageKind::Start => Self::Start,
            MessageKind::GameState => Self::GameState(from_value(kind, content)?),
            MessageKind::GameOver => Self::GameOver,
            MessageKind::Challenge => Self::Challenge(from_value(kind, content)?),
            MessageKind::Move => Self::Move(from_value(kind, content)?),
        })
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| ProtocolError::Encode(e.to_string()))
}

fn from_value<T: DeserializeOwned>(kind: MessageKind, content: Value) -> Result<T> {
    serde_json::from_value(content)
        .map_err(|e| ProtocolError::InvalidContent { kind, reason: e.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip_through_lookup() {
        for kind in MessageKind::ALL {
            assert_eq!(MessageKind::from_tag(kind.as_str()), Some(kind));
        }
        assert_eq!(MessageKind::from_tag("GameState"), None);
    }

    #[test]
    fn only_challenge_and_move_are_outbound() {
        let outbound: Vec<_> =
            MessageKind::ALL.into_iter().filter(|k| k.direction() == Direction::Outbound).collect();
        assert_eq!(outbound, vec![MessageKind::Challenge, MessageKind::Move]);
    }

    #[test]
    fn decode_welcome() {
        let envelope = Envelope::decode_str(r#"{"type":"welcome","content":"alice"}"#).unwrap();
        assert_eq!(envelope, Envelope::Welcome("alice".into()));
    }

    #[test]
    fn decode_players() {
        let envelope =
            Envelope::decode_str(r#"{"type":"players","content":["alice","bob"]}"#).unwrap();
        assert_eq!(envelope, Envelope::Players(vec!["alice".into(), "bob".into()]));
    }

    #[test]
    fn start_and_game_over_ignore_content() {
        let inputs = [
            (r#"{"type":"start","content":{}}"#, Envelope::Start),
            (r#"{"type":"start"}"#, Envelope::Start),
            (r#"{"type":"gameOver"}"#, Envelope::GameOver),
            (r#"{"type":"gameOver","content":{"winner":"bob"}}"#, Envelope::GameOver),
        ];
        for (input, expected) in inputs {
            assert_eq!(Envelope::decode_str(input).unwrap(), expected, "input: {input}");
        }
    }

    #[test]
    fn non_json_is_malformed() {
        let err = Envelope::decode(b"\xff\xfe not json").unwrap_err();
        assert!(matches!(err, ProtocolError::Json(_)));
    }

    #[test]
    fn non_object_is_malformed() {
        assert!(matches!(Envelope::decode_str("[1,2]"), Err(ProtocolError::Json(_))));
        assert!(matches!(Envelope::decode_str(r#""welcome""#), Err(ProtocolError::Json(_))));
    }

    #[test]
    fn missing_type_is_reported() {
        let err = Envelope::decode_str(r#"{"content":"alice"}"#).unwrap_err();
        assert_eq!(err, ProtocolError::MissingType);
    }

    #[test]
    fn unknown_type_keeps_tag() {
        let err = Envelope::decode_str(r#"{"type":"offer","content":{"sdp":"..."}}"#).unwrap_err();
        assert_eq!(err, ProtocolError::UnknownType { tag: "offer".into() });
    }

    #[test]
    fn wrong_content_shape_is_invalid_content() {
        let err = Envelope::decode_str(r#"{"type":"players","content":"alice"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidContent { kind: MessageKind::Players, .. }));

        let err = Envelope::decode_str(r#"{"type":"gameState","content":{"BallX":1}}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidContent { kind: MessageKind::GameState, .. }));
    }

    #[test]
    fn oversized_frame_rejected_before_parse() {
        let frame = vec![b' '; MAX_FRAME_SIZE + 1];
        let err = Envelope::decode(&frame).unwrap_err();
        assert_eq!(err, ProtocolError::FrameTooLarge { size: MAX_FRAME_SIZE + 1, max: MAX_FRAME_SIZE });
    }

    #[test]
    fn start_encodes_empty_object() {
        assert_eq!(Envelope::Start.encode().unwrap(), r#"{"type":"start","content":{}}"#);
        assert_eq!(Envelope::GameOver.encode().unwrap(), r#"{"type":"gameOver","content":null}"#);
    }
}
