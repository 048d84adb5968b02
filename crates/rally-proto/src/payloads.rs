//! Envelope payload types.
//!
//! Each type here is the `content` of exactly one (or, for [`PlayerId`], two)
//! envelope tags. Payloads are plain values: they are replaced wholesale on
//! every update, never patched.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Player identifier assigned by the server at welcome time.
///
/// Opaque to the client. Unique per connection and immutable for the
/// connection's lifetime; a reconnect yields a fresh one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Wrap a server-assigned identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier as it appears on the wire.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One authoritative instant of the remote simulation.
///
/// Coordinates are in court units (800x400 reference surface, origin top-left).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Ball centre, horizontal.
    #[serde(rename = "BallX")]
    pub ball_x: f64,
    /// Ball centre, vertical.
    #[serde(rename = "BallY")]
    pub ball_y: f64,
    /// Top edge of the left paddle.
    #[serde(rename = "Paddle1Y")]
    pub paddle1_y: f64,
    /// Top edge of the right paddle.
    #[serde(rename = "Paddle2Y")]
    pub paddle2_y: f64,
    /// Paddle width shared by both paddles.
    #[serde(rename = "PaddleWidth")]
    pub paddle_width: f64,
    /// Paddle height shared by both paddles.
    #[serde(rename = "PaddleHeight")]
    pub paddle_height: f64,
}

/// Direction carried by a `move` envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    /// Paddle up.
    Up,
    /// Paddle down.
    Down,
}

impl MoveDirection {
    /// Wire value (`"up"` or `"down"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl fmt::Display for MoveDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_uses_server_field_names() {
        let json = r#"{"BallX":400,"BallY":200,"Paddle1Y":150,"Paddle2Y":160,"PaddleWidth":10,"PaddleHeight":100}"#;
        let snapshot: GameSnapshot = serde_json::from_str(json).unwrap();

        assert_eq!(snapshot.ball_x, 400.0);
        assert_eq!(snapshot.ball_y, 200.0);
        assert_eq!(snapshot.paddle1_y, 150.0);
        assert_eq!(snapshot.paddle2_y, 160.0);
        assert_eq!(snapshot.paddle_width, 10.0);
        assert_eq!(snapshot.paddle_height, 100.0);
    }

    #[test]
    fn snapshot_ignores_extra_fields() {
        let json = r#"{"BallX":1,"BallY":2,"Paddle1Y":3,"Paddle2Y":4,"PaddleWidth":5,"PaddleHeight":6,"Score1":3}"#;
        assert!(serde_json::from_str::<GameSnapshot>(json).is_ok());
    }

    #[test]
    fn player_id_is_a_bare_string() {
        let id = PlayerId::new("alice");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""alice""#);
        assert_eq!(id.to_string(), "alice");
    }

    #[test]
    fn move_direction_is_lowercase() {
        assert_eq!(serde_json::to_string(&MoveDirection::Up).unwrap(), r#""up""#);
        assert_eq!(
            serde_json::from_str::<MoveDirection>(r#""down""#).unwrap(),
            MoveDirection::Down
        );
        assert!(serde_json::from_str::<MoveDirection>(r#""left""#).is_err());
    }
}
