//! Session events and actions.

use rally_proto::{Envelope, MoveDirection, PlayerId};

/// Events the caller feeds into the session.
///
/// The caller is responsible for:
/// - Reporting channel lifecycle (opened, failed, closed)
/// - Forwarding frames in transport delivery order
/// - Driving time forward via ticks
/// - Forwarding user intents (challenge, move, retry)
///
/// Generic over `I` (Instant type) so simulation can use a virtual clock.
#[derive(Debug, Clone)]
pub enum SessionEvent<I = std::time::Instant> {
    /// Begin the session: request the first connection.
    Start,

    /// Channel opened.
    Opened {
        /// Current time from the environment.
        now: I,
    },

    /// Connection attempt failed before the channel opened.
    ConnectFailed {
        /// Current time from the environment.
        now: I,
        /// Transport error text.
        reason: String,
    },

    /// Raw frame received from the server.
    FrameReceived(Vec<u8>),

    /// Already-decoded envelope received from the server.
    EnvelopeReceived(Envelope),

    /// Channel closed by the server or the network.
    Closed {
        /// Current time from the environment.
        now: I,
        /// Close reason.
        reason: String,
    },

    /// Time tick for reconnect and welcome deadlines.
    Tick {
        /// Current time from the environment.
        now: I,
    },

    /// User wants to challenge a peer.
    Challenge {
        /// Peer to challenge.
        target: PlayerId,
    },

    /// User pressed a movement key.
    Move {
        /// Paddle direction.
        direction: MoveDirection,
    },

    /// User asked to reconnect now.
    Retry,
}

/// Severity of a [`SessionAction::Log`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Routine transition detail.
    Debug,
    /// Connection lifecycle.
    Info,
    /// Dropped traffic: malformed frames, unknown tags, protocol violations.
    Warn,
}

/// Actions the session produces for the caller to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    /// Send an envelope to the server.
    Send(Envelope),

    /// Open a new channel to the server.
    Connect,

    /// Close the current channel.
    Disconnect {
        /// Reason for closing.
        reason: String,
    },

    /// Session state changed; a fresh [`crate::SessionView`] is available.
    ViewChanged,

    /// Diagnostic for the caller's logger.
    Log {
        /// Severity.
        level: LogLevel,
        /// Log message.
        message: String,
    },
}
