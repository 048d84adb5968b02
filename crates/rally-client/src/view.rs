//! Session phases and the read-only view handed to other layers.

use std::{collections::HashSet, fmt};

use rally_proto::{GameSnapshot, PlayerId};

/// Session phase. Exactly one is active at a time and it alone decides which
/// envelopes are meaningful.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    /// Waiting for the channel or for the server's `welcome`.
    Connecting,
    /// Welcomed; browsing peers.
    Lobby,
    /// A match is running.
    InMatch,
    /// Channel lost, waiting to reconnect.
    Reconnecting {
        /// Reconnect attempt being waited for (1-based).
        attempt: u32,
    },
    /// Reconnect budget exhausted. Only a manual retry leaves this phase.
    Disconnected {
        /// Why the session gave up.
        reason: String,
    },
    /// Session disposed locally. Terminal.
    Ended,
}

impl SessionPhase {
    /// Short name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Lobby => "lobby",
            Self::InMatch => "in match",
            Self::Reconnecting { .. } => "reconnecting",
            Self::Disconnected { .. } => "disconnected",
            Self::Ended => "ended",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reconnecting { attempt } => write!(f, "reconnecting (attempt {attempt})"),
            Self::Disconnected { reason } => write!(f, "disconnected: {reason}"),
            other => f.write_str(other.name()),
        }
    }
}

/// Immutable snapshot of session state.
///
/// Produced by [`crate::Session::view`] after every change. Holders never
/// mutate the session through it.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    /// Current phase.
    pub phase: SessionPhase,
    /// Local id, once welcomed on the current connection.
    pub player_id: Option<PlayerId>,
    /// Everyone connected, as last announced by the server.
    pub roster: Vec<PlayerId>,
    /// Latest snapshot. Only ever `Some` in a match.
    pub snapshot: Option<GameSnapshot>,
}

impl SessionView {
    /// Roster entries that may be challenged: everyone except the local
    /// player, in roster order, without duplicates.
    pub fn challengeable(&self) -> Vec<PlayerId> {
        let mut seen = HashSet::new();
        self.roster
            .iter()
            .filter(|id| self.player_id.as_ref() != Some(*id))
            .filter(|id| seen.insert(*id))
            .cloned()
            .collect()
    }
}

impl Default for SessionView {
    fn default() -> Self {
        Self { phase: SessionPhase::Connecting, player_id: None, roster: Vec::new(), snapshot: None }
    }
}
