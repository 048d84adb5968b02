//! Observable state snapshots for invariant checking.
//!
//! Snapshots capture the observable state of one client at a point in time.
//! Invariants operate on snapshots rather than live state to ensure
//! consistent, atomic checks.

use rally_app::App;
use rally_client::SessionPhase;
use rally_proto::{Envelope, PlayerId};

/// Snapshot of one client's observable state.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    /// Session phase as shown to the user.
    pub phase: SessionPhase,
    /// Local player id. `None` until welcomed.
    pub player_id: Option<PlayerId>,
    /// Roster as last announced.
    pub roster: Vec<PlayerId>,
    /// Peers the lobby offers.
    pub challengeable: Vec<PlayerId>,
    /// Peer under the lobby cursor.
    pub selected: Option<PlayerId>,
    /// Whether a match snapshot is held.
    pub has_snapshot: bool,
    /// Every envelope sent so far, with the player id current at send time.
    pub sent: Vec<(Option<PlayerId>, Envelope)>,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            phase: SessionPhase::Connecting,
            player_id: None,
            roster: Vec::new(),
            challengeable: Vec::new(),
            selected: None,
            has_snapshot: false,
            sent: Vec::new(),
        }
    }
}

impl SessionSnapshot {
    /// Capture what the App currently shows.
    pub fn from_app(app: &App) -> Self {
        let view = app.view();
        Self {
            phase: view.phase.clone(),
            player_id: view.player_id.clone(),
            roster: view.roster.clone(),
            challengeable: app.challengeable().to_vec(),
            selected: app.selected_target().cloned(),
            has_snapshot: view.snapshot.is_some(),
            sent: Vec::new(),
        }
    }

    /// Attach the send history.
    #[must_use]
    pub fn with_sent(mut self, sent: Vec<(Option<PlayerId>, Envelope)>) -> Self {
        self.sent = sent;
        self
    }
}
