//! Standard invariant checks.
//!
//! These invariants capture behavioral properties that must always hold.
//! They verify WHAT must be true, not specific test scenarios.

use rally_client::SessionPhase;
use rally_proto::Envelope;

use super::{Invariant, InvariantKind, InvariantResult, SessionSnapshot, Violation};

/// The lobby never offers the local player.
///
/// Neither the challengeable list nor the cursor may contain the local id.
pub struct SelfNeverChallengeable;

impl Invariant for SelfNeverChallengeable {
    fn kind(&self) -> InvariantKind {
        InvariantKind::SelfNeverChallengeable
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        let Some(me) = &state.player_id else {
            return Ok(());
        };

        if state.challengeable.contains(me) || state.selected.as_ref() == Some(me) {
            return Err(Violation {
                invariant: self.kind(),
                message: format!(
                    "local player {me} offered: challengeable {:?}, selected {:?}",
                    state.challengeable, state.selected
                ),
            });
        }
        Ok(())
    }
}

/// No challenge ever left the client addressed to whoever was local at the
/// time.
pub struct SelfNeverChallenged;

impl Invariant for SelfNeverChallenged {
    fn kind(&self) -> InvariantKind {
        InvariantKind::SelfNeverChallenged
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        for (me, envelope) in &state.sent {
            if let (Some(me), Envelope::Challenge(target)) = (me, envelope)
                && me == target
            {
                return Err(Violation {
                    invariant: self.kind(),
                    message: format!("challenge sent to local player {me}"),
                });
            }
        }
        Ok(())
    }
}

/// A match snapshot exists only while in a match.
pub struct SnapshotOnlyInMatch;

impl Invariant for SnapshotOnlyInMatch {
    fn kind(&self) -> InvariantKind {
        InvariantKind::SnapshotOnlyInMatch
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        if state.has_snapshot && state.phase != SessionPhase::InMatch {
            return Err(Violation {
                invariant: self.kind(),
                message: format!("snapshot held while {}", state.phase),
            });
        }
        Ok(())
    }
}

/// Lobby and match phases are only reachable after a welcome.
pub struct PlayerIdKnownWhenLive;

impl Invariant for PlayerIdKnownWhenLive {
    fn kind(&self) -> InvariantKind {
        InvariantKind::PlayerIdKnownWhenLive
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        let live = matches!(state.phase, SessionPhase::Lobby | SessionPhase::InMatch);
        if live != state.player_id.is_some() {
            return Err(Violation {
                invariant: self.kind(),
                message: format!("phase {} with player id {:?}", state.phase, state.player_id),
            });
        }
        Ok(())
    }
}

/// The cursor points into the challengeable list whenever it is non-empty.
pub struct SelectionInBounds;

impl Invariant for SelectionInBounds {
    fn kind(&self) -> InvariantKind {
        InvariantKind::SelectionInBounds
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        let consistent = match &state.selected {
            Some(selected) => state.challengeable.contains(selected),
            None => state.challengeable.is_empty(),
        };

        if !consistent {
            return Err(Violation {
                invariant: self.kind(),
                message: format!(
                    "selected {:?} outside challengeable {:?}",
                    state.selected, state.challengeable
                ),
            });
        }
        Ok(())
    }
}

/// Nothing learned on a connection survives losing it.
pub struct LostChannelClearsState;

impl Invariant for LostChannelClearsState {
    fn kind(&self) -> InvariantKind {
        InvariantKind::LostChannelClearsState
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        let offline = matches!(
            state.phase,
            SessionPhase::Reconnecting { .. } | SessionPhase::Disconnected { .. } | SessionPhase::Ended
        );

        if offline && (state.player_id.is_some() || !state.roster.is_empty() || state.has_snapshot) {
            return Err(Violation {
                invariant: self.kind(),
                message: format!(
                    "{} still holds player id {:?}, {} roster entries, snapshot {}",
                    state.phase,
                    state.player_id,
                    state.roster.len(),
                    state.has_snapshot
                ),
            });
        }
        Ok(())
    }
}
