//! Session invariants.
//!
//! Each check looks at one [`SessionSnapshot`]: the phase, identity, roster,
//! lobby cursor and message log the client exposes after a runtime cycle.
//! The simulation driver runs the registry on every render, so a violation
//! is caught at the first frame that would show it.
//!
//! # Usage
//!
//! ```ignore
//! let registry = InvariantRegistry::standard();
//! let snapshot = SessionSnapshot::from_app(&app);
//! registry.check_all(&snapshot)?;
//! ```

mod checks;
mod snapshot;

use std::fmt;

pub use checks::{
    LostChannelClearsState, PlayerIdKnownWhenLive, SelectionInBounds, SelfNeverChallengeable,
    SelfNeverChallenged, SnapshotOnlyInMatch,
};
pub use snapshot::SessionSnapshot;

/// Invariant check result.
pub type InvariantResult = Result<(), Violation>;

/// Identifies a standard invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvariantKind {
    /// See [`SelfNeverChallengeable`].
    SelfNeverChallengeable,
    /// See [`SelfNeverChallenged`].
    SelfNeverChallenged,
    /// See [`SnapshotOnlyInMatch`].
    SnapshotOnlyInMatch,
    /// See [`PlayerIdKnownWhenLive`].
    PlayerIdKnownWhenLive,
    /// See [`SelectionInBounds`].
    SelectionInBounds,
    /// See [`LostChannelClearsState`].
    LostChannelClearsState,
}

impl InvariantKind {
    /// Name used in violation reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SelfNeverChallengeable => "self_never_challengeable",
            Self::SelfNeverChallenged => "self_never_challenged",
            Self::SnapshotOnlyInMatch => "snapshot_only_in_match",
            Self::PlayerIdKnownWhenLive => "player_id_known_when_live",
            Self::SelectionInBounds => "selection_in_bounds",
            Self::LostChannelClearsState => "lost_channel_clears_state",
        }
    }
}

impl fmt::Display for InvariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed check.
#[derive(Debug, Clone)]
pub struct Violation {
    /// Failed invariant.
    pub invariant: InvariantKind,
    /// What the snapshot showed.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// A property of the client that holds after every cycle.
pub trait Invariant: Send + Sync {
    /// Identifier reported in violations.
    fn kind(&self) -> InvariantKind;

    /// Check one snapshot.
    fn check(&self, state: &SessionSnapshot) -> InvariantResult;
}

/// Ordered set of checks run together.
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl Default for InvariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InvariantRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.invariants.iter().map(|inv| inv.kind())).finish()
    }
}

impl InvariantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { invariants: Vec::new() }
    }

    /// Create a registry with every standard invariant.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(SelfNeverChallengeable);
        registry.add(SelfNeverChallenged);
        registry.add(SnapshotOnlyInMatch);
        registry.add(PlayerIdKnownWhenLive);
        registry.add(SelectionInBounds);
        registry.add(LostChannelClearsState);
        registry
    }

    /// Register a check.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Run every check and collect each failure.
    pub fn check_all(&self, state: &SessionSnapshot) -> Result<(), Vec<Violation>> {
        let violations: Vec<_> =
            self.invariants.iter().filter_map(|inv| inv.check(state).err()).collect();

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Like [`Self::check_all`], but panics listing every violation.
    #[allow(clippy::panic, reason = "test assertion helper")]
    pub fn assert_all(&self, state: &SessionSnapshot, context: &str) {
        if let Err(violations) = self.check_all(state) {
            let messages: Vec<_> = violations.iter().map(ToString::to_string).collect();
            panic!(
                "{context}: {} invariant(s) failed\n  {}",
                violations.len(),
                messages.join("\n  ")
            );
        }
    }

    /// Number of registered invariants.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}
