//! Deterministic simulation harness for the Rally client.
//!
//! In-memory implementations of the [`rally_core::Environment`] and
//! [`rally_app::Driver`] traits, so the production [`rally_app::Runtime`]
//! runs unchanged against a virtual clock, scripted input and a scripted
//! server channel.
//!
//! # Invariant Testing
//!
//! The `invariants` module provides behavioral testing through invariant
//! checks. Invariants verify WHAT must be true across all execution paths, not
//! specific scenarios. Use [`InvariantRegistry::standard()`] for common
//! App/Session invariants.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod sim_driver;
pub mod sim_env;

pub use invariants::{
    Invariant, InvariantKind, InvariantRegistry, InvariantResult, LostChannelClearsState,
    PlayerIdKnownWhenLive, SelectionInBounds, SelfNeverChallengeable, SelfNeverChallenged,
    SessionSnapshot, SnapshotOnlyInMatch, Violation,
};
pub use sim_driver::{SimDriver, SimDriverError};
pub use sim_env::{SimEnv, SimInstant};
