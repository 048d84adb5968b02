//! Session errors.

use rally_core::LinkError;
use rally_proto::PlayerId;
use thiserror::Error;

use crate::SessionPhase;

/// Errors returned by [`crate::Session::handle`].
///
/// Only local intents fail this way. Problems with inbound traffic are
/// reported as log actions and never surface as errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Challenge aimed at the local player.
    #[error("cannot challenge yourself ({target})")]
    SelfChallenge {
        /// The rejected target.
        target: PlayerId,
    },

    /// Intent not valid in the current phase.
    #[error("cannot {operation} while {phase}")]
    InvalidPhase {
        /// Phase when the intent arrived.
        phase: SessionPhase,
        /// The rejected intent.
        operation: &'static str,
    },

    /// Channel lifecycle misuse.
    #[error(transparent)]
    Link(#[from] LinkError),
}
