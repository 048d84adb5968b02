//! Link error types.

use std::time::Duration;

use thiserror::Error;

use crate::link::LinkState;

/// Errors raised by the [`crate::Link`] state machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// Operation not valid in the current state.
    #[error("invalid link transition: cannot {operation} from {state:?}")]
    InvalidState {
        /// State when the operation was attempted.
        state: LinkState,
        /// Operation that was attempted.
        operation: &'static str,
    },

    /// Channel opened but the server never sent `welcome`.
    #[error("no welcome after {elapsed:?}")]
    WelcomeTimeout {
        /// Time spent waiting.
        elapsed: Duration,
    },

    /// Reconnect budget exhausted.
    #[error("gave up after {attempts} reconnect attempts: {reason}")]
    Exhausted {
        /// Attempts made since the last established session.
        attempts: u32,
        /// Reason for the last loss.
        reason: String,
    },
}

impl LinkError {
    /// Returns true if retrying the connection may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::WelcomeTimeout { .. })
    }
}
