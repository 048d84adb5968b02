//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.

use rally_proto::{MoveDirection, PlayerId};

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Challenge a peer.
    Challenge {
        /// Peer to challenge.
        target: PlayerId,
    },

    /// Move the paddle one step.
    Move {
        /// Paddle direction.
        direction: MoveDirection,
    },

    /// Reconnect now.
    Retry,
}
