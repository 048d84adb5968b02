//! Application input events.
//!
//! This module defines [`AppEvent`], the set of inputs that drive the
//! [`crate::App`] state machine.
//!
//! Events originate from two distinct sources:
//! - User interactions (keyboard, resize) and system ticks.
//! - Session notifications translated by the [`crate::Bridge`], and connect
//!   outcomes reported by the [`crate::Runtime`].

use rally_client::SessionView;

use crate::KeyInput;

/// Events processed by the App state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Keyboard input.
    Key(KeyInput),

    /// Periodic tick.
    Tick,

    /// Terminal resize (columns, rows).
    Resize(u16, u16),

    /// Session state changed.
    SessionChanged(SessionView),

    /// A local intent was rejected.
    Error {
        /// Error description.
        message: String,
    },

    /// Informational message for the status bar, such as why the last
    /// connect attempt failed.
    Status {
        /// Message text.
        message: String,
    },
}
