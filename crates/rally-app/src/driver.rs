//! I/O seam between the runtime and a front-end.
//!
//! A front-end supplies input, the channel, a clock and a way to draw. The
//! generic [`crate::Runtime`] owns everything else, so the terminal client
//! and the simulation share one loop.

use std::future::Future;

use rally_core::Timestamp;
use rally_proto::Envelope;

use crate::{App, AppEvent};

/// Something the channel delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// One inbound frame, undecoded.
    Frame(Vec<u8>),
    /// Channel ended. Delivered once per channel, after all of its frames.
    Closed {
        /// Close reason.
        reason: String,
    },
}

/// Everything the [`Runtime`](crate::Runtime) needs from its host.
///
/// # Implementations
///
/// - **TUI**: crossterm for terminal events, tokio-tungstenite for the channel
/// - **Simulation**: scripted input and an in-memory channel
pub trait Driver: Send {
    /// Failure of the host's own I/O.
    type Error: std::error::Error + Send + 'static;

    /// Clock type; virtual in simulation.
    type Instant: Timestamp;

    /// Next input event, or `None` if nothing arrived within one poll.
    fn poll_event(&mut self) -> impl Future<Output = Result<Option<AppEvent>, Self::Error>> + Send;

    /// Queue an envelope for the server. Fire-and-forget.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no channel or the queue is full.
    fn send(&mut self, envelope: Envelope) -> Result<(), Self::Error>;

    /// Next channel event if one is ready. Never blocks.
    ///
    /// Yields `None` once the channel is gone and its `Closed` has been
    /// returned, or after [`Driver::disconnect`].
    fn recv(&mut self) -> Option<ChannelEvent>;

    /// Open a channel to the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel cannot be established. The runtime
    /// treats this as a failed attempt, not a fatal error.
    fn connect(&mut self, url: &str) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Close the current channel. No channel event is returned afterwards.
    fn disconnect(&mut self);

    /// Whether a channel exists whose events have not all been returned.
    fn is_connected(&self) -> bool;

    /// Current time instant.
    fn now(&self) -> Self::Instant;

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;

    /// Stop the driver and clean up resources.
    fn stop(&mut self);
}
