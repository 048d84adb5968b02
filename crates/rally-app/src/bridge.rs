//! Session-to-Application translation layer.
//!
//! The [`Bridge`] wraps the [`rally_client::Session`] and adapts it to the
//! application lifecycle.
//!
//! # Responsibilities
//!
//! - Converts [`crate::AppAction`] intents into session events.
//! - Accumulates outgoing [`Envelope`]s and channel commands for the driver to
//!   execute in the next I/O cycle.
//! - Interprets session results and converts them back into
//!   [`crate::AppEvent`]s to update the UI; one `SessionChanged` per batch.
//! - Emits session diagnostics through `tracing`.

use rally_client::{
    LinkConfig, LogLevel, Session, SessionAction, SessionError, SessionEvent, SessionView,
};
use rally_core::Timestamp;
use rally_proto::Envelope;

use crate::{AppAction, AppEvent};

/// Channel operation requested by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkCommand {
    /// Open a channel.
    Connect,
    /// Close the current channel.
    Disconnect {
        /// Reason for closing.
        reason: String,
    },
}

/// Bridge between App and session protocol logic.
///
/// Generic over the instant type to support both production and simulation.
#[derive(Debug)]
pub struct Bridge<I: Timestamp> {
    session: Session<I>,
    outgoing: Vec<Envelope>,
    link_commands: Vec<LinkCommand>,
}

impl<I: Timestamp> Bridge<I> {
    /// Create a new Bridge around a fresh session.
    pub fn new(config: LinkConfig) -> Self {
        Self { session: Session::new(config), outgoing: Vec::new(), link_commands: Vec::new() }
    }

    /// The wrapped session.
    pub fn session(&self) -> &Session<I> {
        &self.session
    }

    /// Current session view.
    pub fn view(&self) -> SessionView {
        self.session.view()
    }

    /// Start the session.
    pub fn start(&mut self) -> Vec<AppEvent> {
        let result = self.session.handle(SessionEvent::Start);
        self.handle_session_result(result)
    }

    /// Process an App action and return resulting App events.
    pub fn process_app_action(&mut self, action: AppAction) -> Vec<AppEvent> {
        let event = match action {
            AppAction::Challenge { target } => SessionEvent::Challenge { target },
            AppAction::Move { direction } => SessionEvent::Move { direction },
            AppAction::Retry => SessionEvent::Retry,
            AppAction::Render | AppAction::Quit => return vec![],
        };

        let result = self.session.handle(event);
        self.handle_session_result(result)
    }

    /// Channel opened.
    pub fn handle_opened(&mut self, now: I) -> Vec<AppEvent> {
        let result = self.session.handle(SessionEvent::Opened { now });
        self.handle_session_result(result)
    }

    /// Connection attempt failed.
    pub fn handle_connect_failed(&mut self, now: I, reason: String) -> Vec<AppEvent> {
        let result = self.session.handle(SessionEvent::ConnectFailed { now, reason });
        self.handle_session_result(result)
    }

    /// Handle a frame from the server.
    pub fn handle_frame(&mut self, bytes: Vec<u8>) -> Vec<AppEvent> {
        let result = self.session.handle(SessionEvent::FrameReceived(bytes));
        self.handle_session_result(result)
    }

    /// Channel closed by the server or the network.
    pub fn handle_closed(&mut self, now: I, reason: String) -> Vec<AppEvent> {
        let result = self.session.handle(SessionEvent::Closed { now, reason });
        self.handle_session_result(result)
    }

    /// Process a time tick.
    pub fn handle_tick(&mut self, now: I) -> Vec<AppEvent> {
        let result = self.session.handle(SessionEvent::Tick { now });
        self.handle_session_result(result)
    }

    /// Dispose of the session.
    pub fn dispose(&mut self) -> Vec<AppEvent> {
        let actions = self.session.dispose();
        self.process_session_actions(actions)
    }

    /// Take pending outgoing envelopes.
    pub fn take_outgoing(&mut self) -> Vec<Envelope> {
        std::mem::take(&mut self.outgoing)
    }

    /// Take pending channel commands.
    pub fn take_link_commands(&mut self) -> Vec<LinkCommand> {
        std::mem::take(&mut self.link_commands)
    }

    fn handle_session_result(
        &mut self,
        result: Result<Vec<SessionAction>, SessionError>,
    ) -> Vec<AppEvent> {
        match result {
            Ok(actions) => self.process_session_actions(actions),
            Err(e) => {
                tracing::debug!(error = %e, "intent rejected");
                vec![AppEvent::Error { message: e.to_string() }]
            },
        }
    }

    fn process_session_actions(&mut self, actions: Vec<SessionAction>) -> Vec<AppEvent> {
        let mut changed = false;

        for action in actions {
            match action {
                SessionAction::Send(envelope) => self.outgoing.push(envelope),
                SessionAction::Connect => self.link_commands.push(LinkCommand::Connect),
                SessionAction::Disconnect { reason } => {
                    self.link_commands.push(LinkCommand::Disconnect { reason });
                },
                SessionAction::ViewChanged => changed = true,
                SessionAction::Log { level, message } => match level {
                    LogLevel::Debug => tracing::debug!("{message}"),
                    LogLevel::Info => tracing::info!("{message}"),
                    LogLevel::Warn => tracing::warn!("{message}"),
                },
            }
        }

        if changed { vec![AppEvent::SessionChanged(self.session.view())] } else { vec![] }
    }
}
