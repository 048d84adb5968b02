//! Application state machine.
//!
//! This module defines the [`App`] state machine, which manages the interactive
//! state of the application completely decoupled from I/O and protocol
//! mechanics.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Holds the latest [`SessionView`]; never mutates session state itself.
//! - Tracks the lobby cursor over the challengeable roster.
//! - Asks for a redraw on terminal resize.
//! - Keeps a transient status message for the status bar.

use rally_client::{SessionPhase, SessionView};
use rally_proto::PlayerId;

use crate::{
    AppAction, AppEvent,
    input::{self, Intent},
    state::Selection,
};

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable in simulation.
#[derive(Debug, Clone)]
pub struct App {
    /// Server endpoint, for display.
    server_url: String,
    /// Latest session view.
    view: SessionView,
    /// Peers that may be challenged, derived from `view`.
    challengeable: Vec<PlayerId>,
    /// Lobby cursor into `challengeable`.
    selection: Selection,
    /// Transient status message. `None` if no message.
    status_message: Option<String>,
}

impl App {
    /// Create a new App for the given server endpoint.
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            view: SessionView::default(),
            challengeable: Vec::new(),
            selection: Selection::default(),
            status_message: None,
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Tick => vec![],
            AppEvent::Resize(..) => vec![AppAction::Render],
            AppEvent::Key(key) => match input::intent(&self.view.phase, key) {
                Some(intent) => self.apply_intent(intent),
                None => vec![],
            },
            AppEvent::SessionChanged(view) => {
                self.apply_view(view);
                vec![AppAction::Render]
            },
            AppEvent::Error { message } => {
                self.status_message = Some(format!("Error: {message}"));
                vec![AppAction::Render]
            },
            AppEvent::Status { message } => {
                self.status_message = Some(message);
                vec![AppAction::Render]
            },
        }
    }

    fn apply_intent(&mut self, intent: Intent) -> Vec<AppAction> {
        match intent {
            Intent::Quit => vec![AppAction::Quit],
            Intent::SelectPrevious => {
                self.selection.previous();
                vec![AppAction::Render]
            },
            Intent::SelectNext => {
                self.selection.next(self.challengeable.len());
                vec![AppAction::Render]
            },
            Intent::ChallengeSelected => match self.selected_target().cloned() {
                Some(target) => {
                    self.status_message = Some(format!("Challenging {target}..."));
                    vec![AppAction::Challenge { target }, AppAction::Render]
                },
                None => vec![],
            },
            Intent::Move(direction) => vec![AppAction::Move { direction }],
            Intent::Retry => {
                self.status_message = Some("Reconnecting...".to_string());
                vec![AppAction::Retry, AppAction::Render]
            },
        }
    }

    fn apply_view(&mut self, view: SessionView) {
        match (&self.view.phase, &view.phase) {
            (SessionPhase::Lobby, SessionPhase::InMatch) => {
                self.status_message = Some("Match started".to_string());
            },
            (SessionPhase::InMatch, SessionPhase::Lobby) => {
                self.status_message = Some("Match over".to_string());
            },
            (_, SessionPhase::Connecting | SessionPhase::Reconnecting { .. })
                if self.view.phase != view.phase =>
            {
                self.status_message = None;
            },
            _ => {},
        }

        self.challengeable = view.challengeable();
        self.selection.clamp(self.challengeable.len());
        self.view = view;
    }

    /// Latest session view.
    pub fn view(&self) -> &SessionView {
        &self.view
    }

    /// Current session phase.
    pub fn phase(&self) -> &SessionPhase {
        &self.view.phase
    }

    /// Peers offered as challenge targets.
    pub fn challengeable(&self) -> &[PlayerId] {
        &self.challengeable
    }

    /// Lobby cursor position.
    pub fn selected_index(&self) -> usize {
        self.selection.index()
    }

    /// Peer under the lobby cursor. `None` if nobody can be challenged.
    pub fn selected_target(&self) -> Option<&PlayerId> {
        self.selection.get(&self.challengeable)
    }

    /// Server endpoint.
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Transient status message. `None` if no message.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }
}
