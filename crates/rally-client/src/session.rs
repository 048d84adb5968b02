//! Session state machine.
//!
//! The `Session` exclusively owns the local player id, the roster, the current
//! snapshot and the phase. Inbound envelopes are applied strictly in arrival
//! order against the phase table below; anything outside the table is logged
//! and dropped without touching state.
//!
//! ```text
//! Connecting --welcome--> Lobby --start--> InMatch
//!                          ^  |             |  ^
//!                          |  players       |  gameState
//!                          +---<--gameOver--+
//!
//! any live phase --closed--> Reconnecting --tick--> Connecting
//!                      \--(budget spent)--> Disconnected --retry--> Connecting
//! dispose() from anywhere --> Ended
//! ```

use rally_core::{Link, LinkAction, LinkConfig, LinkState, Timestamp};
use rally_proto::{Envelope, GameSnapshot, MessageKind, MoveDirection, PlayerId, ProtocolError};

use crate::{
    error::SessionError,
    event::{LogLevel, SessionAction, SessionEvent},
    view::{SessionPhase, SessionView},
};

/// Session state machine.
#[derive(Debug, Clone)]
pub struct Session<I: Timestamp> {
    phase: SessionPhase,
    /// Assigned at `welcome`, valid for the current connection only.
    player_id: Option<PlayerId>,
    roster: Vec<PlayerId>,
    /// `Some` only while `InMatch`.
    snapshot: Option<GameSnapshot>,
    link: Link<I>,
}

impl<I: Timestamp> Session<I> {
    /// Create a session in [`SessionPhase::Connecting`]. Nothing happens until
    /// [`SessionEvent::Start`].
    pub fn new(config: LinkConfig) -> Self {
        Self {
            phase: SessionPhase::Connecting,
            player_id: None,
            roster: Vec::new(),
            snapshot: None,
            link: Link::new(config),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    /// Local player id, once welcomed.
    pub fn player_id(&self) -> Option<&PlayerId> {
        self.player_id.as_ref()
    }

    /// Roster as last announced.
    pub fn roster(&self) -> &[PlayerId] {
        &self.roster
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Option<&GameSnapshot> {
        self.snapshot.as_ref()
    }

    /// Channel lifecycle state.
    pub fn link_state(&self) -> LinkState {
        self.link.state()
    }

    /// Snapshot of everything the outer layers may read.
    pub fn view(&self) -> SessionView {
        SessionView {
            phase: self.phase.clone(),
            player_id: self.player_id.clone(),
            roster: self.roster.clone(),
            snapshot: self.snapshot,
        }
    }

    /// Process an event and return resulting actions.
    ///
    /// # Errors
    ///
    /// - `SessionError::InvalidPhase` for a challenge outside the lobby, a move
    ///   outside a match, or a retry while connected
    /// - `SessionError::SelfChallenge` for a challenge aimed at the local
    ///   player
    /// - `SessionError::Link` if the channel lifecycle is driven out of order
    pub fn handle(&mut self, event: SessionEvent<I>) -> Result<Vec<SessionAction>, SessionError> {
        if self.phase == SessionPhase::Ended {
            return Ok(vec![]);
        }

        match event {
            SessionEvent::Start => Ok(self.link.start()?.into_iter().map(link_action).collect()),
            SessionEvent::Opened { now } => self.handle_opened(now),
            SessionEvent::ConnectFailed { now, reason } | SessionEvent::Closed { now, reason } => {
                Ok(self.handle_lost(now, reason))
            },
            SessionEvent::FrameReceived(bytes) => Ok(self.handle_frame(&bytes)),
            SessionEvent::EnvelopeReceived(envelope) => Ok(self.handle_envelope(envelope)),
            SessionEvent::Tick { now } => Ok(self.handle_tick(now)),
            SessionEvent::Challenge { target } => self.handle_challenge(target),
            SessionEvent::Move { direction } => self.handle_move(direction),
            SessionEvent::Retry => self.handle_retry(),
        }
    }

    /// Tear the session down. Afterwards the phase is `Ended` and every event
    /// is ignored.
    pub fn dispose(&mut self) -> Vec<SessionAction> {
        if self.phase == SessionPhase::Ended {
            return vec![];
        }

        let mut actions: Vec<_> = self.link.shutdown().into_iter().map(link_action).collect();
        self.clear_connection_state();
        self.set_phase(SessionPhase::Ended);
        actions.push(SessionAction::ViewChanged);
        actions
    }

    fn handle_opened(&mut self, now: I) -> Result<Vec<SessionAction>, SessionError> {
        self.link.opened(now)?;

        let mut actions = vec![log(LogLevel::Info, "channel open, waiting for welcome")];
        if self.set_phase(SessionPhase::Connecting) {
            actions.push(SessionAction::ViewChanged);
        }
        Ok(actions)
    }

    fn handle_lost(&mut self, now: I, reason: String) -> Vec<SessionAction> {
        let message = format!("channel lost: {reason}");
        if self.link.lost(now, reason).is_none() {
            return vec![];
        }

        self.clear_connection_state();
        self.sync_link_phase();
        vec![log(LogLevel::Info, message), SessionAction::ViewChanged]
    }

    fn handle_tick(&mut self, now: I) -> Vec<SessionAction> {
        let mut actions = Vec::new();

        for action in self.link.tick(now) {
            match action {
                LinkAction::Connect => {
                    self.set_phase(SessionPhase::Connecting);
                    actions.push(SessionAction::Connect);
                },
                LinkAction::Close { reason } => {
                    actions.push(log(LogLevel::Info, format!("closing channel: {reason}")));
                    self.clear_connection_state();
                    self.sync_link_phase();
                    actions.push(SessionAction::Disconnect { reason });
                },
            }
        }

        if !actions.is_empty() {
            actions.push(SessionAction::ViewChanged);
        }
        actions
    }

    fn handle_frame(&mut self, bytes: &[u8]) -> Vec<SessionAction> {
        match Envelope::decode(bytes) {
            Ok(envelope) => self.handle_envelope(envelope),
            Err(ProtocolError::UnknownType { tag }) => {
                vec![log(LogLevel::Warn, format!("ignoring unknown message type: {tag}"))]
            },
            Err(e) => vec![log(LogLevel::Warn, format!("dropping malformed frame: {e}"))],
        }
    }

    fn handle_envelope(&mut self, envelope: Envelope) -> Vec<SessionAction> {
        match (self.phase.clone(), envelope) {
            (SessionPhase::Connecting, Envelope::Welcome(id))
                if self.link.state() == LinkState::Open =>
            {
                tracing::info!(player = %id, "welcomed");
                self.link.welcomed();
                self.player_id = Some(id);
                self.set_phase(SessionPhase::Lobby);
            },
            (SessionPhase::Lobby, Envelope::Players(ids)) => {
                tracing::debug!(count = ids.len(), "roster replaced");
                self.roster = ids;
            },
            (SessionPhase::Lobby, Envelope::Start) => {
                self.snapshot = None;
                self.set_phase(SessionPhase::InMatch);
            },
            (SessionPhase::InMatch, Envelope::GameState(snapshot)) => {
                self.snapshot = Some(snapshot);
            },
            (SessionPhase::InMatch, Envelope::GameOver) => {
                self.snapshot = None;
                self.set_phase(SessionPhase::Lobby);
            },
            (phase, envelope) => {
                return vec![violation(envelope.kind(), &phase)];
            },
        }

        vec![SessionAction::ViewChanged]
    }

    fn handle_challenge(&mut self, target: PlayerId) -> Result<Vec<SessionAction>, SessionError> {
        if self.phase != SessionPhase::Lobby {
            return Err(SessionError::InvalidPhase { phase: self.phase.clone(), operation: "challenge" });
        }

        if self.player_id.as_ref() == Some(&target) {
            return Err(SessionError::SelfChallenge { target });
        }

        tracing::debug!(%target, "sending challenge");
        Ok(vec![SessionAction::Send(Envelope::Challenge(target))])
    }

    fn handle_move(&mut self, direction: MoveDirection) -> Result<Vec<SessionAction>, SessionError> {
        if self.phase != SessionPhase::InMatch {
            return Err(SessionError::InvalidPhase { phase: self.phase.clone(), operation: "move" });
        }

        Ok(vec![SessionAction::Send(Envelope::Move(direction))])
    }

    fn handle_retry(&mut self) -> Result<Vec<SessionAction>, SessionError> {
        if !matches!(self.phase, SessionPhase::Reconnecting { .. } | SessionPhase::Disconnected { .. })
        {
            return Err(SessionError::InvalidPhase { phase: self.phase.clone(), operation: "retry" });
        }

        let mut actions: Vec<_> = self.link.retry()?.into_iter().map(link_action).collect();
        self.set_phase(SessionPhase::Connecting);
        actions.push(SessionAction::ViewChanged);
        Ok(actions)
    }

    /// Mirror a post-loss link state into the phase.
    fn sync_link_phase(&mut self) {
        match self.link.state() {
            LinkState::Backoff { attempt } => {
                self.set_phase(SessionPhase::Reconnecting { attempt });
            },
            LinkState::Failed => {
                let reason = self.link.failure().map(|e| e.to_string()).unwrap_or_default();
                self.set_phase(SessionPhase::Disconnected { reason });
            },
            LinkState::Idle | LinkState::Connecting | LinkState::Open | LinkState::Closed => {},
        }
    }

    /// Player id, roster and snapshot belong to one connection.
    fn clear_connection_state(&mut self) {
        self.player_id = None;
        self.roster.clear();
        self.snapshot = None;
    }

    /// Returns true if the phase changed.
    fn set_phase(&mut self, phase: SessionPhase) -> bool {
        if self.phase == phase {
            return false;
        }

        tracing::debug!(from = %self.phase, to = %phase, "session phase");
        self.phase = phase;
        true
    }
}

fn link_action(action: LinkAction) -> SessionAction {
    match action {
        LinkAction::Connect => SessionAction::Connect,
        LinkAction::Close { reason } => SessionAction::Disconnect { reason },
    }
}

fn log(level: LogLevel, message: impl Into<String>) -> SessionAction {
    SessionAction::Log { level, message: message.into() }
}

fn violation(kind: MessageKind, phase: &SessionPhase) -> SessionAction {
    log(LogLevel::Warn, format!("protocol violation: {kind} is not valid while {phase}"))
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    fn welcomed(now: Instant) -> Session<Instant> {
        let mut session = Session::new(LinkConfig::default());
        session.handle(SessionEvent::Start).unwrap();
        session.handle(SessionEvent::Opened { now }).unwrap();
        session.handle(SessionEvent::EnvelopeReceived(Envelope::Welcome("alice".into()))).unwrap();
        session
    }

    fn in_match(now: Instant) -> Session<Instant> {
        let mut session = welcomed(now);
        session.handle(SessionEvent::EnvelopeReceived(Envelope::Start)).unwrap();
        session
    }

    fn snapshot() -> GameSnapshot {
        GameSnapshot {
            ball_x: 400.0,
            ball_y: 200.0,
            paddle1_y: 150.0,
            paddle2_y: 150.0,
            paddle_width: 10.0,
            paddle_height: 100.0,
        }
    }

    #[test]
    fn start_requests_connection() {
        let mut session: Session<Instant> = Session::new(LinkConfig::default());
        assert_eq!(session.handle(SessionEvent::Start).unwrap(), vec![SessionAction::Connect]);
        assert_eq!(session.phase(), &SessionPhase::Connecting);
    }

    #[test]
    fn welcome_enters_lobby() {
        let session = welcomed(Instant::now());
        assert_eq!(session.phase(), &SessionPhase::Lobby);
        assert_eq!(session.player_id(), Some(&PlayerId::from("alice")));
        assert_eq!(session.link_state(), LinkState::Open);
    }

    #[test]
    fn welcome_before_channel_open_is_violation() {
        let mut session: Session<Instant> = Session::new(LinkConfig::default());
        session.handle(SessionEvent::Start).unwrap();

        let actions =
            session.handle(SessionEvent::EnvelopeReceived(Envelope::Welcome("alice".into()))).unwrap();
        assert!(matches!(actions.as_slice(), [SessionAction::Log { level: LogLevel::Warn, .. }]));
        assert_eq!(session.player_id(), None);
    }

    #[test]
    fn game_state_in_lobby_is_dropped() {
        let mut session = welcomed(Instant::now());

        let actions =
            session.handle(SessionEvent::EnvelopeReceived(Envelope::GameState(snapshot()))).unwrap();

        assert!(matches!(actions.as_slice(), [SessionAction::Log { level: LogLevel::Warn, .. }]));
        assert_eq!(session.phase(), &SessionPhase::Lobby);
        assert_eq!(session.snapshot(), None);
    }

    #[test]
    fn players_during_match_is_dropped() {
        let mut session = in_match(Instant::now());

        session
            .handle(SessionEvent::EnvelopeReceived(Envelope::Players(vec!["zed".into()])))
            .unwrap();
        assert!(session.roster().is_empty());
        assert_eq!(session.phase(), &SessionPhase::InMatch);
    }

    #[test]
    fn unknown_tag_is_logged_not_fatal() {
        let mut session = welcomed(Instant::now());

        let actions = session
            .handle(SessionEvent::FrameReceived(br#"{"type":"offer","content":{}}"#.to_vec()))
            .unwrap();

        let [SessionAction::Log { level: LogLevel::Warn, message }] = actions.as_slice() else {
            panic!("expected one warning, got {actions:?}");
        };
        assert!(message.contains("offer"));
    }

    #[test]
    fn outbound_kind_received_is_violation() {
        let mut session = welcomed(Instant::now());
        let actions =
            session.handle(SessionEvent::EnvelopeReceived(Envelope::Challenge("bob".into()))).unwrap();
        assert!(matches!(actions.as_slice(), [SessionAction::Log { level: LogLevel::Warn, .. }]));
    }

    #[test]
    fn self_challenge_rejected() {
        let mut session = welcomed(Instant::now());
        let err = session.handle(SessionEvent::Challenge { target: "alice".into() }).unwrap_err();
        assert_eq!(err, SessionError::SelfChallenge { target: "alice".into() });
    }

    #[test]
    fn challenge_sends_envelope() {
        let mut session = welcomed(Instant::now());
        let actions = session.handle(SessionEvent::Challenge { target: "bob".into() }).unwrap();
        assert_eq!(actions, vec![SessionAction::Send(Envelope::Challenge("bob".into()))]);
    }

    #[test]
    fn move_gated_to_match() {
        let mut session = welcomed(Instant::now());
        let err = session.handle(SessionEvent::Move { direction: MoveDirection::Up }).unwrap_err();
        assert!(matches!(err, SessionError::InvalidPhase { operation: "move", .. }));

        session.handle(SessionEvent::EnvelopeReceived(Envelope::Start)).unwrap();
        let actions = session.handle(SessionEvent::Move { direction: MoveDirection::Up }).unwrap();
        assert_eq!(actions, vec![SessionAction::Send(Envelope::Move(MoveDirection::Up))]);
    }

    #[test]
    fn challenge_gated_to_lobby() {
        let mut session = in_match(Instant::now());
        let err = session.handle(SessionEvent::Challenge { target: "bob".into() }).unwrap_err();
        assert!(matches!(err, SessionError::InvalidPhase { operation: "challenge", .. }));
    }

    #[test]
    fn close_clears_connection_state_once() {
        let now = Instant::now();
        let mut session = in_match(now);
        session.handle(SessionEvent::EnvelopeReceived(Envelope::GameState(snapshot()))).unwrap();

        let actions = session.handle(SessionEvent::Closed { now, reason: "reset".into() }).unwrap();
        assert!(actions.contains(&SessionAction::ViewChanged));
        assert_eq!(session.phase(), &SessionPhase::Reconnecting { attempt: 1 });
        assert_eq!(session.player_id(), None);
        assert_eq!(session.snapshot(), None);

        let again = session.handle(SessionEvent::Closed { now, reason: "reset".into() }).unwrap();
        assert!(again.is_empty());
        assert_eq!(session.phase(), &SessionPhase::Reconnecting { attempt: 1 });
    }

    #[test]
    fn reconnect_after_backoff() {
        let now = Instant::now();
        let mut session = welcomed(now);
        session.handle(SessionEvent::Closed { now, reason: "reset".into() }).unwrap();

        assert!(session.handle(SessionEvent::Tick { now }).unwrap().is_empty());

        let later = now + Duration::from_secs(1);
        let actions = session.handle(SessionEvent::Tick { now: later }).unwrap();
        assert_eq!(actions, vec![SessionAction::Connect, SessionAction::ViewChanged]);
        assert_eq!(session.phase(), &SessionPhase::Connecting);
    }

    #[test]
    fn exhausted_reconnects_disconnect() {
        let config = LinkConfig { max_attempts: 1, ..LinkConfig::default() };
        let mut now = Instant::now();
        let mut session: Session<Instant> = Session::new(config);
        session.handle(SessionEvent::Start).unwrap();

        session.handle(SessionEvent::ConnectFailed { now, reason: "refused".into() }).unwrap();
        now += Duration::from_secs(1);
        session.handle(SessionEvent::Tick { now }).unwrap();
        session.handle(SessionEvent::ConnectFailed { now, reason: "refused".into() }).unwrap();

        let SessionPhase::Disconnected { reason } = session.phase() else {
            panic!("expected disconnected, got {:?}", session.phase());
        };
        assert!(reason.contains("refused"));

        let actions = session.handle(SessionEvent::Retry).unwrap();
        assert_eq!(actions, vec![SessionAction::Connect, SessionAction::ViewChanged]);
        assert_eq!(session.phase(), &SessionPhase::Connecting);
    }

    #[test]
    fn retry_while_connected_rejected() {
        let mut session = welcomed(Instant::now());
        let err = session.handle(SessionEvent::Retry).unwrap_err();
        assert!(matches!(err, SessionError::InvalidPhase { operation: "retry", .. }));
    }

    #[test]
    fn missing_welcome_drops_channel() {
        let now = Instant::now();
        let mut session: Session<Instant> = Session::new(LinkConfig::default());
        session.handle(SessionEvent::Start).unwrap();
        session.handle(SessionEvent::Opened { now }).unwrap();

        let actions = session.handle(SessionEvent::Tick { now: now + Duration::from_secs(11) }).unwrap();

        assert!(actions.iter().any(|a| matches!(a, SessionAction::Disconnect { .. })));
        assert_eq!(session.phase(), &SessionPhase::Reconnecting { attempt: 1 });
    }

    #[test]
    fn dispose_is_terminal() {
        let now = Instant::now();
        let mut session = welcomed(now);

        let actions = session.dispose();
        assert!(matches!(actions.first(), Some(SessionAction::Disconnect { .. })));
        assert_eq!(session.phase(), &SessionPhase::Ended);

        let after = session
            .handle(SessionEvent::EnvelopeReceived(Envelope::Players(vec!["bob".into()])))
            .unwrap();
        assert!(after.is_empty());
        assert!(session.roster().is_empty());
        assert!(session.dispose().is_empty());
    }
}
