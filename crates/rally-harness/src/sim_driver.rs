//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as the terminal driver but for
//! deterministic testing. It implements [`Driver`] so the same
//! [`rally_app::Runtime`] orchestration code runs in both production and
//! simulation. Clones share state, so a test can keep one handle while the
//! runtime owns another.

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use rally_app::{App, AppEvent, ChannelEvent, Driver, KeyInput, RecordingSurface, Shape};
use rally_core::Environment;
use rally_proto::{Envelope, PlayerId};

use crate::{
    invariants::{InvariantRegistry, SessionSnapshot, Violation},
    sim_env::{SimEnv, SimInstant},
};

/// Error type for simulation driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimDriverError(pub String);

impl std::fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimDriverError: {}", self.0)
    }
}

impl std::error::Error for SimDriverError {}

/// Shared state for event injection.
///
/// This allows injection from outside async contexts.
#[derive(Default)]
struct SharedState {
    pending_events: VecDeque<AppEvent>,
    incoming: VecDeque<ChannelEvent>,
    outgoing: Vec<Envelope>,
    /// Every envelope sent, with the local player id at send time.
    sent_log: Vec<(Option<PlayerId>, Envelope)>,
    connected: bool,
    refuse_connects: u32,
    /// Connect attempts that never resolve, taken before refusals.
    stall_connects: u32,
    connects: u32,
    disconnects: u32,
    renders: u32,
    frame: RecordingSurface,
    player_id: Option<PlayerId>,
    violations: Vec<Violation>,
    stopped: bool,
}

/// Simulation driver for deterministic testing.
///
/// Implements [`Driver`] trait so the same [`rally_app::Runtime`]
/// orchestration code runs in both production TUI and simulation tests.
#[derive(Clone)]
pub struct SimDriver {
    env: SimEnv,
    state: Arc<Mutex<SharedState>>,
    invariants: Option<Arc<InvariantRegistry>>,
}

impl SimDriver {
    /// Create a new simulation driver reading time from `env`.
    pub fn new(env: SimEnv) -> Self {
        Self { env, state: Arc::new(Mutex::new(SharedState::default())), invariants: None }
    }

    /// Enable invariant checking on every render.
    #[must_use]
    pub fn with_invariants(mut self, registry: InvariantRegistry) -> Self {
        self.invariants = Some(Arc::new(registry));
        self
    }

    fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The environment this driver reads time from.
    pub fn env(&self) -> &SimEnv {
        &self.env
    }

    /// Inject an `AppEvent` for processing.
    pub fn inject_event(&self, event: AppEvent) {
        self.lock().pending_events.push_back(event);
    }

    /// Inject a key press.
    pub fn inject_key(&self, key: KeyInput) {
        self.inject_event(AppEvent::Key(key));
    }

    /// Inject a text frame from the server.
    pub fn inject_frame(&self, text: &str) {
        self.lock().incoming.push_back(ChannelEvent::Frame(text.as_bytes().to_vec()));
    }

    /// Inject the server closing the channel.
    pub fn inject_close(&self, reason: &str) {
        self.lock().incoming.push_back(ChannelEvent::Closed { reason: reason.to_string() });
    }

    /// Refuse the next `count` connection attempts.
    pub fn refuse_connects(&self, count: u32) {
        self.lock().refuse_connects = count;
    }

    /// Make the next `count` connection attempts hang forever, like a
    /// blackholed endpoint.
    pub fn stall_connects(&self, count: u32) {
        self.lock().stall_connects = count;
    }

    /// Take all captured outgoing envelopes.
    pub fn take_outgoing(&self) -> Vec<Envelope> {
        std::mem::take(&mut self.lock().outgoing)
    }

    /// Check if there are pending events to process.
    pub fn has_pending(&self) -> bool {
        let state = self.lock();
        !state.pending_events.is_empty() || !state.incoming.is_empty()
    }

    /// Connection attempts so far, successful or not.
    pub fn connects(&self) -> u32 {
        self.lock().connects
    }

    /// Times the runtime closed the channel.
    pub fn disconnects(&self) -> u32 {
        self.lock().disconnects
    }

    /// Frames rendered so far.
    pub fn renders(&self) -> u32 {
        self.lock().renders
    }

    /// Court shapes of the last rendered frame.
    pub fn last_frame(&self) -> Vec<Shape> {
        self.lock().frame.shapes().to_vec()
    }

    /// Invariant violations seen at render time.
    pub fn violations(&self) -> Vec<Violation> {
        self.lock().violations.clone()
    }

    /// Whether the runtime stopped the driver.
    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }

    /// Create a snapshot from App state for invariant checking.
    pub fn snapshot_from_app(&self, app: &App) -> SessionSnapshot {
        SessionSnapshot::from_app(app).with_sent(self.lock().sent_log.clone())
    }

    /// Check invariants against App state.
    pub fn check_invariants(&self, app: &App, context: &str) {
        if let Some(ref registry) = self.invariants {
            registry.assert_all(&self.snapshot_from_app(app), context);
        }
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;
    type Instant = SimInstant;

    fn poll_event(
        &mut self,
    ) -> impl Future<Output = Result<Option<AppEvent>, Self::Error>> + Send {
        std::future::ready(Ok(self.lock().pending_events.pop_front()))
    }

    fn send(&mut self, envelope: Envelope) -> Result<(), Self::Error> {
        let mut state = self.lock();
        if !state.connected {
            return Err(SimDriverError("not connected".into()));
        }

        let me = state.player_id.clone();
        state.sent_log.push((me, envelope.clone()));
        state.outgoing.push(envelope);
        Ok(())
    }

    fn recv(&mut self) -> Option<ChannelEvent> {
        let mut state = self.lock();
        if !state.connected {
            return None;
        }

        let event = state.incoming.pop_front();
        if matches!(event, Some(ChannelEvent::Closed { .. })) {
            state.connected = false;
        }
        event
    }

    fn connect(&mut self, url: &str) -> impl Future<Output = Result<(), Self::Error>> + Send {
        let mut state = self.lock();
        state.connects += 1;

        let stalled = state.stall_connects > 0;
        let result = if stalled {
            state.stall_connects -= 1;
            Err(SimDriverError(format!("connect never completed: {url}")))
        } else if state.refuse_connects > 0 {
            state.refuse_connects -= 1;
            Err(SimDriverError(format!("connection refused: {url}")))
        } else {
            state.connected = true;
            Ok(())
        };

        tracing::trace!(attempt = state.connects, ok = result.is_ok(), stalled, "sim connect");
        drop(state);

        async move {
            if stalled {
                std::future::pending::<()>().await;
            }
            result
        }
    }

    fn disconnect(&mut self) {
        let mut state = self.lock();
        state.disconnects += 1;
        state.connected = false;
        state.incoming.clear();
    }

    fn is_connected(&self) -> bool {
        self.lock().connected
    }

    fn now(&self) -> Self::Instant {
        self.env.now()
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        let violations = match self.invariants.as_deref() {
            Some(registry) => registry.check_all(&self.snapshot_from_app(app)).err(),
            None => None,
        };

        let mut state = self.lock();
        state.renders += 1;
        state.player_id = app.view().player_id.clone();
        rally_app::render(&mut state.frame, app.view().snapshot.as_ref());
        state.violations.extend(violations.into_iter().flatten());
        Ok(())
    }

    fn stop(&mut self) {
        self.lock().stopped = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inject_event_queues_event() {
        let driver = SimDriver::new(SimEnv::new());
        driver.inject_key(KeyInput::Enter);

        assert!(driver.has_pending());
    }

    #[tokio::test]
    async fn refused_connect_counts_as_attempt() {
        let mut driver = SimDriver::new(SimEnv::new());
        driver.refuse_connects(1);

        assert!(driver.connect("ws://sim/ws").await.is_err());
        assert!(!driver.is_connected());
        assert!(driver.connect("ws://sim/ws").await.is_ok());
        assert!(driver.is_connected());
        assert_eq!(driver.connects(), 2);
    }

    #[tokio::test]
    async fn send_requires_channel() {
        let mut driver = SimDriver::new(SimEnv::new());
        assert!(driver.send(Envelope::GameOver).is_err());

        driver.connect("ws://sim/ws").await.unwrap();
        driver.send(Envelope::Challenge("bob".into())).unwrap();
        assert_eq!(driver.take_outgoing(), vec![Envelope::Challenge("bob".into())]);
    }

    #[tokio::test]
    async fn close_is_last_event_of_channel() {
        let mut driver = SimDriver::new(SimEnv::new());
        driver.connect("ws://sim/ws").await.unwrap();
        driver.inject_frame(r#"{"type":"start","content":{}}"#);
        driver.inject_close("bye");
        driver.inject_frame(r#"{"type":"gameOver"}"#);

        assert!(matches!(driver.recv(), Some(ChannelEvent::Frame(_))));
        assert!(matches!(driver.recv(), Some(ChannelEvent::Closed { .. })));
        assert_eq!(driver.recv(), None);
        assert!(!driver.is_connected());
    }

    #[test]
    fn render_records_frame() {
        let mut driver = SimDriver::new(SimEnv::new());
        let app = App::new("ws://sim/ws");

        driver.render(&app).unwrap();
        assert_eq!(driver.renders(), 1);
        assert!(matches!(driver.last_frame().as_slice(), [Shape::Waiting(_)]));
    }
}
