//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: UI state machine
//! - [`Bridge`]: protocol bridge to the session
//! - [`Driver`]: platform-specific I/O
//!
//! Each cycle polls input, drains every inbound channel event that is ready,
//! ticks the session, executes sends and channel commands, and then renders
//! at most once. A burst of snapshots therefore costs one render, and nothing
//! is rendered when nothing changed.
//!
//! Connect attempts race the environment's clock. An attempt that misses
//! `connect_timeout` is dropped and reported as a failed connect, so a dead
//! endpoint feeds the backoff instead of stalling the loop.

use std::time::Duration;

use rally_client::ClientConfig;
use rally_core::Environment;

use crate::{App, AppAction, AppEvent, Bridge, ChannelEvent, Driver, bridge::LinkCommand};

/// Pause between cycles that found nothing to do.
pub const IDLE_INTERVAL: Duration = Duration::from_millis(10);

/// Generic runtime that orchestrates App, Bridge, and Driver.
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
/// - `E`: Environment providing the idle sleep
pub struct Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    driver: D,
    env: E,
    app: App,
    bridge: Bridge<E::Instant>,
    url: String,
    connect_timeout: Duration,
    /// App changed since the last render.
    dirty: bool,
    /// Last cycle did any work.
    busy: bool,
}

impl<D, E> Runtime<D, E>
where
    D: Driver<Instant = E::Instant>,
    E: Environment,
{
    /// Create a new runtime with the given driver, environment and config.
    pub fn new(driver: D, env: E, config: ClientConfig) -> Self {
        let app = App::new(config.url.clone());
        let connect_timeout = config.link.connect_timeout;
        let bridge = Bridge::new(config.link);
        Self {
            driver,
            env,
            app,
            bridge,
            url: config.url,
            connect_timeout,
            dirty: true,
            busy: false,
        }
    }

    /// Run the main event loop until the user quits.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters a terminal or render error.
    pub async fn run(mut self) -> Result<(), D::Error> {
        self.start().await?;

        loop {
            if self.step().await? {
                break;
            }
            if !self.busy {
                self.env.sleep(IDLE_INTERVAL).await;
            }
        }

        self.shutdown();
        Ok(())
    }

    /// Start the session and open the first channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial render fails.
    pub async fn start(&mut self) -> Result<(), D::Error> {
        let events = self.bridge.start();
        self.dispatch_events(events);
        self.flush().await?;
        self.render_if_dirty()
    }

    /// Process one cycle of the event loop.
    ///
    /// Returns `true` if the application should quit.
    ///
    /// # Errors
    ///
    /// Returns an error if polling input or rendering fails.
    pub async fn step(&mut self) -> Result<bool, D::Error> {
        self.busy = false;

        if let Some(event) = self.driver.poll_event().await? {
            self.busy = true;
            let actions = self.app.handle(event);
            if self.process_actions(actions) {
                return Ok(true);
            }
        }

        while self.driver.is_connected()
            && let Some(event) = self.driver.recv()
        {
            self.busy = true;
            let events = match event {
                ChannelEvent::Frame(bytes) => self.bridge.handle_frame(bytes),
                ChannelEvent::Closed { reason } => {
                    let now = self.driver.now();
                    self.bridge.handle_closed(now, reason)
                },
            };
            self.dispatch_events(events);
        }

        let now = self.driver.now();
        let events = self.bridge.handle_tick(now);
        self.dispatch_events(events);

        self.flush().await?;
        self.render_if_dirty()?;
        Ok(false)
    }

    /// Dispose the session, close the channel and stop the driver.
    pub fn shutdown(&mut self) {
        let events = self.bridge.dispose();
        self.dispatch_events(events);

        for envelope in self.bridge.take_outgoing() {
            tracing::debug!(kind = %envelope.kind(), "dropping unsent envelope at shutdown");
        }
        for command in self.bridge.take_link_commands() {
            if let LinkCommand::Disconnect { .. } = command {
                self.driver.disconnect();
            }
        }

        self.driver.stop();
    }

    /// Process actions returned by the App.
    ///
    /// Returns `true` if should quit.
    fn process_actions(&mut self, initial_actions: Vec<AppAction>) -> bool {
        let mut pending_actions = initial_actions;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                match action {
                    AppAction::Render => self.dirty = true,
                    AppAction::Quit => return true,

                    // Protocol operations go through the bridge
                    AppAction::Challenge { .. } | AppAction::Move { .. } | AppAction::Retry => {
                        for event in self.bridge.process_app_action(action) {
                            pending_actions.extend(self.app.handle(event));
                        }
                    },
                }
            }
        }
        false
    }

    /// Feed bridge events to the App.
    fn dispatch_events(&mut self, events: Vec<AppEvent>) {
        for event in events {
            let actions = self.app.handle(event);
            // Session-driven events never ask to quit.
            let _ = self.process_actions(actions);
        }
    }

    /// Send pending envelopes and execute channel commands until none remain.
    async fn flush(&mut self) -> Result<(), D::Error> {
        loop {
            for envelope in self.bridge.take_outgoing() {
                if let Err(e) = self.driver.send(envelope) {
                    tracing::warn!(error = %e, "send failed");
                }
            }

            let commands = self.bridge.take_link_commands();
            if commands.is_empty() {
                return Ok(());
            }

            for command in commands {
                let events = match command {
                    LinkCommand::Connect => match self.connect().await {
                        Ok(()) => {
                            let now = self.driver.now();
                            self.bridge.handle_opened(now)
                        },
                        Err(reason) => {
                            tracing::warn!(url = %self.url, %reason, "connect failed");
                            let now = self.driver.now();
                            let mut events = self.bridge.handle_connect_failed(now, reason.clone());
                            events.push(AppEvent::Status { message: reason });
                            events
                        },
                    },
                    LinkCommand::Disconnect { reason } => {
                        tracing::debug!(%reason, "disconnecting");
                        self.driver.disconnect();
                        vec![]
                    },
                };
                self.dispatch_events(events);
            }
        }
    }

    /// One connect attempt, bounded by `connect_timeout`.
    async fn connect(&mut self) -> Result<(), String> {
        tracing::debug!(url = %self.url, "connecting");

        let timeout = self.connect_timeout;
        let attempt = self.driver.connect(&self.url);
        let deadline = self.env.sleep(timeout);

        tokio::select! {
            biased;

            result = attempt => result.map_err(|e| format!("connect failed: {e}")),
            () = deadline => Err(format!("connect timed out after {timeout:?}")),
        }
    }

    fn render_if_dirty(&mut self) -> Result<(), D::Error> {
        if self.dirty {
            self.dirty = false;
            self.driver.render(&self.app)?;
        }
        Ok(())
    }

    /// Get a reference to the App
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a reference to the Bridge
    pub fn bridge(&self) -> &Bridge<E::Instant> {
        &self.bridge
    }

    /// Get a reference to the Driver
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Get a mutable reference to the Driver
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}
