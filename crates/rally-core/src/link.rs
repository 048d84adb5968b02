//! Channel lifecycle state machine.
//!
//! Tracks the single server channel across connects, losses and reconnects.
//! Uses the action pattern: methods take time as input and return actions for
//! the driver to execute, so the machine stays free of I/O and timers.
//!
//! # State Machine
//!
//! ```text
//! ┌──────┐ start ┌────────────┐ opened ┌──────┐
//! │ Idle │──────>│ Connecting │───────>│ Open │
//! └──────┘       └────────────┘        └──────┘
//!                   ↑      │ lost         │ lost / welcome timeout
//!           retry_at│      ↓              ↓
//!                ┌──────────────────────────┐ attempts exhausted ┌────────┐
//!                │ Backoff { attempt }      │───────────────────>│ Failed │
//!                └──────────────────────────┘                    └────────┘
//!                                                                  │ retry
//!                                                                  ↓
//!                                                              Connecting
//! ```
//!
//! `shutdown` moves any state to `Closed`, which is terminal.

use std::time::Duration;

use crate::{Timestamp, error::LinkError};

/// Delay before the first reconnect attempt.
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(250);

/// Upper bound on any single reconnect delay.
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(8);

/// Growth factor between consecutive reconnect delays.
pub const DEFAULT_BACKOFF_MULTIPLIER: u32 = 2;

/// Reconnect attempts allowed before the link gives up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 6;

/// Time allowed between channel open and the server's `welcome`.
pub const DEFAULT_WELCOME_TIMEOUT: Duration = Duration::from_secs(10);

/// Time allowed for one connect attempt to open the channel.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Actions returned by the link state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkAction {
    /// Open the channel to the server.
    Connect,
    /// Close the channel.
    Close {
        /// Reason for closing.
        reason: String,
    },
}

/// Link state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Never started.
    Idle,
    /// Connect requested, channel not open yet.
    Connecting,
    /// Channel open.
    Open,
    /// Channel lost, waiting to reconnect.
    Backoff {
        /// 1-based number of the reconnect attempt being waited for.
        attempt: u32,
    },
    /// Reconnect budget exhausted. Only [`Link::retry`] leaves this state.
    Failed,
    /// Shut down locally. Terminal.
    Closed,
}

/// Link configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    /// Delay before the first reconnect attempt.
    pub initial_backoff: Duration,
    /// Cap on any single delay.
    pub max_backoff: Duration,
    /// Factor applied per attempt.
    pub backoff_multiplier: u32,
    /// Reconnect attempts before giving up.
    pub max_attempts: u32,
    /// Deadline for `welcome` after the channel opens.
    pub welcome_timeout: Duration,
    /// Deadline for a connect attempt. An attempt that misses it counts as
    /// a failed connect.
    pub connect_timeout: Duration,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            max_backoff: DEFAULT_MAX_BACKOFF,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            welcome_timeout: DEFAULT_WELCOME_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl LinkConfig {
    /// Delay before reconnect `attempt` (1-based).
    ///
    /// `initial * multiplier^(attempt-1)`, capped at `max_backoff`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = self.backoff_multiplier.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff.saturating_mul(factor).min(self.max_backoff)
    }
}

/// Channel lifecycle state machine.
///
/// Generic over the instant type so simulation can drive it with virtual time.
#[derive(Debug, Clone)]
pub struct Link<I: Timestamp> {
    state: LinkState,
    config: LinkConfig,
    /// Losses since the last established (welcomed) session.
    attempts: u32,
    /// When the pending reconnect fires. `Some` only in `Backoff`.
    retry_at: Option<I>,
    /// When the channel opened. `Some` only in `Open`.
    opened_at: Option<I>,
    /// Server sent `welcome` on the current channel.
    welcomed: bool,
    /// Reason for the most recent loss.
    last_error: Option<String>,
}

impl<I: Timestamp> Link<I> {
    /// Create a link in [`LinkState::Idle`].
    pub fn new(config: LinkConfig) -> Self {
        Self {
            state: LinkState::Idle,
            config,
            attempts: 0,
            retry_at: None,
            opened_at: None,
            welcomed: false,
            last_error: None,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Link configuration.
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Losses since the last established session.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// When the pending reconnect fires. `None` unless backing off.
    #[must_use]
    pub fn retry_at(&self) -> Option<I> {
        self.retry_at
    }

    /// Reason for the most recent loss. `None` if the link never lost a
    /// channel.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Request the first connection.
    ///
    /// # Errors
    ///
    /// - `LinkError::InvalidState` if not in `Idle`
    pub fn start(&mut self) -> Result<Vec<LinkAction>, LinkError> {
        if self.state != LinkState::Idle {
            return Err(LinkError::InvalidState { state: self.state, operation: "start" });
        }

        self.state = LinkState::Connecting;
        Ok(vec![LinkAction::Connect])
    }

    /// Channel is open.
    ///
    /// # Errors
    ///
    /// - `LinkError::InvalidState` if not in `Connecting`
    pub fn opened(&mut self, now: I) -> Result<(), LinkError> {
        if self.state != LinkState::Connecting {
            return Err(LinkError::InvalidState { state: self.state, operation: "opened" });
        }

        self.state = LinkState::Open;
        self.opened_at = Some(now);
        self.welcomed = false;
        tracing::info!("channel open");
        Ok(())
    }

    /// Server sent `welcome` on the open channel. Resets the reconnect budget.
    pub fn welcomed(&mut self) {
        if self.state == LinkState::Open {
            self.welcomed = true;
            self.attempts = 0;
        }
    }

    /// Channel failed to open or was lost.
    ///
    /// Returns the new state, or `None` if the loss was ignored because no
    /// channel was live (already backing off, failed or closed). This makes a
    /// loss observable exactly once per channel.
    pub fn lost(&mut self, now: I, reason: impl Into<String>) -> Option<LinkState> {
        if !matches!(self.state, LinkState::Connecting | LinkState::Open) {
            return None;
        }

        let reason = reason.into();
        self.attempts = self.attempts.saturating_add(1);
        self.opened_at = None;
        self.welcomed = false;

        if self.attempts > self.config.max_attempts {
            tracing::warn!(attempts = self.attempts, %reason, "reconnect budget exhausted");
            self.state = LinkState::Failed;
            self.retry_at = None;
        } else {
            let delay = self.config.backoff(self.attempts);
            tracing::info!(attempt = self.attempts, ?delay, %reason, "channel lost, backing off");
            self.state = LinkState::Backoff { attempt: self.attempts };
            self.retry_at = Some(now + delay);
        }

        self.last_error = Some(reason);
        Some(self.state)
    }

    /// Process periodic maintenance: reconnect deadlines and the welcome
    /// deadline.
    pub fn tick(&mut self, now: I) -> Vec<LinkAction> {
        match self.state {
            LinkState::Backoff { attempt } => {
                if self.retry_at.is_some_and(|at| now >= at) {
                    tracing::debug!(attempt, "reconnecting");
                    self.state = LinkState::Connecting;
                    self.retry_at = None;
                    return vec![LinkAction::Connect];
                }
                vec![]
            },
            LinkState::Open if !self.welcomed => {
                let Some(opened_at) = self.opened_at else {
                    return vec![];
                };

                let elapsed = now - opened_at;
                if elapsed <= self.config.welcome_timeout {
                    return vec![];
                }

                let reason = LinkError::WelcomeTimeout { elapsed }.to_string();
                self.lost(now, reason.clone());
                vec![LinkAction::Close { reason }]
            },
            _ => vec![],
        }
    }

    /// Manual retry: reconnect now with a fresh budget.
    ///
    /// # Errors
    ///
    /// - `LinkError::InvalidState` unless in `Failed` or `Backoff`
    pub fn retry(&mut self) -> Result<Vec<LinkAction>, LinkError> {
        if !matches!(self.state, LinkState::Failed | LinkState::Backoff { .. }) {
            return Err(LinkError::InvalidState { state: self.state, operation: "retry" });
        }

        self.state = LinkState::Connecting;
        self.attempts = 0;
        self.retry_at = None;
        Ok(vec![LinkAction::Connect])
    }

    /// The terminal failure, if the link has given up.
    pub fn failure(&self) -> Option<LinkError> {
        (self.state == LinkState::Failed).then(|| LinkError::Exhausted {
            attempts: self.attempts.saturating_sub(1),
            reason: self.last_error.clone().unwrap_or_default(),
        })
    }

    /// Shut the link down for good.
    pub fn shutdown(&mut self) -> Vec<LinkAction> {
        let was_live = matches!(self.state, LinkState::Connecting | LinkState::Open);
        self.state = LinkState::Closed;
        self.retry_at = None;
        self.opened_at = None;

        if was_live { vec![LinkAction::Close { reason: "shutdown".to_string() }] } else { vec![] }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    fn open_link(now: Instant) -> Link<Instant> {
        let mut link = Link::new(LinkConfig::default());
        link.start().unwrap();
        link.opened(now).unwrap();
        link
    }

    #[test]
    fn backoff_doubles_until_cap() {
        let config = LinkConfig::default();
        assert_eq!(config.backoff(1), Duration::from_millis(250));
        assert_eq!(config.backoff(2), Duration::from_millis(500));
        assert_eq!(config.backoff(3), Duration::from_secs(1));
        assert_eq!(config.backoff(6), Duration::from_secs(8));
        assert_eq!(config.backoff(40), Duration::from_secs(8));
    }

    #[test]
    fn start_only_from_idle() {
        let mut link: Link<Instant> = Link::new(LinkConfig::default());
        assert_eq!(link.start().unwrap(), vec![LinkAction::Connect]);
        assert!(link.start().is_err());
    }

    #[test]
    fn loss_while_open_schedules_retry() {
        let now = Instant::now();
        let mut link = open_link(now);

        assert_eq!(link.lost(now, "reset"), Some(LinkState::Backoff { attempt: 1 }));
        assert_eq!(link.retry_at(), Some(now + Duration::from_millis(250)));
        assert_eq!(link.last_error(), Some("reset"));

        assert!(link.tick(now + Duration::from_millis(100)).is_empty());
        assert_eq!(link.tick(now + Duration::from_millis(250)), vec![LinkAction::Connect]);
        assert_eq!(link.state(), LinkState::Connecting);
    }

    #[test]
    fn second_loss_without_channel_is_ignored() {
        let now = Instant::now();
        let mut link = open_link(now);

        assert!(link.lost(now, "reset").is_some());
        assert_eq!(link.lost(now, "reset again"), None);
        assert_eq!(link.attempts(), 1);
    }

    #[test]
    fn welcome_resets_budget() {
        let now = Instant::now();
        let mut link = open_link(now);
        link.lost(now, "reset");
        link.tick(now + Duration::from_secs(1));
        link.opened(now + Duration::from_secs(1)).unwrap();

        link.welcomed();
        assert_eq!(link.attempts(), 0);
    }

    #[test]
    fn exhausted_budget_fails() {
        let config = LinkConfig { max_attempts: 2, ..LinkConfig::default() };
        let mut now = Instant::now();
        let mut link = Link::new(config);
        link.start().unwrap();

        for attempt in 1..=2 {
            assert_eq!(link.lost(now, "refused"), Some(LinkState::Backoff { attempt }));
            now += Duration::from_secs(10);
            assert_eq!(link.tick(now), vec![LinkAction::Connect]);
        }

        assert_eq!(link.lost(now, "refused"), Some(LinkState::Failed));
        assert!(link.tick(now + Duration::from_secs(60)).is_empty());
        assert_eq!(
            link.failure(),
            Some(LinkError::Exhausted { attempts: 2, reason: "refused".into() })
        );
    }

    #[test]
    fn missing_welcome_closes_channel() {
        let now = Instant::now();
        let mut link = open_link(now);

        assert!(link.tick(now + Duration::from_secs(5)).is_empty());

        let actions = link.tick(now + Duration::from_secs(11));
        assert!(matches!(actions.as_slice(), [LinkAction::Close { .. }]));
        assert_eq!(link.state(), LinkState::Backoff { attempt: 1 });
    }

    #[test]
    fn welcomed_channel_has_no_deadline() {
        let now = Instant::now();
        let mut link = open_link(now);
        link.welcomed();

        assert!(link.tick(now + Duration::from_secs(3600)).is_empty());
        assert_eq!(link.state(), LinkState::Open);
    }

    #[test]
    fn retry_from_failed_resets_budget() {
        let config = LinkConfig { max_attempts: 0, ..LinkConfig::default() };
        let now = Instant::now();
        let mut link = Link::new(config);
        link.start().unwrap();
        assert_eq!(link.lost(now, "refused"), Some(LinkState::Failed));

        assert_eq!(link.retry().unwrap(), vec![LinkAction::Connect]);
        assert_eq!(link.attempts(), 0);
        assert!(link.retry().is_err());
    }

    #[test]
    fn shutdown_is_terminal() {
        let now = Instant::now();
        let mut link = open_link(now);

        assert!(matches!(link.shutdown().as_slice(), [LinkAction::Close { .. }]));
        assert_eq!(link.state(), LinkState::Closed);
        assert_eq!(link.lost(now, "late close"), None);
        assert!(link.shutdown().is_empty());
    }
}
