//! Virtual clock environment.
//!
//! Time never moves on its own. Tests call [`SimEnv::advance`], and
//! [`Environment::sleep`] advances the clock by the requested duration the
//! first time it is polled and completes immediately, so a runtime loop that
//! idles simply fast-forwards. A sleep that loses a race and is never polled
//! leaves the clock alone. Clones share one clock.

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::{
    ops::{Add, Sub},
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use rally_core::Environment;

/// Point on the virtual timeline, measured from the simulation start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimInstant(Duration);

impl SimInstant {
    /// Time elapsed since the simulation started.
    pub fn since_start(self) -> Duration {
        self.0
    }
}

impl Sub for SimInstant {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Duration {
        self.0.saturating_sub(rhs.0)
    }
}

impl Add<Duration> for SimInstant {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self {
        Self(self.0.saturating_add(rhs))
    }
}

/// Simulation environment backed by a shared virtual clock.
#[derive(Debug, Clone, Default)]
pub struct SimEnv {
    clock: Arc<Mutex<Duration>>,
}

impl SimEnv {
    /// Create an environment at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward.
    pub fn advance(&self, duration: Duration) {
        let mut clock = self.clock.lock().unwrap_or_else(PoisonError::into_inner);
        *clock = clock.saturating_add(duration);
    }

    /// Time elapsed since the simulation started.
    pub fn elapsed(&self) -> Duration {
        *self.clock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Environment for SimEnv {
    type Instant = SimInstant;

    fn now(&self) -> SimInstant {
        SimInstant(self.elapsed())
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        let env = self.clone();
        async move { env.advance(duration) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_only_moves_when_advanced() {
        let env = SimEnv::new();
        let start = env.now();
        assert_eq!(env.now(), start);

        env.advance(Duration::from_millis(250));
        assert_eq!(env.now() - start, Duration::from_millis(250));
    }

    #[test]
    fn clones_share_the_clock() {
        let env = SimEnv::new();
        let other = env.clone();

        other.advance(Duration::from_secs(1));
        assert_eq!(env.elapsed(), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn sleep_fast_forwards() {
        let env = SimEnv::new();
        env.sleep(Duration::from_secs(3)).await;
        assert_eq!(env.now().since_start(), Duration::from_secs(3));
    }

    #[test]
    fn unpolled_sleep_keeps_the_clock() {
        let env = SimEnv::new();
        drop(env.sleep(Duration::from_secs(3)));
        assert_eq!(env.elapsed(), Duration::ZERO);
    }

    #[test]
    fn earlier_minus_later_saturates() {
        let early = SimInstant::default();
        let late = early + Duration::from_secs(1);
        assert_eq!(early - late, Duration::ZERO);
        assert!(late > early);
    }
}
