use async_trait::async_trait;
use std::time::Duration;

use crate::config::RetrySettings;

/// Suspends the caller between attempts. Injected so tests can record the
/// requested delays instead of waiting them out.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetrySettings::default())
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            base_delay: Duration::from_millis(settings.base_delay_ms),
        }
    }
}

impl RetryPolicy {
    /// Wait after failed attempt `attempt` (1-based): `base * 2^attempt`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// What the gateway should do after recording a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter(Duration),
    GiveUp,
}

/// Attempt bookkeeping for one gateway call: how many attempts were started,
/// the last failure seen, and the delay before the next attempt.
#[derive(Debug, Clone)]
pub struct RetryState<E> {
    policy: RetryPolicy,
    attempts: u32,
    last_failure: Option<E>,
    next_delay: Option<Duration>,
}

impl<E> RetryState<E> {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy, attempts: 0, last_failure: None, next_delay: None }
    }

    /// Starts the next attempt and returns its 1-based number, or `None` once
    /// the budget is spent.
    pub fn begin_attempt(&mut self) -> Option<u32> {
        if self.attempts >= self.policy.max_attempts {
            return None;
        }
        self.attempts += 1;
        self.next_delay = None;
        Some(self.attempts)
    }

    pub fn record_failure(&mut self, failure: E) -> RetryDecision {
        self.last_failure = Some(failure);
        if self.attempts >= self.policy.max_attempts {
            self.next_delay = None;
            return RetryDecision::GiveUp;
        }
        let delay = self.policy.delay_after(self.attempts);
        self.next_delay = Some(delay);
        RetryDecision::RetryAfter(delay)
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn next_delay(&self) -> Option<Duration> {
        self.next_delay
    }

    pub fn last_failure(&self) -> Option<&E> {
        self.last_failure.as_ref()
    }

    pub fn into_last_failure(self) -> Option<E> {
        self.last_failure
    }
}
