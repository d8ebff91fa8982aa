//! Circuit breaker guarding the remote dictionary API.

use parking_lot::Mutex;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// State of a circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Requests are allowed.
    Closed,
    /// Requests are rejected until the cooldown elapses.
    Open,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakerStatus {
    pub state: CircuitState,
    pub failures: u32,
    pub threshold: u32,
    pub cooldown_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
}

#[derive(Debug, Default)]
struct Counters {
    failures: u32,
    last_failure: Option<Instant>,
}

/// Opens after `failure_threshold` consecutive failures and closes again once
/// `cooldown` has passed since the most recent failure.
#[derive(Debug)]
pub struct CircuitBreaker {
    counters: Mutex<Counters>,
    failure_threshold: u32,
    cooldown: Duration,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, cooldown: Duration) -> Self {
        Self {
            counters: Mutex::new(Counters::default()),
            failure_threshold: failure_threshold.max(1),
            cooldown,
        }
    }

    pub fn is_open(&self) -> bool {
        self.is_open_at(Instant::now())
    }

    pub fn is_open_at(&self, now: Instant) -> bool {
        let mut counters = self.counters.lock();
        self.check_transition(&mut counters, now)
    }

    /// A successful call clears the failure streak.
    pub fn record_success(&self) {
        let mut counters = self.counters.lock();
        counters.failures = 0;
        counters.last_failure = None;
    }

    pub fn record_failure(&self) {
        self.record_failure_at(Instant::now());
    }

    pub fn record_failure_at(&self, now: Instant) {
        let mut counters = self.counters.lock();
        counters.failures = counters.failures.saturating_add(1);
        counters.last_failure = Some(now);
        if counters.failures == self.failure_threshold {
            warn!(
                failures = counters.failures,
                cooldown_secs = self.cooldown.as_secs(),
                "Circuit breaker opened after consecutive failures"
            );
        }
    }

    /// Force the breaker closed.
    pub fn reset(&self) {
        let mut counters = self.counters.lock();
        *counters = Counters::default();
        info!("Circuit breaker reset; dictionary API calls enabled");
    }

    pub fn failures(&self) -> u32 {
        self.counters.lock().failures
    }

    pub fn status(&self) -> BreakerStatus {
        self.status_at(Instant::now())
    }

    pub fn status_at(&self, now: Instant) -> BreakerStatus {
        let mut counters = self.counters.lock();
        let open = self.check_transition(&mut counters, now);
        let retry_after_secs = open
            .then(|| counters.last_failure)
            .flatten()
            .map(|last| {
                self.cooldown
                    .saturating_sub(now.saturating_duration_since(last))
                    .as_secs()
            });
        BreakerStatus {
            state: if open {
                CircuitState::Open
            } else {
                CircuitState::Closed
            },
            failures: counters.failures,
            threshold: self.failure_threshold,
            cooldown_secs: self.cooldown.as_secs(),
            retry_after_secs,
        }
    }

    fn check_transition(&self, counters: &mut Counters, now: Instant) -> bool {
        if counters.failures < self.failure_threshold {
            return false;
        }
        let within_cooldown = counters
            .last_failure
            .is_some_and(|last| now.saturating_duration_since(last) < self.cooldown);
        if within_cooldown {
            return true;
        }
        *counters = Counters::default();
        info!("Circuit breaker cooldown elapsed; closing");
        false
    }
}
