//! Two-state circuit breaker guarding the remote suggester.
//!
//! After `failure_threshold` consecutive failures the breaker opens for
//! `cooldown`. There is no half-open trial call: once the cooldown has elapsed the
//! next `is_open` query closes it and clears the failure count.

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::metrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakerState {
    Closed,
    Open,
}

/// Point-in-time view of the breaker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakerStatus {
    pub state: BreakerState,
    pub consecutive_failures: u32,
    pub failure_threshold: u32,
    /// Milliseconds until the breaker closes again, when open.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reopens_in_ms: Option<u64>,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    failure_threshold: u32,
    cooldown: Duration,
    consecutive_failures: u32,
    open_until: Option<Instant>,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, cooldown: Duration) -> Self {
        Self {
            failure_threshold: failure_threshold.max(1),
            cooldown,
            consecutive_failures: 0,
            open_until: None,
        }
    }

    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
        self.open_until = None;
    }

    pub fn record_failure(&mut self) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);

        if self.consecutive_failures >= self.failure_threshold {
            self.open_until = Some(Instant::now() + self.cooldown);
            if self.consecutive_failures == self.failure_threshold {
                metrics::BREAKER_OPENED.inc();
            }
            warn!(
                failures = self.consecutive_failures,
                cooldown_ms = self.cooldown.as_millis() as u64,
                "Circuit breaker open, remote suggestions paused"
            );
        }
    }

    /// Whether remote calls should be skipped.
    ///
    /// Closes the breaker (and clears the failure count) once the cooldown
    /// has strictly elapsed.
    pub fn is_open(&mut self) -> bool {
        if self.consecutive_failures < self.failure_threshold {
            return false;
        }

        match self.open_until {
            Some(until) if Instant::now() <= until => true,
            _ => {
                self.consecutive_failures = 0;
                self.open_until = None;
                info!("Circuit breaker cooldown elapsed, remote suggestions resumed");
                false
            }
        }
    }

    /// Current state without applying the lazy reset.
    pub fn state(&self) -> BreakerState {
        if self.consecutive_failures < self.failure_threshold {
            return BreakerState::Closed;
        }
        match self.open_until {
            Some(until) if Instant::now() <= until => BreakerState::Open,
            _ => BreakerState::Closed,
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn status(&self) -> BreakerStatus {
        let state = self.state();
        let reopens_in_ms = match (state, self.open_until) {
            (BreakerState::Open, Some(until)) => {
                Some(until.saturating_duration_since(Instant::now()).as_millis() as u64)
            }
            _ => None,
        };

        BreakerStatus {
            state,
            consecutive_failures: self.consecutive_failures,
            failure_threshold: self.failure_threshold,
            reopens_in_ms,
        }
    }
}
