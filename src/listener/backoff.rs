//! Accept Failure Backoff
//!
//! The accept loop never gives up on an accept error: it logs and tries
//! again. Retrying immediately would turn a persistent failure (running out
//! of file descriptors, for instance) into a silent busy loop, so each
//! consecutive failure doubles the pause before the next attempt, up to a
//! ceiling. A successful accept resets the pause.
//!
//! Every `escalate_after` consecutive failures the loop logs at error level
//! instead of warn, so a listener that has stopped accepting is visible.

use std::time::Duration;

/// Configuration for the accept backoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffConfig {
    /// Pause after the first failure (default: 10ms)
    pub base_delay: Duration,

    /// Longest pause between attempts (default: 1s)
    pub max_delay: Duration,

    /// Log at error level every this many consecutive failures (default: 10)
    pub escalate_after: u32,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_secs(1),
            escalate_after: 10,
        }
    }
}

/// Tracks consecutive accept failures.
#[derive(Debug, Clone)]
pub struct AcceptBackoff {
    config: BackoffConfig,
    consecutive_failures: u32,
    next_delay: Duration,
}

impl AcceptBackoff {
    pub fn new(config: BackoffConfig) -> Self {
        let next_delay = config.base_delay.min(config.max_delay);
        Self {
            config,
            consecutive_failures: 0,
            next_delay,
        }
    }

    /// Records a failed accept and returns how long to pause before retrying.
    pub fn record_failure(&mut self) -> Duration {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        let delay = self.next_delay;
        self.next_delay = self.next_delay.saturating_mul(2).min(self.config.max_delay);
        delay
    }

    /// Records a successful accept.
    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
        self.next_delay = self.config.base_delay.min(self.config.max_delay);
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Returns true if the latest failure should be logged at error level.
    pub fn should_escalate(&self) -> bool {
        self.config.escalate_after > 0
            && self.consecutive_failures > 0
            && self.consecutive_failures % self.config.escalate_after == 0
    }
}

impl Default for AcceptBackoff {
    fn default() -> Self {
        Self::new(BackoffConfig::default())
    }
}
