//! Poll policy
//!
//! Controls how often a job's status is probed and when the client gives up
//! waiting for it.

use std::time::Duration;

use crate::error::{ClientError, Result};

/// Delay between two status polls of the same job
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Longest time a single job is waited for
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(600);

/// Polling parameters applied to every job awaited by a client
///
/// The interval is fixed: there is no backoff between polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay applied before every re-poll
    pub interval: Duration,
    /// Ceiling on the total wait, `None` waits forever
    pub max_wait: Option<Duration>,
    /// Ceiling on the number of status polls, `None` means unbounded
    pub max_polls: Option<u32>,
}

impl PollPolicy {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_wait(mut self, max_wait: Option<Duration>) -> Self {
        self.max_wait = max_wait;
        self
    }

    pub fn with_max_polls(mut self, max_polls: Option<u32>) -> Self {
        self.max_polls = max_polls;
        self
    }

    /// Validates the policy
    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(ClientError::InvalidConfig(
                "poll interval must be greater than 0".to_string(),
            ));
        }

        if self.max_wait.is_some_and(|d| d.is_zero()) {
            return Err(ClientError::InvalidConfig(
                "max_wait must be greater than 0".to_string(),
            ));
        }

        if self.max_polls == Some(0) {
            return Err(ClientError::InvalidConfig(
                "max_polls must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_wait: Some(DEFAULT_MAX_WAIT),
            max_polls: None,
        }
    }
}
