// SPDX-License-Identifier: MIT
//
// Animator configuration — how much to type per heartbeat, and how often.
//
// The defaults give roughly 150 chars per second: 5 chars every 33ms.
// Fast enough that a screenful of code appears in a few seconds, slow
// enough that the eye can follow each insertion.

use std::time::Duration;

use thiserror::Error;

/// Chars inserted per heartbeat unless configured otherwise.
pub const DEFAULT_CHARS_PER_CHANGE: usize = 5;

/// Delay between heartbeats unless configured otherwise.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_millis(33);

/// A rejected configuration value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("chars per change must be at least 1")]
    ZeroBudget,
    #[error("heartbeat interval must be greater than zero")]
    ZeroInterval,
}

/// Timing and budget for one animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimatorConfig {
    /// Upper bound on chars inserted by a single heartbeat.
    pub chars_per_change: usize,
    /// Delay from one heartbeat to the next.
    pub heartbeat_interval: Duration,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            chars_per_change: DEFAULT_CHARS_PER_CHANGE,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
        }
    }
}

impl AnimatorConfig {
    /// Set the per-heartbeat insertion budget.
    #[must_use]
    pub const fn with_chars_per_change(mut self, chars: usize) -> Self {
        self.chars_per_change = chars;
        self
    }

    /// Set the delay between heartbeats.
    #[must_use]
    pub const fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    /// Check that the animation can make progress.
    ///
    /// # Errors
    ///
    /// A zero budget would never insert anything and a zero interval would
    /// spin; both are rejected.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.chars_per_change == 0 {
            return Err(ConfigError::ZeroBudget);
        }
        if self.heartbeat_interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(self)
    }
}
