//! Configuration types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for file tailing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TailConfig {
    /// Debounce window for filesystem notifications, in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Fallback re-check interval in milliseconds. 0 disables polling.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Hold back an unterminated final fragment until its newline arrives.
    ///
    /// This applies to the snapshot taken at open too: a file whose last
    /// line has no newline opens without that line, and it appears once the
    /// newline is written.
    #[serde(default)]
    pub hold_partial_lines: bool,
}

fn default_debounce_ms() -> u64 {
    100
}

fn default_poll_interval_ms() -> u64 {
    1000
}

impl Default for TailConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            hold_partial_lines: false,
        }
    }
}

impl TailConfig {
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Polling period, or `None` when polling is disabled.
    #[must_use]
    pub fn poll_interval(&self) -> Option<Duration> {
        (self.poll_interval_ms > 0).then(|| Duration::from_millis(self.poll_interval_ms))
    }
}

/// Defaults applied to newly opened sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Initial follow-tail flag.
    #[serde(default = "default_true")]
    pub follow_tail: bool,
}

fn default_true() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { follow_tail: true }
    }
}

/// Terminal output settings for the `tailview` binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Colorize category tags and badges.
    #[serde(default = "default_true")]
    pub color: bool,

    /// Prefix live-appended lines with their arrival time.
    #[serde(default = "default_true")]
    pub timestamps: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: true,
            timestamps: true,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default)]
    pub tail: TailConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}
