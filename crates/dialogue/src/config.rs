//! Timing and identity settings for the dialogue engine.

use std::time::Duration;

use huddle_core::watchdog::{DEFAULT_IDLE_THRESHOLD, DEFAULT_WATCHDOG_INTERVAL};

/// Lower bound of the per-reply delay (inclusive).
pub const DEFAULT_REPLY_DELAY_MIN: Duration = Duration::from_millis(1000);

/// Upper bound of the per-reply delay (exclusive).
pub const DEFAULT_REPLY_DELAY_MAX: Duration = Duration::from_millis(4000);

/// Messages handed to the generator as context.
pub const DEFAULT_CONTEXT_WINDOW: usize = 10;

/// Collision retries when drawing a session code.
pub const DEFAULT_CODE_ATTEMPTS: u32 = 5;

/// Turn-taking and watchdog timing.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Each reply waits a delay drawn uniformly from `[min, max)`.
    pub reply_delay_min: Duration,
    pub reply_delay_max: Duration,
    pub context_window: usize,
    pub watchdog_interval: Duration,
    /// A human message older than this with no answer counts as a stall.
    pub idle_threshold: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            reply_delay_min: DEFAULT_REPLY_DELAY_MIN,
            reply_delay_max: DEFAULT_REPLY_DELAY_MAX,
            context_window: DEFAULT_CONTEXT_WINDOW,
            watchdog_interval: DEFAULT_WATCHDOG_INTERVAL,
            idle_threshold: DEFAULT_IDLE_THRESHOLD,
        }
    }
}

/// Settings used when creating sessions.
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// Prefix for join links, e.g. `https://huddle.example`.
    pub public_base_url: String,
    pub max_code_attempts: u32,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            public_base_url: "http://localhost:3000".to_string(),
            max_code_attempts: DEFAULT_CODE_ATTEMPTS,
        }
    }
}
