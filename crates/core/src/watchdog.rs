//! Idle detection for active sessions.
//!
//! A session stalls when a human has spoken and nobody has answered for a
//! while. The watchdog only ever answers humans; it never keeps a
//! conversation between simulated speakers going on its own.

use std::time::Duration;

use crate::types::Timestamp;

/// How often the watchdog looks at a session.
pub const DEFAULT_WATCHDOG_INTERVAL: Duration = Duration::from_secs(20);

/// Age past which the latest human message counts as unanswered.
pub const DEFAULT_IDLE_THRESHOLD: Duration = Duration::from_secs(15);

/// The facts about the latest message the decision needs.
#[derive(Debug, Clone, Copy)]
pub struct LatestMessage {
    pub at: Timestamp,
    pub simulated: bool,
}

/// Decide whether a nudge reply is due.
///
/// True only when the latest message exists, was human-authored and is
/// strictly older than `idle_threshold` at `now`.
pub fn should_nudge(latest: Option<LatestMessage>, now: Timestamp, idle_threshold: Duration) -> bool {
    let Some(latest) = latest else {
        return false;
    };
    if latest.simulated {
        return false;
    }
    let Ok(age) = (now - latest.at).to_std() else {
        // Message stamped in the future relative to `now`.
        return false;
    };
    age > idle_threshold
}
