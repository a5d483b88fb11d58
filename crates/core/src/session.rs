//! Session lifecycle constants, status state machine and creation input.
//!
//! This module lives in `core` (zero internal deps) so the persistence layer,
//! the dialogue engine and the HTTP API all agree on the same rules.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::random::RandomSource;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Simulated participants requested when the creator does not say.
pub const DEFAULT_SIMULATED_COUNT: i32 = 2;

/// Human participants expected when the creator does not say.
pub const DEFAULT_HUMAN_COUNT: i32 = 3;

/// Length of the shareable session code.
pub const SESSION_CODE_LENGTH: usize = 6;

/// Characters a session code is drawn from (lowercase base-36).
const SESSION_CODE_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a session. Stored as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Scheduled,
    Active,
    Completed,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Scheduled => "scheduled",
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(SessionStatus::Scheduled),
            "active" => Ok(SessionStatus::Active),
            "completed" => Ok(SessionStatus::Completed),
            other => Err(CoreError::Validation(format!(
                "Unknown session status '{other}' (expected scheduled, active or completed)"
            ))),
        }
    }
}

/// Forward-only status transitions.
pub mod state_machine {
    use super::SessionStatus;
    use crate::error::CoreError;

    /// Returns the set of statuses reachable from `from` in one step.
    ///
    /// `Completed` is terminal.
    pub fn valid_transitions(from: SessionStatus) -> &'static [SessionStatus] {
        match from {
            SessionStatus::Scheduled => &[SessionStatus::Active],
            SessionStatus::Active => &[SessionStatus::Completed],
            SessionStatus::Completed => &[],
        }
    }

    /// Check whether a transition from `from` to `to` is valid.
    pub fn can_transition(from: SessionStatus, to: SessionStatus) -> bool {
        valid_transitions(from).contains(&to)
    }

    /// Validate a state transition, returning
    /// [`CoreError::InvalidTransition`] for illegal ones.
    pub fn validate_transition(from: SessionStatus, to: SessionStatus) -> Result<(), CoreError> {
        if can_transition(from, to) {
            Ok(())
        } else {
            Err(CoreError::InvalidTransition {
                from: from.to_string(),
                to: to.to_string(),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Creation input
// ---------------------------------------------------------------------------

/// Input for scheduling a new session.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSessionRequest {
    #[validate(length(min = 1, max = 500, message = "topic must be 1-500 characters"))]
    pub topic: String,
    pub scheduled_at: Timestamp,
    /// Defaults to [`DEFAULT_SIMULATED_COUNT`].
    #[validate(range(min = 1, max = 5, message = "simulated_count must be between 1 and 5"))]
    pub simulated_count: Option<i32>,
    /// Defaults to [`DEFAULT_HUMAN_COUNT`].
    #[validate(range(min = 1, max = 6, message = "human_count must be between 1 and 6"))]
    pub human_count: Option<i32>,
    #[validate(length(min = 1, max = 200, message = "created_by must be 1-200 characters"))]
    pub created_by: String,
}

impl CreateSessionRequest {
    pub fn simulated_count(&self) -> i32 {
        self.simulated_count.unwrap_or(DEFAULT_SIMULATED_COUNT)
    }

    pub fn human_count(&self) -> i32 {
        self.human_count.unwrap_or(DEFAULT_HUMAN_COUNT)
    }
}

// ---------------------------------------------------------------------------
// Identifiers and links
// ---------------------------------------------------------------------------

/// Generate a short, shareable session code.
///
/// Six base-36 characters give ~2.2 billion codes; callers still check for
/// collisions against the store and retry.
pub fn generate_session_code(random: &dyn RandomSource) -> String {
    (0..SESSION_CODE_LENGTH)
        .map(|_| SESSION_CODE_ALPHABET[random.pick(SESSION_CODE_ALPHABET.len())] as char)
        .collect()
}

/// Build the shareable join link for a session code.
pub fn join_link(public_base_url: &str, session_id: &str) -> String {
    format!("{}/join/{session_id}", public_base_url.trim_end_matches('/'))
}

/// Whole seconds elapsed between start and completion, never negative.
pub fn duration_secs(started_at: Timestamp, completed_at: Timestamp) -> i32 {
    let secs = (completed_at - started_at).num_seconds().max(0);
    i32::try_from(secs).unwrap_or(i32::MAX)
}
