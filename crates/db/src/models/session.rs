//! Session entity model and DTOs.

use huddle_core::error::CoreError;
use huddle_core::feedback::FeedbackReport;
use huddle_core::session::SessionStatus;
use huddle_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `sessions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Session {
    pub id: DbId,
    /// Short shareable code; the key every other record hangs off.
    pub session_id: String,
    pub topic: String,
    pub scheduled_at: Timestamp,
    pub simulated_count: i32,
    pub human_count: i32,
    pub join_link: String,
    /// Raw status text; use [`Session::status`] for the typed value.
    pub status: String,
    pub created_by: String,
    // -- Denormalized snapshots, written when the session completes --
    pub participants: serde_json::Value,
    pub transcript: serde_json::Value,
    /// Last generated feedback report, if any.
    pub feedback: Option<Json<FeedbackReport>>,
    // -- Timing --
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub duration_secs: Option<i32>,
    pub created_at: Timestamp,
}

impl Session {
    pub fn status(&self) -> Result<SessionStatus, CoreError> {
        self.status.parse()
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status(), Ok(SessionStatus::Active))
    }

    pub fn feedback_report(&self) -> Option<&FeedbackReport> {
        self.feedback.as_ref().map(|json| &json.0)
    }
}

/// DTO for inserting a new session. Status always starts at `scheduled`.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub session_id: String,
    pub topic: String,
    pub scheduled_at: Timestamp,
    pub simulated_count: i32,
    pub human_count: i32,
    pub join_link: String,
    pub created_by: String,
}

/// A guarded status change.
///
/// Applied only while the stored status still equals `expected`, so two
/// racing transitions cannot both succeed. `None` timing fields leave the
/// stored value untouched.
#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub expected: SessionStatus,
    pub status: SessionStatus,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub duration_secs: Option<i32>,
}
