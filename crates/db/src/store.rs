//! The persistence gateway contract.

use async_trait::async_trait;
use huddle_core::feedback::FeedbackReport;
use huddle_core::session::SessionStatus;
use huddle_core::types::{DbId, Timestamp};

use crate::error::StoreResult;
use crate::models::message::{Message, NewMessage};
use crate::models::participant::{NewParticipant, Participant};
use crate::models::session::{NewSession, Session, StatusUpdate};

/// Storage for sessions and the records they own, keyed by session code.
///
/// Implementations hold no business rules. They must give read-your-writes
/// within a process, keep messages append-only, and stamp each appended
/// message with a timestamp no earlier than the session's previous one.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Confirm the backend is reachable.
    async fn health_check(&self) -> StoreResult<()>;

    // -- Sessions --

    /// Insert a session in `scheduled` status. Fails with
    /// [`StoreError::Duplicate`](crate::StoreError::Duplicate) if the code is taken.
    async fn create_session(&self, input: &NewSession) -> StoreResult<Session>;

    async fn get_session(&self, session_id: &str) -> StoreResult<Option<Session>>;

    /// Sessions in the given status, oldest first.
    async fn list_sessions_by_status(&self, status: SessionStatus) -> StoreResult<Vec<Session>>;

    /// Apply a guarded status change. Returns `None` if the session does not
    /// exist or its status no longer equals `update.expected`.
    async fn update_status(
        &self,
        session_id: &str,
        update: &StatusUpdate,
    ) -> StoreResult<Option<Session>>;

    /// Overwrite the denormalized roster and transcript snapshots.
    async fn save_snapshots(
        &self,
        session_id: &str,
        participants: &serde_json::Value,
        transcript: &serde_json::Value,
    ) -> StoreResult<Option<Session>>;

    /// Replace the stored feedback report.
    async fn save_feedback(
        &self,
        session_id: &str,
        report: &FeedbackReport,
    ) -> StoreResult<Option<Session>>;

    /// Delete a session together with its participants and messages.
    async fn delete_session(&self, session_id: &str) -> StoreResult<bool>;

    // -- Participants --

    /// Roster in join order.
    async fn list_participants(&self, session_id: &str) -> StoreResult<Vec<Participant>>;

    async fn add_participant(&self, input: &NewParticipant) -> StoreResult<Participant>;

    /// Toggle a participant's active flag. Returns `None` if the participant
    /// does not belong to the session.
    async fn set_participant_active(
        &self,
        session_id: &str,
        participant_id: DbId,
        active: bool,
    ) -> StoreResult<Option<Participant>>;

    // -- Messages --

    /// Full transcript, oldest first.
    async fn list_messages(&self, session_id: &str) -> StoreResult<Vec<Message>>;

    /// The newest `limit` messages, returned oldest first.
    async fn recent_messages(&self, session_id: &str, limit: usize) -> StoreResult<Vec<Message>>;

    /// Messages with `from <= created_at <= to`, oldest first.
    async fn list_messages_between(
        &self,
        session_id: &str,
        from: Timestamp,
        to: Timestamp,
    ) -> StoreResult<Vec<Message>>;

    /// Append a message, assigning its id and timestamp.
    async fn append_message(&self, input: &NewMessage) -> StoreResult<Message>;
}
