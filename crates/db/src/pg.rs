//! PostgreSQL-backed [`SessionStore`].

use async_trait::async_trait;
use huddle_core::feedback::FeedbackReport;
use huddle_core::session::SessionStatus;
use huddle_core::types::{DbId, Timestamp};

use crate::error::{StoreError, StoreResult};
use crate::models::message::{Message, NewMessage};
use crate::models::participant::{NewParticipant, Participant};
use crate::models::session::{NewSession, Session, StatusUpdate};
use crate::repositories::{MessageRepo, ParticipantRepo, SessionRepo};
use crate::store::SessionStore;
use crate::DbPool;

/// Durable store delegating to the per-table repositories.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn health_check(&self) -> StoreResult<()> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }

    async fn create_session(&self, input: &NewSession) -> StoreResult<Session> {
        SessionRepo::create(&self.pool, input)
            .await
            .map_err(|e| StoreError::from_sqlx(e, &input.session_id))
    }

    async fn get_session(&self, session_id: &str) -> StoreResult<Option<Session>> {
        Ok(SessionRepo::find_by_session_id(&self.pool, session_id).await?)
    }

    async fn list_sessions_by_status(&self, status: SessionStatus) -> StoreResult<Vec<Session>> {
        Ok(SessionRepo::list_by_status(&self.pool, status).await?)
    }

    async fn update_status(
        &self,
        session_id: &str,
        update: &StatusUpdate,
    ) -> StoreResult<Option<Session>> {
        Ok(SessionRepo::update_status(&self.pool, session_id, update).await?)
    }

    async fn save_snapshots(
        &self,
        session_id: &str,
        participants: &serde_json::Value,
        transcript: &serde_json::Value,
    ) -> StoreResult<Option<Session>> {
        Ok(SessionRepo::save_snapshots(&self.pool, session_id, participants, transcript).await?)
    }

    async fn save_feedback(
        &self,
        session_id: &str,
        report: &FeedbackReport,
    ) -> StoreResult<Option<Session>> {
        Ok(SessionRepo::save_feedback(&self.pool, session_id, report).await?)
    }

    async fn delete_session(&self, session_id: &str) -> StoreResult<bool> {
        Ok(SessionRepo::delete(&self.pool, session_id).await?)
    }

    async fn list_participants(&self, session_id: &str) -> StoreResult<Vec<Participant>> {
        Ok(ParticipantRepo::list_by_session(&self.pool, session_id).await?)
    }

    async fn add_participant(&self, input: &NewParticipant) -> StoreResult<Participant> {
        ParticipantRepo::create(&self.pool, input)
            .await
            .map_err(|e| StoreError::from_sqlx(e, &input.session_id))
    }

    async fn set_participant_active(
        &self,
        session_id: &str,
        participant_id: DbId,
        active: bool,
    ) -> StoreResult<Option<Participant>> {
        Ok(ParticipantRepo::set_active(&self.pool, session_id, participant_id, active).await?)
    }

    async fn list_messages(&self, session_id: &str) -> StoreResult<Vec<Message>> {
        Ok(MessageRepo::list_by_session(&self.pool, session_id).await?)
    }

    async fn recent_messages(&self, session_id: &str, limit: usize) -> StoreResult<Vec<Message>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        Ok(MessageRepo::list_recent(&self.pool, session_id, limit).await?)
    }

    async fn list_messages_between(
        &self,
        session_id: &str,
        from: Timestamp,
        to: Timestamp,
    ) -> StoreResult<Vec<Message>> {
        Ok(MessageRepo::list_between(&self.pool, session_id, from, to).await?)
    }

    async fn append_message(&self, input: &NewMessage) -> StoreResult<Message> {
        MessageRepo::append(&self.pool, input)
            .await
            .map_err(|e| StoreError::from_sqlx(e, &input.session_id))
    }
}
