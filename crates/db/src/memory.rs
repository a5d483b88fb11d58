//! Process-local [`SessionStore`] backed by hash maps.
//!
//! Behaves like the PostgreSQL store for everything the dialogue engine
//! relies on (cascade delete, guarded status updates, monotonic message
//! timestamps) and loses everything on restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use huddle_core::feedback::FeedbackReport;
use huddle_core::roster::ParticipantKind;
use huddle_core::session::SessionStatus;
use huddle_core::types::{DbId, Timestamp};
use sqlx::types::Json;
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::models::message::{Message, NewMessage};
use crate::models::participant::{NewParticipant, Participant};
use crate::models::session::{NewSession, Session, StatusUpdate};
use crate::store::SessionStore;

#[derive(Default)]
struct MemoryState {
    sessions: HashMap<String, Session>,
    participants: HashMap<String, Vec<Participant>>,
    messages: HashMap<String, Vec<Message>>,
    last_session_id: DbId,
    last_participant_id: DbId,
    last_message_id: DbId,
}

fn next_id(counter: &mut DbId) -> DbId {
    *counter += 1;
    *counter
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a participant row verbatim, bypassing the roster invariant.
    ///
    /// Only useful for seeding fixtures that model damaged data.
    pub async fn seed_participant(&self, participant: Participant) {
        let mut state = self.state.write().await;
        state.last_participant_id = state.last_participant_id.max(participant.id);
        state
            .participants
            .entry(participant.session_id.clone())
            .or_default()
            .push(participant);
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn create_session(&self, input: &NewSession) -> StoreResult<Session> {
        let mut state = self.state.write().await;
        if state.sessions.contains_key(&input.session_id) {
            return Err(StoreError::Duplicate("uq_sessions_session_id".into()));
        }
        let session = Session {
            id: next_id(&mut state.last_session_id),
            session_id: input.session_id.clone(),
            topic: input.topic.clone(),
            scheduled_at: input.scheduled_at,
            simulated_count: input.simulated_count,
            human_count: input.human_count,
            join_link: input.join_link.clone(),
            status: SessionStatus::Scheduled.as_str().to_string(),
            created_by: input.created_by.clone(),
            participants: serde_json::Value::Array(Vec::new()),
            transcript: serde_json::Value::Array(Vec::new()),
            feedback: None,
            started_at: None,
            completed_at: None,
            duration_secs: None,
            created_at: Utc::now(),
        };
        state
            .sessions
            .insert(session.session_id.clone(), session.clone());
        Ok(session)
    }

    async fn get_session(&self, session_id: &str) -> StoreResult<Option<Session>> {
        Ok(self.state.read().await.sessions.get(session_id).cloned())
    }

    async fn list_sessions_by_status(&self, status: SessionStatus) -> StoreResult<Vec<Session>> {
        let state = self.state.read().await;
        let mut sessions: Vec<Session> = state
            .sessions
            .values()
            .filter(|s| s.status == status.as_str())
            .cloned()
            .collect();
        sessions.sort_by_key(|s| (s.created_at, s.id));
        Ok(sessions)
    }

    async fn update_status(
        &self,
        session_id: &str,
        update: &StatusUpdate,
    ) -> StoreResult<Option<Session>> {
        let mut state = self.state.write().await;
        let Some(session) = state.sessions.get_mut(session_id) else {
            return Ok(None);
        };
        if session.status != update.expected.as_str() {
            return Ok(None);
        }
        session.status = update.status.as_str().to_string();
        if update.started_at.is_some() {
            session.started_at = update.started_at;
        }
        if update.completed_at.is_some() {
            session.completed_at = update.completed_at;
        }
        if update.duration_secs.is_some() {
            session.duration_secs = update.duration_secs;
        }
        Ok(Some(session.clone()))
    }

    async fn save_snapshots(
        &self,
        session_id: &str,
        participants: &serde_json::Value,
        transcript: &serde_json::Value,
    ) -> StoreResult<Option<Session>> {
        let mut state = self.state.write().await;
        Ok(state.sessions.get_mut(session_id).map(|session| {
            session.participants = participants.clone();
            session.transcript = transcript.clone();
            session.clone()
        }))
    }

    async fn save_feedback(
        &self,
        session_id: &str,
        report: &FeedbackReport,
    ) -> StoreResult<Option<Session>> {
        let mut state = self.state.write().await;
        Ok(state.sessions.get_mut(session_id).map(|session| {
            session.feedback = Some(Json(report.clone()));
            session.clone()
        }))
    }

    async fn delete_session(&self, session_id: &str) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let removed = state.sessions.remove(session_id).is_some();
        state.participants.remove(session_id);
        state.messages.remove(session_id);
        Ok(removed)
    }

    async fn list_participants(&self, session_id: &str) -> StoreResult<Vec<Participant>> {
        let state = self.state.read().await;
        Ok(state
            .participants
            .get(session_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn add_participant(&self, input: &NewParticipant) -> StoreResult<Participant> {
        let simulated = input.kind == ParticipantKind::Simulated;
        if simulated != input.personality.is_some() {
            return Err(StoreError::Corrupt(format!(
                "participant '{}' of kind {} has personality {:?}",
                input.name, input.kind, input.personality
            )));
        }
        let mut state = self.state.write().await;
        if !state.sessions.contains_key(&input.session_id) {
            return Err(StoreError::MissingSession(input.session_id.clone()));
        }
        let participant = Participant {
            id: next_id(&mut state.last_participant_id),
            session_id: input.session_id.clone(),
            name: input.name.clone(),
            kind: input.kind.as_str().to_string(),
            personality: input.personality.map(|p| p.as_str().to_string()),
            joined_at: Utc::now(),
            is_active: true,
        };
        state
            .participants
            .entry(input.session_id.clone())
            .or_default()
            .push(participant.clone());
        Ok(participant)
    }

    async fn set_participant_active(
        &self,
        session_id: &str,
        participant_id: DbId,
        active: bool,
    ) -> StoreResult<Option<Participant>> {
        let mut state = self.state.write().await;
        let found = state
            .participants
            .get_mut(session_id)
            .and_then(|roster| roster.iter_mut().find(|p| p.id == participant_id))
            .map(|participant| {
                participant.is_active = active;
                participant.clone()
            });
        Ok(found)
    }

    async fn list_messages(&self, session_id: &str) -> StoreResult<Vec<Message>> {
        let state = self.state.read().await;
        Ok(state.messages.get(session_id).cloned().unwrap_or_default())
    }

    async fn recent_messages(&self, session_id: &str, limit: usize) -> StoreResult<Vec<Message>> {
        let state = self.state.read().await;
        let all = state.messages.get(session_id).map(Vec::as_slice).unwrap_or(&[]);
        let start = all.len().saturating_sub(limit);
        Ok(all[start..].to_vec())
    }

    async fn list_messages_between(
        &self,
        session_id: &str,
        from: Timestamp,
        to: Timestamp,
    ) -> StoreResult<Vec<Message>> {
        let state = self.state.read().await;
        Ok(state
            .messages
            .get(session_id)
            .map(|all| {
                all.iter()
                    .filter(|m| m.created_at >= from && m.created_at <= to)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn append_message(&self, input: &NewMessage) -> StoreResult<Message> {
        let mut state = self.state.write().await;
        if !state.sessions.contains_key(&input.session_id) {
            return Err(StoreError::MissingSession(input.session_id.clone()));
        }
        let id = next_id(&mut state.last_message_id);
        let log = state.messages.entry(input.session_id.clone()).or_default();
        let now = Utc::now();
        let created_at = log.last().map_or(now, |last| last.created_at.max(now));
        let message = Message {
            id,
            session_id: input.session_id.clone(),
            speaker: input.speaker.clone(),
            message: input.message.clone(),
            channel: input.channel.as_str().to_string(),
            is_simulated: input.is_simulated,
            personality: input.personality.map(|p| p.as_str().to_string()),
            created_at,
        };
        log.push(message.clone());
        Ok(message)
    }
}
