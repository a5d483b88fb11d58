//! Shared fixtures for dialogue engine tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use huddle_core::feedback::FeedbackReport;
use huddle_core::message::{AppendMessageRequest, MessageChannel};
use huddle_core::personality::Personality;
use huddle_core::random::SequenceRandom;
use huddle_core::session::{CreateSessionRequest, SessionStatus};
use huddle_core::types::{DbId, Timestamp};
use huddle_db::models::message::{Message, NewMessage};
use huddle_db::models::participant::{NewParticipant, Participant};
use huddle_db::models::session::{NewSession, Session, StatusUpdate};
use huddle_db::{MemoryStore, SessionStore, StoreError, StoreResult};
use huddle_dialogue::{DialogueEngine, LifecycleConfig, SchedulerConfig};
use huddle_llm::{GenerationError, ReplyRequest, ResponseGenerator};

/// A generator that answers from a script and records every call.
///
/// By default each personality replies `"<display name> reply"` and
/// feedback generation fails.
#[derive(Default)]
pub struct ScriptedGenerator {
    replies: Mutex<HashMap<Personality, String>>,
    failing: Mutex<HashSet<Personality>>,
    feedback: Mutex<Option<String>>,
    reply_calls: Mutex<Vec<ReplyRequest>>,
    feedback_calls: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(self, personality: Personality, text: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .insert(personality, text.to_string());
        self
    }

    pub fn failing_for(self, personality: Personality) -> Self {
        self.failing.lock().unwrap().insert(personality);
        self
    }

    pub fn with_feedback(self, raw: &str) -> Self {
        *self.feedback.lock().unwrap() = Some(raw.to_string());
        self
    }

    pub fn reply_calls(&self) -> Vec<ReplyRequest> {
        self.reply_calls.lock().unwrap().clone()
    }

    pub fn feedback_calls(&self) -> Vec<String> {
        self.feedback_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResponseGenerator for ScriptedGenerator {
    async fn generate_reply(&self, request: &ReplyRequest) -> Result<String, GenerationError> {
        self.reply_calls.lock().unwrap().push(request.clone());
        if self.failing.lock().unwrap().contains(&request.personality) {
            return Err(GenerationError::Api {
                status: 503,
                body: "overloaded".into(),
            });
        }
        Ok(self
            .replies
            .lock()
            .unwrap()
            .get(&request.personality)
            .cloned()
            .unwrap_or_else(|| format!("{} reply", request.personality.display_name())))
    }

    async fn generate_structured_feedback(&self, prompt: &str) -> Result<String, GenerationError> {
        self.feedback_calls.lock().unwrap().push(prompt.to_string());
        self.feedback
            .lock()
            .unwrap()
            .clone()
            .ok_or(GenerationError::MissingApiKey)
    }
}

pub struct Harness {
    pub engine: DialogueEngine,
    pub store: Arc<MemoryStore>,
    pub generator: Arc<ScriptedGenerator>,
}

/// Build an engine over a fresh `MemoryStore`.
///
/// Session codes consume six values from `random` before any delay or pick
/// does.
pub fn harness(generator: ScriptedGenerator, random: SequenceRandom) -> Harness {
    harness_over(generator, random, SchedulerConfig::default(), |store| store)
}

/// Like [`harness`], with custom timing and the engine's store built from
/// the shared `MemoryStore` by `wrap`.
pub fn harness_over(
    generator: ScriptedGenerator,
    random: SequenceRandom,
    scheduler: SchedulerConfig,
    wrap: fn(Arc<MemoryStore>) -> Arc<dyn SessionStore>,
) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let generator = Arc::new(generator);
    let engine = DialogueEngine::new(
        wrap(store.clone()),
        generator.clone(),
        Arc::new(random),
        LifecycleConfig {
            public_base_url: "https://huddle.test".to_string(),
            ..LifecycleConfig::default()
        },
        scheduler,
    );
    Harness {
        engine,
        store,
        generator,
    }
}

/// Delegates to a `MemoryStore` but cannot write snapshots.
pub struct SnapshotlessStore(pub Arc<MemoryStore>);

#[async_trait]
impl SessionStore for SnapshotlessStore {
    async fn health_check(&self) -> StoreResult<()> {
        self.0.health_check().await
    }

    async fn create_session(&self, input: &NewSession) -> StoreResult<Session> {
        self.0.create_session(input).await
    }

    async fn get_session(&self, session_id: &str) -> StoreResult<Option<Session>> {
        self.0.get_session(session_id).await
    }

    async fn list_sessions_by_status(&self, status: SessionStatus) -> StoreResult<Vec<Session>> {
        self.0.list_sessions_by_status(status).await
    }

    async fn update_status(
        &self,
        session_id: &str,
        update: &StatusUpdate,
    ) -> StoreResult<Option<Session>> {
        self.0.update_status(session_id, update).await
    }

    async fn save_snapshots(
        &self,
        _session_id: &str,
        _participants: &serde_json::Value,
        _transcript: &serde_json::Value,
    ) -> StoreResult<Option<Session>> {
        Err(StoreError::Corrupt("snapshot column unavailable".into()))
    }

    async fn save_feedback(
        &self,
        session_id: &str,
        report: &FeedbackReport,
    ) -> StoreResult<Option<Session>> {
        self.0.save_feedback(session_id, report).await
    }

    async fn delete_session(&self, session_id: &str) -> StoreResult<bool> {
        self.0.delete_session(session_id).await
    }

    async fn list_participants(&self, session_id: &str) -> StoreResult<Vec<Participant>> {
        self.0.list_participants(session_id).await
    }

    async fn add_participant(&self, input: &NewParticipant) -> StoreResult<Participant> {
        self.0.add_participant(input).await
    }

    async fn set_participant_active(
        &self,
        session_id: &str,
        participant_id: DbId,
        active: bool,
    ) -> StoreResult<Option<Participant>> {
        self.0
            .set_participant_active(session_id, participant_id, active)
            .await
    }

    async fn list_messages(&self, session_id: &str) -> StoreResult<Vec<Message>> {
        self.0.list_messages(session_id).await
    }

    async fn recent_messages(&self, session_id: &str, limit: usize) -> StoreResult<Vec<Message>> {
        self.0.recent_messages(session_id, limit).await
    }

    async fn list_messages_between(
        &self,
        session_id: &str,
        from: Timestamp,
        to: Timestamp,
    ) -> StoreResult<Vec<Message>> {
        self.0.list_messages_between(session_id, from, to).await
    }

    async fn append_message(&self, input: &NewMessage) -> StoreResult<Message> {
        self.0.append_message(input).await
    }
}

pub fn create_request(topic: &str, simulated: Option<i32>) -> CreateSessionRequest {
    CreateSessionRequest {
        topic: topic.to_string(),
        scheduled_at: Utc::now(),
        simulated_count: simulated,
        human_count: None,
        created_by: "host@example.com".to_string(),
    }
}

pub fn human(text: &str) -> AppendMessageRequest {
    AppendMessageRequest {
        speaker: "You".to_string(),
        message: text.to_string(),
        channel: MessageChannel::Text,
    }
}
