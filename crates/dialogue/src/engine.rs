//! The facade the transport layer drives.
//!
//! Ties status changes to their side effects: activating a session starts
//! its watchdog, completing it stops the watchdog and writes the roster and
//! transcript snapshots, and a human message starts a reply round.

use std::sync::Arc;
use std::time::Duration;

use huddle_core::error::CoreError;
use huddle_core::feedback::FeedbackReport;
use huddle_core::message::{AppendMessageRequest, TriggerReplyRequest};
use huddle_core::personality::Personality;
use huddle_core::random::RandomSource;
use huddle_core::roster::AddParticipantRequest;
use huddle_core::session::{CreateSessionRequest, SessionStatus};
use huddle_core::transcript::{SessionStats, TranscriptEntry};
use huddle_core::types::{DbId, Timestamp};
use huddle_db::models::message::{Message, NewMessage};
use huddle_db::models::participant::Participant;
use huddle_db::models::session::Session;
use huddle_db::SessionStore;
use huddle_llm::ResponseGenerator;
use serde::Serialize;
use validator::Validate;

use crate::config::{LifecycleConfig, SchedulerConfig};
use crate::feedback::FeedbackAggregator;
use crate::lifecycle::SessionLifecycle;
use crate::scheduler::{ReplyRound, TurnScheduler};
use crate::watchdog::WatchdogRegistry;

/// Everything shown on a session's summary page.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub session: Session,
    pub feedback: Option<FeedbackReport>,
    pub transcript: Vec<TranscriptEntry>,
    pub stats: SessionStats,
}

pub struct DialogueEngine {
    store: Arc<dyn SessionStore>,
    lifecycle: SessionLifecycle,
    scheduler: TurnScheduler,
    watchdogs: WatchdogRegistry,
    feedback: FeedbackAggregator,
}

impl DialogueEngine {
    pub fn new(
        store: Arc<dyn SessionStore>,
        generator: Arc<dyn ResponseGenerator>,
        random: Arc<dyn RandomSource>,
        lifecycle_config: LifecycleConfig,
        scheduler_config: SchedulerConfig,
    ) -> Self {
        let lifecycle =
            SessionLifecycle::new(Arc::clone(&store), Arc::clone(&random), lifecycle_config);
        let scheduler = TurnScheduler::new(
            Arc::clone(&store),
            Arc::clone(&generator),
            random,
            scheduler_config,
        );
        Self {
            watchdogs: WatchdogRegistry::new(scheduler.clone()),
            feedback: FeedbackAggregator::new(generator),
            store,
            lifecycle,
            scheduler,
        }
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn scheduler(&self) -> &TurnScheduler {
        &self.scheduler
    }

    pub fn watchdogs(&self) -> &WatchdogRegistry {
        &self.watchdogs
    }

    // -- Sessions --

    pub async fn create_session(&self, input: &CreateSessionRequest) -> Result<Session, CoreError> {
        self.lifecycle.create_session(input).await
    }

    pub async fn get_session(&self, session_id: &str) -> Result<Session, CoreError> {
        self.lifecycle.get_session(session_id).await
    }

    pub async fn list_sessions(&self, status: SessionStatus) -> Result<Vec<Session>, CoreError> {
        self.lifecycle.list_sessions(status).await
    }

    /// Change status and apply the side effects of the new state.
    pub async fn transition(
        &self,
        session_id: &str,
        target: SessionStatus,
    ) -> Result<Session, CoreError> {
        let session = self.lifecycle.transition(session_id, target).await?;
        match target {
            SessionStatus::Scheduled => Ok(session),
            SessionStatus::Active => {
                self.watchdogs.start(session_id);
                Ok(session)
            }
            SessionStatus::Completed => {
                self.watchdogs.stop(session_id);
                // The status change is already committed; a snapshot failure
                // must not turn it into an error the caller cannot retry.
                match self.write_snapshots(session_id).await {
                    Ok(Some(updated)) => Ok(updated),
                    Ok(None) => Ok(session),
                    Err(e) => {
                        tracing::error!(
                            session_id = %session_id,
                            error = %e,
                            "Snapshot write failed, session completed without snapshots",
                        );
                        Ok(session)
                    }
                }
            }
        }
    }

    async fn write_snapshots(&self, session_id: &str) -> Result<Option<Session>, CoreError> {
        let participants = self.store.list_participants(session_id).await?;
        let transcript = self.transcript_of(session_id).await?;

        let participants = serde_json::to_value(&participants)
            .map_err(|e| CoreError::Internal(format!("Roster snapshot: {e}")))?;
        let transcript = serde_json::to_value(&transcript)
            .map_err(|e| CoreError::Internal(format!("Transcript snapshot: {e}")))?;

        Ok(self
            .store
            .save_snapshots(session_id, &participants, &transcript)
            .await?)
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<(), CoreError> {
        self.watchdogs.stop(session_id);
        self.lifecycle.delete_session(session_id).await
    }

    /// Restart watchdogs for sessions left active by a previous process.
    pub async fn resume_watchdogs(&self) -> Result<usize, CoreError> {
        let active = self.lifecycle.list_sessions(SessionStatus::Active).await?;
        for session in &active {
            self.watchdogs.start(&session.session_id);
        }
        if !active.is_empty() {
            tracing::info!(count = active.len(), "Resumed watchdogs for active sessions");
        }
        Ok(active.len())
    }

    /// Stop every watchdog, waiting up to `timeout`.
    pub async fn shutdown(&self, timeout: Duration) {
        self.watchdogs.shutdown(timeout).await;
    }

    // -- Participants --

    pub async fn list_participants(&self, session_id: &str) -> Result<Vec<Participant>, CoreError> {
        self.lifecycle.list_participants(session_id).await
    }

    pub async fn add_participant(
        &self,
        session_id: &str,
        input: &AddParticipantRequest,
    ) -> Result<Participant, CoreError> {
        self.lifecycle.add_participant(session_id, input).await
    }

    pub async fn set_participant_active(
        &self,
        session_id: &str,
        participant_id: DbId,
        active: bool,
    ) -> Result<Participant, CoreError> {
        self.lifecycle
            .set_participant_active(session_id, participant_id, active)
            .await
    }

    // -- Messages --

    /// Messages in order, optionally limited to `from <= created_at <= to`.
    pub async fn list_messages(
        &self,
        session_id: &str,
        from: Option<Timestamp>,
        to: Option<Timestamp>,
    ) -> Result<Vec<Message>, CoreError> {
        self.lifecycle.get_session(session_id).await?;
        match (from, to) {
            (None, None) => Ok(self.store.list_messages(session_id).await?),
            (Some(from), Some(to)) => {
                if from > to {
                    return Err(CoreError::Validation(
                        "from must not be later than to".into(),
                    ));
                }
                Ok(self
                    .store
                    .list_messages_between(session_id, from, to)
                    .await?)
            }
            (from, to) => {
                let all = self.store.list_messages(session_id).await?;
                Ok(all
                    .into_iter()
                    .filter(|m| from.map_or(true, |f| m.created_at >= f))
                    .filter(|m| to.map_or(true, |t| m.created_at <= t))
                    .collect())
            }
        }
    }

    /// Append a human message and start the reply round it triggers.
    ///
    /// Completed sessions accept no new messages. The round is empty unless
    /// the session is active.
    pub async fn post_message(
        &self,
        session_id: &str,
        input: &AppendMessageRequest,
    ) -> Result<(Message, ReplyRound), CoreError> {
        input.validate()?;
        let session = self.lifecycle.get_session(session_id).await?;
        if session.status()? == SessionStatus::Completed {
            return Err(CoreError::Conflict(format!(
                "Session {session_id} is completed"
            )));
        }

        let message = self
            .store
            .append_message(&NewMessage::human(
                session_id,
                &input.speaker,
                &input.message,
                input.channel,
            ))
            .await?;

        let round = self.scheduler.respond_to(&session, &message).await?;
        tracing::debug!(
            session_id = %session_id,
            message_id = message.id,
            replies = round.len(),
            "Human message posted",
        );
        Ok((message, round))
    }

    /// Generate one reply for the named personality and persist it.
    pub async fn trigger_reply(
        &self,
        session_id: &str,
        input: &TriggerReplyRequest,
    ) -> Result<Message, CoreError> {
        let personality: Personality = input.personality.parse()?;
        self.scheduler
            .trigger_reply(session_id, personality, input.context.clone())
            .await
    }

    // -- Transcript and feedback --

    pub async fn transcript(&self, session_id: &str) -> Result<Vec<TranscriptEntry>, CoreError> {
        self.lifecycle.get_session(session_id).await?;
        self.transcript_of(session_id).await
    }

    async fn transcript_of(&self, session_id: &str) -> Result<Vec<TranscriptEntry>, CoreError> {
        let messages = self.store.list_messages(session_id).await?;
        Ok(messages
            .into_iter()
            .map(|m| TranscriptEntry::new(m.speaker, m.message, m.created_at))
            .collect())
    }

    /// Score the session and keep the report on it, replacing any earlier one.
    pub async fn generate_feedback(&self, session_id: &str) -> Result<FeedbackReport, CoreError> {
        let session = self.lifecycle.get_session(session_id).await?;
        let participants = self.store.list_participants(session_id).await?;
        let transcript = self.transcript_of(session_id).await?;

        let report = self
            .feedback
            .generate_feedback(&session.topic, &transcript, &participants)
            .await;
        self.store.save_feedback(session_id, &report).await?;

        tracing::info!(
            session_id = %session_id,
            scored = report.participant_feedback.len(),
            degraded = report.is_unavailable(),
            "Feedback generated",
        );
        Ok(report)
    }

    pub async fn report(&self, session_id: &str) -> Result<SessionReport, CoreError> {
        let session = self.lifecycle.get_session(session_id).await?;
        let participants = self.store.list_participants(session_id).await?;
        let transcript = self.transcript_of(session_id).await?;
        let stats = SessionStats::new(
            session.duration_secs,
            transcript.len(),
            participants.len(),
            session.completed_at,
        );
        Ok(SessionReport {
            feedback: session.feedback_report().cloned(),
            session,
            transcript,
            stats,
        })
    }
}
