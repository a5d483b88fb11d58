//! Turn-taking for simulated participants.
//!
//! Two triggers produce simulated replies:
//!
//! - A human message starts a *round*: every active simulated participant
//!   gets one reply, each after its own random delay.
//! - A watchdog tick that finds the latest human message unanswered for too
//!   long makes one randomly chosen simulated participant speak.
//!
//! Every reply runs as its own task. The context (the latest messages) is
//! read once per trigger, so replies within a round never see each other.
//! A failed generation skips that one turn and nothing else. Replies are
//! only written while the session is still `active`.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use huddle_core::error::CoreError;
use huddle_core::personality::Personality;
use huddle_core::random::RandomSource;
use huddle_core::types::Timestamp;
use huddle_core::watchdog::{should_nudge, LatestMessage};
use huddle_db::models::message::{Message, NewMessage};
use huddle_db::models::participant::Participant;
use huddle_db::models::session::Session;
use huddle_db::{SessionStore, StoreError};
use huddle_llm::{GenerationError, ReplyRequest, ResponseGenerator};
use tokio::task::JoinHandle;

use crate::config::SchedulerConfig;

/// Cue appended to watchdog-triggered prompts.
pub const WATCHDOG_CUE: &str = "Continue the group discussion naturally";

/// Cue appended to prompts answering a human message.
pub fn answer_cue(message: &str) -> String {
    format!("User just said: \"{message}\"")
}

/// Why a scheduled turn produced no message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The generator failed or returned nothing usable.
    Generation,
    /// The session left `active` before the reply was ready.
    SessionInactive,
    /// Reading or writing the store failed.
    Store,
    /// The turn task panicked or was aborted.
    Aborted,
}

/// Result of one scheduled turn.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyOutcome {
    Posted(Message),
    Skipped { speaker: String, reason: SkipReason },
}

impl ReplyOutcome {
    pub fn posted(&self) -> Option<&Message> {
        match self {
            ReplyOutcome::Posted(message) => Some(message),
            ReplyOutcome::Skipped { .. } => None,
        }
    }
}

/// The turns scheduled by one trigger. Dropping it leaves the turns running.
#[derive(Debug, Default)]
pub struct ReplyRound {
    handles: Vec<(String, JoinHandle<ReplyOutcome>)>,
}

impl ReplyRound {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for every turn in the round to finish.
    pub async fn join(self) -> Vec<ReplyOutcome> {
        let (speakers, handles): (Vec<String>, Vec<_>) = self.handles.into_iter().unzip();
        join_all(handles)
            .await
            .into_iter()
            .zip(speakers)
            .map(|(result, speaker)| {
                result.unwrap_or_else(|e| {
                    tracing::error!(speaker = %speaker, error = %e, "Reply task failed");
                    ReplyOutcome::Skipped {
                        speaker,
                        reason: SkipReason::Aborted,
                    }
                })
            })
            .collect()
    }
}

/// Everything one reply needs, captured at trigger time.
#[derive(Debug, Clone)]
struct Turn {
    session_id: String,
    topic: String,
    speaker: String,
    personality: Personality,
    context: Arc<Vec<String>>,
    cue: Option<String>,
}

#[derive(Debug)]
enum TurnError {
    Generation(String),
    Inactive,
    Store(StoreError),
}

impl TurnError {
    fn reason(&self) -> SkipReason {
        match self {
            TurnError::Generation(_) => SkipReason::Generation,
            TurnError::Inactive => SkipReason::SessionInactive,
            TurnError::Store(_) => SkipReason::Store,
        }
    }
}

impl From<GenerationError> for TurnError {
    fn from(err: GenerationError) -> Self {
        TurnError::Generation(err.to_string())
    }
}

impl From<StoreError> for TurnError {
    fn from(err: StoreError) -> Self {
        TurnError::Store(err)
    }
}

impl From<TurnError> for CoreError {
    fn from(err: TurnError) -> Self {
        match err {
            TurnError::Generation(msg) => CoreError::Generation(msg),
            TurnError::Inactive => CoreError::Conflict("Session is not active".into()),
            TurnError::Store(e) => e.into(),
        }
    }
}

/// Schedules and runs simulated replies.
#[derive(Clone)]
pub struct TurnScheduler {
    store: Arc<dyn SessionStore>,
    generator: Arc<dyn ResponseGenerator>,
    random: Arc<dyn RandomSource>,
    config: SchedulerConfig,
}

impl TurnScheduler {
    pub fn new(
        store: Arc<dyn SessionStore>,
        generator: Arc<dyn ResponseGenerator>,
        random: Arc<dyn RandomSource>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            store,
            generator,
            random,
            config,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Start a reply round for a newly appended message.
    ///
    /// Returns an empty round if the message is simulated, the session is not
    /// active, or no simulated participant can speak.
    pub async fn respond_to(
        &self,
        session: &Session,
        trigger: &Message,
    ) -> Result<ReplyRound, CoreError> {
        if trigger.is_simulated || !session.is_active() {
            return Ok(ReplyRound::default());
        }

        let speakers = self.simulated_speakers(&session.session_id).await?;
        if speakers.is_empty() {
            tracing::debug!(session_id = %session.session_id, "No simulated speakers, round skipped");
            return Ok(ReplyRound::default());
        }

        let context = self.context_snapshot(&session.session_id).await?;
        let cue = answer_cue(&trigger.message);
        let min_ms = self.config.reply_delay_min.as_millis() as u64;
        let max_ms = self.config.reply_delay_max.as_millis() as u64;

        let mut round = ReplyRound::default();
        for (speaker, personality) in speakers {
            let delay = Duration::from_millis(self.random.below(min_ms..max_ms));
            tracing::debug!(
                session_id = %session.session_id,
                participant = %speaker,
                delay_ms = delay.as_millis() as u64,
                "Reply scheduled",
            );
            let turn = Turn {
                session_id: session.session_id.clone(),
                topic: session.topic.clone(),
                speaker: speaker.clone(),
                personality,
                context: Arc::clone(&context),
                cue: Some(cue.clone()),
            };
            round.handles.push((speaker, self.spawn_turn(turn, delay)));
        }
        Ok(round)
    }

    /// One watchdog check at the current wall-clock time.
    pub async fn watchdog_tick(&self, session_id: &str) -> Result<ReplyRound, CoreError> {
        self.watchdog_tick_at(session_id, Utc::now()).await
    }

    /// One watchdog check as of `now`.
    ///
    /// Schedules exactly one immediate reply when the latest message is
    /// human-authored and older than the idle threshold, otherwise nothing.
    pub async fn watchdog_tick_at(
        &self,
        session_id: &str,
        now: Timestamp,
    ) -> Result<ReplyRound, CoreError> {
        let Some(session) = self.store.get_session(session_id).await? else {
            return Err(CoreError::not_found("Session", session_id));
        };
        if !session.is_active() {
            return Ok(ReplyRound::default());
        }

        let latest = self
            .store
            .recent_messages(session_id, 1)
            .await?
            .pop()
            .map(|m| LatestMessage {
                at: m.created_at,
                simulated: m.is_simulated,
            });
        if !should_nudge(latest, now, self.config.idle_threshold) {
            return Ok(ReplyRound::default());
        }

        let mut speakers = self.simulated_speakers(session_id).await?;
        if speakers.is_empty() {
            return Ok(ReplyRound::default());
        }
        let (speaker, personality) = speakers.swap_remove(self.random.pick(speakers.len()));

        tracing::info!(
            session_id = %session_id,
            participant = %speaker,
            "Conversation stalled, nudging simulated participant",
        );

        let turn = Turn {
            session_id: session.session_id.clone(),
            topic: session.topic.clone(),
            speaker: speaker.clone(),
            personality,
            context: self.context_snapshot(session_id).await?,
            cue: Some(WATCHDOG_CUE.to_string()),
        };
        let mut round = ReplyRound::default();
        round
            .handles
            .push((speaker, self.spawn_turn(turn, Duration::ZERO)));
        Ok(round)
    }

    /// Generate and persist one reply right away, on behalf of `personality`.
    ///
    /// Unlike scheduled turns, failures are returned to the caller.
    pub async fn trigger_reply(
        &self,
        session_id: &str,
        personality: Personality,
        context: Option<String>,
    ) -> Result<Message, CoreError> {
        let Some(session) = self.store.get_session(session_id).await? else {
            return Err(CoreError::not_found("Session", session_id));
        };
        if !session.is_active() {
            return Err(CoreError::Conflict(format!(
                "Session {session_id} is not active"
            )));
        }

        let turn = Turn {
            session_id: session.session_id.clone(),
            topic: session.topic.clone(),
            speaker: personality.display_name().to_string(),
            personality,
            context: self.context_snapshot(session_id).await?,
            cue: context,
        };
        Ok(self.speak(&turn).await?)
    }

    /// Active simulated participants with a recognised personality, in roster
    /// order. Entries with a missing or unknown personality are skipped.
    async fn simulated_speakers(
        &self,
        session_id: &str,
    ) -> Result<Vec<(String, Personality)>, CoreError> {
        let roster = self.store.list_participants(session_id).await?;
        Ok(roster
            .into_iter()
            .filter(|p| p.is_simulated() && p.is_active)
            .filter_map(|p| speaker_of(session_id, p))
            .collect())
    }

    async fn context_snapshot(&self, session_id: &str) -> Result<Arc<Vec<String>>, CoreError> {
        let recent = self
            .store
            .recent_messages(session_id, self.config.context_window)
            .await?;
        Ok(Arc::new(
            recent.iter().map(Message::as_context_line).collect(),
        ))
    }

    fn spawn_turn(&self, turn: Turn, delay: Duration) -> JoinHandle<ReplyOutcome> {
        let scheduler = self.clone();
        tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            scheduler.run_turn(turn).await
        })
    }

    /// Run a scheduled turn, logging and swallowing any failure.
    async fn run_turn(&self, turn: Turn) -> ReplyOutcome {
        match self.speak(&turn).await {
            Ok(message) => ReplyOutcome::Posted(message),
            Err(err) => {
                match &err {
                    TurnError::Generation(e) => tracing::warn!(
                        session_id = %turn.session_id,
                        participant = %turn.speaker,
                        error = %e,
                        "Reply generation failed, turn skipped",
                    ),
                    TurnError::Inactive => tracing::info!(
                        session_id = %turn.session_id,
                        participant = %turn.speaker,
                        "Session no longer active, reply discarded",
                    ),
                    TurnError::Store(e) => tracing::error!(
                        session_id = %turn.session_id,
                        participant = %turn.speaker,
                        error = %e,
                        "Failed to persist reply",
                    ),
                }
                ReplyOutcome::Skipped {
                    reason: err.reason(),
                    speaker: turn.speaker,
                }
            }
        }
    }

    /// Generate, check the session is still active, then append.
    async fn speak(&self, turn: &Turn) -> Result<Message, TurnError> {
        let request = ReplyRequest {
            topic: turn.topic.clone(),
            personality: turn.personality,
            recent_messages: turn.context.as_ref().clone(),
            cue: turn.cue.clone(),
        };
        let reply = self.generator.generate_reply(&request).await?;
        let text = reply.trim();
        if text.is_empty() {
            return Err(GenerationError::EmptyResponse.into());
        }

        match self.store.get_session(&turn.session_id).await? {
            Some(session) if session.is_active() => {}
            _ => return Err(TurnError::Inactive),
        }

        let message = self
            .store
            .append_message(&NewMessage::simulated(
                &turn.session_id,
                &turn.speaker,
                turn.personality,
                text,
            ))
            .await?;

        tracing::debug!(
            session_id = %turn.session_id,
            participant = %turn.speaker,
            message_id = message.id,
            "Simulated reply posted",
        );
        Ok(message)
    }
}

fn speaker_of(session_id: &str, participant: Participant) -> Option<(String, Personality)> {
    match participant.personality() {
        Some(personality) => Some((participant.name, personality)),
        None => {
            tracing::warn!(
                session_id = %session_id,
                participant = %participant.name,
                personality = ?participant.personality,
                "Unrecognised personality, participant skipped",
            );
            None
        }
    }
}
