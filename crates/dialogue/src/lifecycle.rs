//! Session creation, roster assembly and status transitions.

use std::sync::Arc;

use chrono::Utc;
use huddle_core::error::CoreError;
use huddle_core::random::RandomSource;
use huddle_core::roster::{plan_simulated_roster, AddParticipantRequest};
use huddle_core::session::{
    duration_secs, generate_session_code, join_link, state_machine, CreateSessionRequest,
    SessionStatus,
};
use huddle_core::types::DbId;
use huddle_db::models::participant::{NewParticipant, Participant};
use huddle_db::models::session::{NewSession, Session, StatusUpdate};
use huddle_db::{SessionStore, StoreError};
use validator::Validate;

use crate::config::LifecycleConfig;

/// Owns session state: creation, the forward-only status machine and the
/// participant roster.
#[derive(Clone)]
pub struct SessionLifecycle {
    store: Arc<dyn SessionStore>,
    random: Arc<dyn RandomSource>,
    config: LifecycleConfig,
}

impl SessionLifecycle {
    pub fn new(
        store: Arc<dyn SessionStore>,
        random: Arc<dyn RandomSource>,
        config: LifecycleConfig,
    ) -> Self {
        Self {
            store,
            random,
            config,
        }
    }

    /// Schedule a session and create its simulated roster.
    ///
    /// The roster holds the first `min(simulated_count, 3)` personality
    /// templates in order. If the roster cannot be written the session is
    /// removed again.
    pub async fn create_session(&self, input: &CreateSessionRequest) -> Result<Session, CoreError> {
        input.validate()?;

        let session = self.insert_with_fresh_code(input).await?;

        for personality in plan_simulated_roster(input.simulated_count()) {
            let participant = NewParticipant::simulated(&session.session_id, personality);
            if let Err(e) = self.store.add_participant(&participant).await {
                tracing::error!(
                    session_id = %session.session_id,
                    error = %e,
                    "Roster creation failed, removing session",
                );
                if let Err(cleanup) = self.store.delete_session(&session.session_id).await {
                    tracing::warn!(
                        session_id = %session.session_id,
                        error = %cleanup,
                        "Failed to remove partially created session",
                    );
                }
                return Err(e.into());
            }
        }

        tracing::info!(
            session_id = %session.session_id,
            topic = %session.topic,
            simulated_count = session.simulated_count,
            human_count = session.human_count,
            "Session scheduled",
        );
        Ok(session)
    }

    /// Insert the session row, drawing a new code on each collision.
    async fn insert_with_fresh_code(
        &self,
        input: &CreateSessionRequest,
    ) -> Result<Session, CoreError> {
        let attempts = self.config.max_code_attempts.max(1);
        for attempt in 1..=attempts {
            let code = generate_session_code(self.random.as_ref());
            let new = NewSession {
                join_link: join_link(&self.config.public_base_url, &code),
                session_id: code,
                topic: input.topic.clone(),
                scheduled_at: input.scheduled_at,
                simulated_count: input.simulated_count(),
                human_count: input.human_count(),
                created_by: input.created_by.clone(),
            };
            match self.store.create_session(&new).await {
                Ok(session) => return Ok(session),
                Err(StoreError::Duplicate(_)) => {
                    tracing::debug!(attempt, code = %new.session_id, "Session code collision");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(CoreError::Conflict(format!(
            "Could not allocate a unique session code after {attempts} attempts"
        )))
    }

    pub async fn get_session(&self, session_id: &str) -> Result<Session, CoreError> {
        self.store
            .get_session(session_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Session", session_id))
    }

    pub async fn list_sessions(&self, status: SessionStatus) -> Result<Vec<Session>, CoreError> {
        Ok(self.store.list_sessions_by_status(status).await?)
    }

    /// Move a session to `target`.
    ///
    /// Entering `active` stamps `started_at`; entering `completed` stamps
    /// `completed_at` and the duration since start. The change is applied
    /// only if the status has not moved underneath us, so `completed_at` is
    /// written exactly once.
    pub async fn transition(
        &self,
        session_id: &str,
        target: SessionStatus,
    ) -> Result<Session, CoreError> {
        let session = self.get_session(session_id).await?;
        let current = stored_status(&session)?;
        state_machine::validate_transition(current, target)?;

        let now = Utc::now();
        let mut update = StatusUpdate {
            expected: current,
            status: target,
            started_at: None,
            completed_at: None,
            duration_secs: None,
        };
        match target {
            SessionStatus::Scheduled => {}
            SessionStatus::Active => update.started_at = Some(now),
            SessionStatus::Completed => {
                update.completed_at = Some(now);
                update.duration_secs = session.started_at.map(|start| duration_secs(start, now));
            }
        }

        match self.store.update_status(session_id, &update).await? {
            Some(updated) => {
                tracing::info!(
                    session_id = %session_id,
                    from = %current,
                    to = %target,
                    "Session status changed",
                );
                Ok(updated)
            }
            // Lost a race with another transition or a delete.
            None => {
                let latest = self.get_session(session_id).await?;
                Err(CoreError::InvalidTransition {
                    from: latest.status,
                    to: target.to_string(),
                })
            }
        }
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<(), CoreError> {
        if self.store.delete_session(session_id).await? {
            tracing::info!(session_id = %session_id, "Session deleted");
            Ok(())
        } else {
            Err(CoreError::not_found("Session", session_id))
        }
    }

    // -- Roster --

    pub async fn list_participants(&self, session_id: &str) -> Result<Vec<Participant>, CoreError> {
        self.get_session(session_id).await?;
        Ok(self.store.list_participants(session_id).await?)
    }

    pub async fn add_participant(
        &self,
        session_id: &str,
        input: &AddParticipantRequest,
    ) -> Result<Participant, CoreError> {
        input.validate()?;
        input.check_personality()?;
        self.get_session(session_id).await?;

        let participant = self
            .store
            .add_participant(&NewParticipant {
                session_id: session_id.to_string(),
                name: input.name.clone(),
                kind: input.kind,
                personality: input.personality,
            })
            .await?;

        tracing::info!(
            session_id = %session_id,
            participant = %participant.name,
            kind = %participant.kind,
            "Participant joined",
        );
        Ok(participant)
    }

    /// Activate or deactivate a participant. Inactive simulated participants
    /// take no turns.
    pub async fn set_participant_active(
        &self,
        session_id: &str,
        participant_id: DbId,
        active: bool,
    ) -> Result<Participant, CoreError> {
        self.store
            .set_participant_active(session_id, participant_id, active)
            .await?
            .ok_or_else(|| CoreError::not_found("Participant", participant_id))
    }
}

/// The typed status of a stored row. Unknown text is a storage fault, not a
/// caller error.
fn stored_status(session: &Session) -> Result<SessionStatus, CoreError> {
    session
        .status()
        .map_err(|e| CoreError::Internal(format!("Session {}: {e}", session.session_id)))
}
