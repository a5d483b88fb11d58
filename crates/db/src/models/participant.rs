//! Participant entity model and DTOs.

use huddle_core::personality::Personality;
use huddle_core::roster::ParticipantKind;
use huddle_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `participants` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Participant {
    pub id: DbId,
    pub session_id: String,
    pub name: String,
    /// `human` or `simulated`.
    pub kind: String,
    /// Personality tag; present exactly when `kind` is `simulated`.
    pub personality: Option<String>,
    pub joined_at: Timestamp,
    pub is_active: bool,
}

impl Participant {
    pub fn is_simulated(&self) -> bool {
        matches!(self.kind.parse(), Ok(ParticipantKind::Simulated))
    }

    /// The typed personality, or `None` when absent or unrecognised.
    pub fn personality(&self) -> Option<Personality> {
        self.personality.as_deref().and_then(|tag| tag.parse().ok())
    }
}

/// DTO for adding a participant to a session.
#[derive(Debug, Clone)]
pub struct NewParticipant {
    pub session_id: String,
    pub name: String,
    pub kind: ParticipantKind,
    pub personality: Option<Personality>,
}

impl NewParticipant {
    pub fn simulated(session_id: impl Into<String>, personality: Personality) -> Self {
        Self {
            session_id: session_id.into(),
            name: personality.display_name().to_string(),
            kind: ParticipantKind::Simulated,
            personality: Some(personality),
        }
    }

    pub fn human(session_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            name: name.into(),
            kind: ParticipantKind::Human,
            personality: None,
        }
    }
}
