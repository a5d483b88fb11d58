//! Message entity model and DTOs.

use huddle_core::message::MessageChannel;
use huddle_core::personality::Personality;
use huddle_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `messages` table. Rows are never updated.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Message {
    pub id: DbId,
    pub session_id: String,
    pub speaker: String,
    pub message: String,
    /// `text` or `voice`.
    pub channel: String,
    pub is_simulated: bool,
    /// Personality of the simulated speaker, if any.
    pub personality: Option<String>,
    /// Assigned by the store; non-decreasing within a session.
    pub created_at: Timestamp,
}

impl Message {
    /// `"<speaker>: <message>"`, the form used as prompt context.
    pub fn as_context_line(&self) -> String {
        format!("{}: {}", self.speaker, self.message)
    }
}

/// DTO for appending a message.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub session_id: String,
    pub speaker: String,
    pub message: String,
    pub channel: MessageChannel,
    pub is_simulated: bool,
    pub personality: Option<Personality>,
}

impl NewMessage {
    pub fn human(
        session_id: impl Into<String>,
        speaker: impl Into<String>,
        message: impl Into<String>,
        channel: MessageChannel,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            speaker: speaker.into(),
            message: message.into(),
            channel,
            is_simulated: false,
            personality: None,
        }
    }

    /// A generated reply, attributed to the speaker's display name.
    pub fn simulated(
        session_id: impl Into<String>,
        speaker: impl Into<String>,
        personality: Personality,
        message: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            speaker: speaker.into(),
            message: message.into(),
            channel: MessageChannel::Text,
            is_simulated: true,
            personality: Some(personality),
        }
    }
}
