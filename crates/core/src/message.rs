//! Message channel kinds and append input.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;

/// How a message entered the session. Voice input is transcribed before it
/// is stored, so both kinds carry plain text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageChannel {
    #[default]
    Text,
    Voice,
}

impl MessageChannel {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageChannel::Text => "text",
            MessageChannel::Voice => "voice",
        }
    }
}

impl fmt::Display for MessageChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageChannel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(MessageChannel::Text),
            "voice" => Ok(MessageChannel::Voice),
            other => Err(CoreError::Validation(format!(
                "Unknown message channel '{other}'"
            ))),
        }
    }
}

/// Input for a human-authored message.
///
/// Simulated messages never come through this path; they are produced by
/// the turn scheduler.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AppendMessageRequest {
    #[validate(length(min = 1, max = 100, message = "speaker must be 1-100 characters"))]
    pub speaker: String,
    #[validate(length(min = 1, max = 4000, message = "message must be 1-4000 characters"))]
    pub message: String,
    #[serde(default)]
    pub channel: MessageChannel,
}

/// Input for the single-reply trigger.
#[derive(Debug, Clone, Deserialize)]
pub struct TriggerReplyRequest {
    pub personality: String,
    #[serde(default)]
    pub context: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_defaults_to_text() {
        let req: AppendMessageRequest =
            serde_json::from_str(r#"{"speaker":"You","message":"Hi"}"#).unwrap();
        assert_eq!(req.channel, MessageChannel::Text);
    }

    #[test]
    fn blank_message_rejected() {
        let req = AppendMessageRequest {
            speaker: "You".into(),
            message: String::new(),
            channel: MessageChannel::Voice,
        };
        assert!(req.validate().is_err());
    }
}
