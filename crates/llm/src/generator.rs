//! The adapter contract consumed by the dialogue engine.

use async_trait::async_trait;
use huddle_core::personality::Personality;

use crate::error::GenerationError;

/// Everything needed to produce one simulated reply.
#[derive(Debug, Clone)]
pub struct ReplyRequest {
    pub topic: String,
    pub personality: Personality,
    /// Prior turns as `"speaker: message"` lines, oldest first.
    pub recent_messages: Vec<String>,
    /// Free-text cue appended after the context, e.g. what the user just said.
    pub cue: Option<String>,
}

/// A black-box text generator. Implementations may fail or time out; callers
/// treat every error as "no output".
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    /// Produce a short in-character reply.
    async fn generate_reply(&self, request: &ReplyRequest) -> Result<String, GenerationError>;

    /// Produce JSON text answering a structured feedback prompt.
    async fn generate_structured_feedback(&self, prompt: &str) -> Result<String, GenerationError>;
}
