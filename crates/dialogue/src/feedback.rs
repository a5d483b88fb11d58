//! Post-session scoring.

use std::sync::Arc;

use huddle_core::feedback::FeedbackReport;
use huddle_core::transcript::TranscriptEntry;
use huddle_db::models::participant::Participant;
use huddle_llm::prompts::feedback_prompt;
use huddle_llm::ResponseGenerator;
use serde_json::json;

/// Reduces a transcript and roster to a [`FeedbackReport`].
#[derive(Clone)]
pub struct FeedbackAggregator {
    generator: Arc<dyn ResponseGenerator>,
}

impl FeedbackAggregator {
    pub fn new(generator: Arc<dyn ResponseGenerator>) -> Self {
        Self { generator }
    }

    /// Score every participant. Never fails: generator errors and unusable
    /// output both yield [`FeedbackReport::unavailable`].
    pub async fn generate_feedback(
        &self,
        topic: &str,
        transcript: &[TranscriptEntry],
        participants: &[Participant],
    ) -> FeedbackReport {
        let roster: Vec<serde_json::Value> = participants
            .iter()
            .map(|p| {
                json!({
                    "name": p.name,
                    "kind": p.kind,
                    "personality": p.personality,
                    "isActive": p.is_active,
                })
            })
            .collect();
        let prompt = feedback_prompt(topic, &json!(roster), &json!(transcript));

        let raw = match self.generator.generate_structured_feedback(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "Feedback generation failed");
                return FeedbackReport::unavailable();
            }
        };

        match FeedbackReport::parse(&raw) {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(error = %e, "Feedback output unusable");
                FeedbackReport::unavailable()
            }
        }
    }
}
