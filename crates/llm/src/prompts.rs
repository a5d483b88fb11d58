//! Prompt templates for replies and feedback.

use crate::generator::ReplyRequest;

/// Closing instruction on every reply prompt.
const REPLY_STYLE: &str = "Respond naturally as if you're in a live group discussion. \
     Don't introduce yourself or mention that you're an AI.";

/// Shape the feedback model must answer with.
const FEEDBACK_SHAPE: &str = r#"{
  "overallSummary": "Overall discussion quality summary",
  "participantFeedback": [
    {
      "name": "participant name",
      "overallScore": 8.5,
      "clarity": 8,
      "engagement": 9,
      "analysis": 8,
      "strengths": ["strength1", "strength2"],
      "improvements": ["improvement1", "improvement2"]
    }
  ]
}"#;

/// Build the prompt for a single simulated reply.
pub fn reply_prompt(request: &ReplyRequest) -> String {
    let mut prompt = String::new();
    prompt.push_str(request.personality.instruction());
    prompt.push_str("\n\n");
    prompt.push_str(&format!("Topic: \"{}\"\n\n", request.topic));
    prompt.push_str("Previous conversation context:\n");
    for line in &request.recent_messages {
        prompt.push_str(line);
        prompt.push('\n');
    }
    if let Some(cue) = request.cue.as_deref().filter(|c| !c.trim().is_empty()) {
        prompt.push('\n');
        prompt.push_str(cue);
        prompt.push('\n');
    }
    prompt.push('\n');
    prompt.push_str(REPLY_STYLE);
    prompt
}

/// Build the structured feedback prompt.
///
/// `participants` and `transcript` are embedded verbatim as JSON.
pub fn feedback_prompt(
    topic: &str,
    participants: &serde_json::Value,
    transcript: &serde_json::Value,
) -> String {
    format!(
        "Analyze this group discussion and provide detailed feedback for each participant.\n\n\
         Topic: \"{topic}\"\n\n\
         Participants: {participants}\n\n\
         Transcript: {transcript}\n\n\
         Provide feedback in JSON format with the following structure:\n\
         {FEEDBACK_SHAPE}\n\n\
         Rate each metric out of 10. Focus on communication skills, analytical thinking, \
         and participation quality."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_core::personality::Personality;
    use serde_json::json;

    fn request(cue: Option<&str>) -> ReplyRequest {
        ReplyRequest {
            topic: "Climate Change Solutions".into(),
            personality: Personality::DataDriven,
            recent_messages: vec!["Alice: Carbon tax?".into(), "AI Leader: Yes.".into()],
            cue: cue.map(str::to_string),
        }
    }

    #[test]
    fn reply_prompt_leads_with_personality_instruction() {
        let prompt = reply_prompt(&request(None));
        assert!(prompt.starts_with(Personality::DataDriven.instruction()));
        assert!(prompt.contains("2-3 sentences"));
        assert!(prompt.contains("Topic: \"Climate Change Solutions\""));
    }

    #[test]
    fn reply_prompt_keeps_context_order() {
        let prompt = reply_prompt(&request(None));
        let first = prompt.find("Alice: Carbon tax?").unwrap();
        let second = prompt.find("AI Leader: Yes.").unwrap();
        assert!(first < second);
        assert!(prompt.ends_with(REPLY_STYLE));
    }

    #[test]
    fn reply_prompt_includes_cue_when_present() {
        let prompt = reply_prompt(&request(Some("User just said: \"Carbon tax?\"")));
        assert!(prompt.contains("User just said: \"Carbon tax?\""));

        let blank = reply_prompt(&request(Some("   ")));
        assert!(!blank.contains("User just said"));
    }

    #[test]
    fn each_personality_gets_a_distinct_prompt() {
        let prompts: Vec<String> = huddle_core::personality::TEMPLATES
            .iter()
            .map(|&personality| {
                reply_prompt(&ReplyRequest {
                    personality,
                    ..request(None)
                })
            })
            .collect();
        assert_ne!(prompts[0], prompts[1]);
        assert_ne!(prompts[1], prompts[2]);
        assert_ne!(prompts[0], prompts[2]);
    }

    #[test]
    fn feedback_prompt_embeds_roster_and_transcript() {
        let participants = json!([{ "name": "Alice", "kind": "human" }]);
        let transcript = json!([{ "speaker": "Alice", "message": "Hi", "timestamp": "10:00:00" }]);
        let prompt = feedback_prompt("Remote work", &participants, &transcript);

        assert!(prompt.contains("Topic: \"Remote work\""));
        assert!(prompt.contains(r#"[{"kind":"human","name":"Alice"}]"#));
        assert!(prompt.contains(r#""timestamp":"10:00:00""#));
        assert!(prompt.contains("\"overallSummary\""));
        assert!(prompt.contains("Rate each metric out of 10"));
    }
}
