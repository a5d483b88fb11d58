//! Feedback generation, storage and the session report.

mod common;

use huddle_core::feedback::{FeedbackReport, UNAVAILABLE_SUMMARY};
use huddle_core::random::SequenceRandom;
use huddle_core::session::SessionStatus;
use huddle_core::transcript::TranscriptEntry;
use huddle_dialogue::FeedbackAggregator;
use std::sync::Arc;

use common::{create_request, harness, human, ScriptedGenerator};

const SCORED: &str = r#"```json
{
  "overallSummary": "Focused and constructive.",
  "participantFeedback": [
    {
      "name": "You",
      "overallScore": 7.25,
      "clarity": 12,
      "engagement": -1,
      "analysis": 6,
      "strengths": ["Opened the discussion"],
      "improvements": ["Back claims with data"]
    }
  ]
}
```"#;

#[tokio::test]
async fn valid_output_is_parsed_and_normalised() {
    let generator = Arc::new(ScriptedGenerator::new().with_feedback(SCORED));
    let aggregator = FeedbackAggregator::new(generator.clone());

    let report = aggregator
        .generate_feedback("Remote work", &[], &[])
        .await;

    assert_eq!(report.overall_summary, "Focused and constructive.");
    let you = &report.participant_feedback[0];
    assert_eq!(you.overall_score, 7.3);
    assert_eq!(you.clarity, 10.0);
    assert_eq!(you.engagement, 0.0);
    assert_eq!(you.strengths, ["Opened the discussion"]);
}

#[tokio::test]
async fn invalid_json_degrades_to_the_fixed_report() {
    let generator = Arc::new(ScriptedGenerator::new().with_feedback("Great chat, 9/10!"));
    let aggregator = FeedbackAggregator::new(generator);

    let report = aggregator.generate_feedback("Topic", &[], &[]).await;
    assert_eq!(report, FeedbackReport::unavailable());
    assert_eq!(report.overall_summary, UNAVAILABLE_SUMMARY);
    assert!(report.participant_feedback.is_empty());
}

#[tokio::test]
async fn generator_failure_degrades_to_the_fixed_report() {
    // No scripted feedback: the generator returns an error.
    let aggregator = FeedbackAggregator::new(Arc::new(ScriptedGenerator::new()));
    let report = aggregator.generate_feedback("Topic", &[], &[]).await;
    assert!(report.is_unavailable());
}

#[tokio::test]
async fn prompt_embeds_roster_and_transcript() {
    let h = harness(
        ScriptedGenerator::new().with_feedback(SCORED),
        SequenceRandom::new([4]),
    );
    let id = h
        .engine
        .create_session(&create_request("Climate Change Solutions", Some(2)))
        .await
        .unwrap()
        .session_id;
    h.engine
        .post_message(&id, &human("Start with renewables"))
        .await
        .unwrap();

    h.engine.generate_feedback(&id).await.unwrap();

    let prompts = h.generator.feedback_calls();
    assert_eq!(prompts.len(), 1);
    let prompt = &prompts[0];
    assert!(prompt.contains("Topic: \"Climate Change Solutions\""));
    assert!(prompt.contains("\"name\":\"AI Leader\""));
    assert!(prompt.contains("\"name\":\"AI Empath\""));
    assert!(prompt.contains("\"message\":\"Start with renewables\""));
}

#[tokio::test]
async fn feedback_is_stored_and_replaced() {
    let h = harness(
        ScriptedGenerator::new().with_feedback(SCORED),
        SequenceRandom::new([4]),
    );
    let id = h
        .engine
        .create_session(&create_request("Store", Some(1)))
        .await
        .unwrap()
        .session_id;

    let report = h.engine.generate_feedback(&id).await.unwrap();
    let stored = h.engine.get_session(&id).await.unwrap();
    assert_eq!(stored.feedback_report(), Some(&report));

    // Generating again overwrites the previous copy.
    let again = h.engine.generate_feedback(&id).await.unwrap();
    assert_eq!(
        h.engine.get_session(&id).await.unwrap().feedback_report(),
        Some(&again)
    );
}

#[tokio::test]
async fn degraded_feedback_is_still_stored() {
    let h = harness(ScriptedGenerator::new(), SequenceRandom::new([4]));
    let id = h
        .engine
        .create_session(&create_request("Degraded", Some(1)))
        .await
        .unwrap()
        .session_id;

    let report = h.engine.generate_feedback(&id).await.unwrap();
    assert!(report.is_unavailable());
    assert!(h
        .engine
        .get_session(&id)
        .await
        .unwrap()
        .feedback_report()
        .unwrap()
        .is_unavailable());
}

#[tokio::test]
async fn unknown_session_feedback_is_not_found() {
    let h = harness(ScriptedGenerator::new(), SequenceRandom::new([4]));
    assert!(h.engine.generate_feedback("nope00").await.is_err());
    assert!(h.generator.feedback_calls().is_empty());
}

#[tokio::test]
async fn report_bundles_session_feedback_transcript_and_stats() {
    let h = harness(
        ScriptedGenerator::new().with_feedback(SCORED),
        SequenceRandom::new([4]),
    );
    let id = h
        .engine
        .create_session(&create_request("Report", Some(2)))
        .await
        .unwrap()
        .session_id;
    h.engine.post_message(&id, &human("First")).await.unwrap();
    h.engine.post_message(&id, &human("Second")).await.unwrap();
    h.engine
        .transition(&id, SessionStatus::Active)
        .await
        .unwrap();
    h.engine
        .transition(&id, SessionStatus::Completed)
        .await
        .unwrap();
    h.engine.generate_feedback(&id).await.unwrap();

    let report = h.engine.report(&id).await.unwrap();

    assert_eq!(report.session.session_id, id);
    assert_eq!(
        report.feedback.as_ref().map(|f| f.overall_summary.as_str()),
        Some("Focused and constructive.")
    );
    let speakers: Vec<&str> = report
        .transcript
        .iter()
        .map(|e: &TranscriptEntry| e.speaker.as_str())
        .collect();
    assert_eq!(speakers, ["You", "You"]);
    assert_eq!(report.transcript[0].timestamp.len(), "HH:MM:SS".len());
    assert_eq!(report.stats.total_messages, 2);
    assert_eq!(report.stats.total_participants, 2);
    assert!(report.stats.completed_at.is_some());
    assert_eq!(report.stats.duration, "00:00");
}

#[tokio::test]
async fn transcript_of_unknown_session_is_not_found() {
    let h = harness(ScriptedGenerator::new(), SequenceRandom::new([4]));
    assert!(h.engine.transcript("nope00").await.is_err());
}
