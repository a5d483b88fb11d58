//! Post-session feedback report shape and parsing.
//!
//! The report is derived data: it is regenerated from the transcript on
//! demand and only the latest copy is kept on the session. Parsing is
//! lenient about fences and missing list fields but strict about the
//! overall shape; anything unusable is reported as an error so the caller
//! can fall back to [`FeedbackReport::unavailable`].

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Summary used when the report could not be produced.
pub const UNAVAILABLE_SUMMARY: &str = "Unable to generate feedback at this time.";

/// Lowest and highest score on every metric.
pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackReport {
    pub overall_summary: String,
    #[serde(default)]
    pub participant_feedback: Vec<ParticipantFeedback>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantFeedback {
    pub name: String,
    pub overall_score: f64,
    pub clarity: f64,
    pub engagement: f64,
    pub analysis: f64,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
}

impl FeedbackReport {
    /// The degraded report returned when generation or parsing fails.
    pub fn unavailable() -> Self {
        Self {
            overall_summary: UNAVAILABLE_SUMMARY.to_string(),
            participant_feedback: Vec::new(),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        self.overall_summary == UNAVAILABLE_SUMMARY && self.participant_feedback.is_empty()
    }

    /// Parse model output into a report with normalised scores.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let body = strip_code_fence(raw);
        let mut report: FeedbackReport = serde_json::from_str(body)
            .map_err(|e| CoreError::Generation(format!("Malformed feedback JSON: {e}")))?;
        for entry in &mut report.participant_feedback {
            entry.normalize();
        }
        Ok(report)
    }
}

impl ParticipantFeedback {
    fn normalize(&mut self) {
        self.overall_score = normalize_score(self.overall_score);
        self.clarity = normalize_score(self.clarity);
        self.engagement = normalize_score(self.engagement);
        self.analysis = normalize_score(self.analysis);
    }
}

/// Clamp to `[0, 10]` and round to one decimal place. Non-finite values
/// become zero.
pub fn normalize_score(value: f64) -> f64 {
    if !value.is_finite() {
        return MIN_SCORE;
    }
    (value.clamp(MIN_SCORE, MAX_SCORE) * 10.0).round() / 10.0
}

/// Models sometimes wrap JSON in a markdown fence even when asked not to.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "overallSummary": "Lively discussion.",
        "participantFeedback": [
            {
                "name": "You",
                "overallScore": 8.46,
                "clarity": 8,
                "engagement": 11,
                "analysis": -2,
                "strengths": ["Clear framing"],
                "improvements": ["Cite sources"]
            }
        ]
    }"#;

    #[test]
    fn parses_and_normalizes_scores() {
        let report = FeedbackReport::parse(VALID).unwrap();
        assert_eq!(report.overall_summary, "Lively discussion.");
        let entry = &report.participant_feedback[0];
        assert_eq!(entry.overall_score, 8.5);
        assert_eq!(entry.clarity, 8.0);
        assert_eq!(entry.engagement, 10.0);
        assert_eq!(entry.analysis, 0.0);
        assert_eq!(entry.strengths, vec!["Clear framing"]);
    }

    #[test]
    fn accepts_fenced_json() {
        let fenced = format!("```json\n{VALID}\n```");
        assert!(FeedbackReport::parse(&fenced).is_ok());
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let raw = r#"{"overallSummary":"ok","participantFeedback":[
            {"name":"A","overallScore":5,"clarity":5,"engagement":5,"analysis":5}]}"#;
        let report = FeedbackReport::parse(raw).unwrap();
        assert!(report.participant_feedback[0].strengths.is_empty());
    }

    #[test]
    fn invalid_json_is_a_generation_error() {
        assert!(matches!(
            FeedbackReport::parse("not json"),
            Err(CoreError::Generation(_))
        ));
        assert!(FeedbackReport::parse("{}").is_err());
    }

    #[test]
    fn unavailable_report_is_recognizable() {
        let report = FeedbackReport::unavailable();
        assert!(report.is_unavailable());
        assert_eq!(report.overall_summary, UNAVAILABLE_SUMMARY);
    }

    #[test]
    fn non_finite_scores_become_zero() {
        assert_eq!(normalize_score(f64::NAN), 0.0);
        assert_eq!(normalize_score(f64::INFINITY), 0.0);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(FeedbackReport::unavailable()).unwrap();
        assert!(json.get("overallSummary").is_some());
        assert!(json.get("participantFeedback").is_some());
    }
}
