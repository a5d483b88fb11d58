//! Transcript rows and session statistics as exposed to readers.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// One line of the human-readable transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub speaker: String,
    pub message: String,
    /// Wall-clock time of the message, `HH:MM:SS` (UTC).
    pub timestamp: String,
}

impl TranscriptEntry {
    pub fn new(speaker: impl Into<String>, message: impl Into<String>, at: Timestamp) -> Self {
        Self {
            speaker: speaker.into(),
            message: message.into(),
            timestamp: format_clock(at),
        }
    }
}

/// Format a timestamp as `HH:MM:SS`.
pub fn format_clock(at: Timestamp) -> String {
    at.format("%H:%M:%S").to_string()
}

/// Format a duration in seconds as `MM:SS`. Minutes are not wrapped at 60.
pub fn format_duration(secs: Option<i32>) -> String {
    let secs = secs.unwrap_or(0).max(0);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Headline numbers shown next to a feedback report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub duration: String,
    pub total_messages: usize,
    pub total_participants: usize,
    pub completed_at: Option<Timestamp>,
}

impl SessionStats {
    pub fn new(
        duration_secs: Option<i32>,
        total_messages: usize,
        total_participants: usize,
        completed_at: Option<Timestamp>,
    ) -> Self {
        Self {
            duration: format_duration(duration_secs),
            total_messages,
            total_participants,
            completed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn clock_is_zero_padded() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 5, 7).unwrap();
        assert_eq!(format_clock(at), "09:05:07");
    }

    #[test]
    fn duration_formats_minutes_and_seconds() {
        assert_eq!(format_duration(Some(0)), "00:00");
        assert_eq!(format_duration(Some(754)), "12:34");
        assert_eq!(format_duration(Some(3725)), "62:05");
    }

    #[test]
    fn unknown_duration_is_zero() {
        assert_eq!(format_duration(None), "00:00");
    }

    #[test]
    fn entry_uses_clock_format() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 14, 30, 0).unwrap();
        let entry = TranscriptEntry::new("AI Leader", "Let's focus.", at);
        assert_eq!(entry.timestamp, "14:30:00");
    }
}
