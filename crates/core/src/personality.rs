//! Simulated-speaker personalities and their prompt instructions.
//!
//! The set is closed: adding a personality means adding a variant here, and
//! every `match` on [`Personality`] has to account for it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Behavioural template governing how a simulated participant speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Personality {
    Confident,
    Emotional,
    DataDriven,
}

/// Roster templates in creation order. Sessions take the first `k`.
pub const TEMPLATES: [Personality; 3] = [
    Personality::Confident,
    Personality::Emotional,
    Personality::DataDriven,
];

impl Personality {
    /// Stable tag stored on participants and messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Personality::Confident => "confident",
            Personality::Emotional => "emotional",
            Personality::DataDriven => "data-driven",
        }
    }

    /// Display name used as the speaker of this personality's messages.
    pub fn display_name(self) -> &'static str {
        match self {
            Personality::Confident => "AI Leader",
            Personality::Emotional => "AI Empath",
            Personality::DataDriven => "AI Analyst",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Personality::Confident => "Takes charge, makes decisive statements",
            Personality::Emotional => "Focuses on human impact and feelings",
            Personality::DataDriven => "Provides statistics and logical arguments",
        }
    }

    /// Instruction placed at the top of every reply prompt.
    pub fn instruction(self) -> &'static str {
        match self {
            Personality::Confident => {
                "You are a confident leader in a group discussion. Be decisive, take charge, \
                 and make strong points. Keep responses to 2-3 sentences."
            }
            Personality::Emotional => {
                "You are an emotional speaker who focuses on human impact and feelings. \
                 Be empathetic and consider the human side of issues. Keep responses to 2-3 sentences."
            }
            Personality::DataDriven => {
                "You are a data-driven analyst who provides statistics and logical arguments. \
                 Use facts, numbers, and logical reasoning. Keep responses to 2-3 sentences."
            }
        }
    }
}

impl fmt::Display for Personality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Personality {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confident" => Ok(Personality::Confident),
            "emotional" => Ok(Personality::Emotional),
            "data-driven" => Ok(Personality::DataDriven),
            other => Err(CoreError::Validation(format!(
                "Invalid personality type '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_order_is_fixed() {
        assert_eq!(
            TEMPLATES,
            [
                Personality::Confident,
                Personality::Emotional,
                Personality::DataDriven
            ]
        );
    }

    #[test]
    fn tags_round_trip() {
        for p in TEMPLATES {
            assert_eq!(p.as_str().parse::<Personality>().unwrap(), p);
        }
    }

    #[test]
    fn serde_uses_kebab_case_tag() {
        let json = serde_json::to_string(&Personality::DataDriven).unwrap();
        assert_eq!(json, "\"data-driven\"");
    }

    #[test]
    fn unknown_tag_rejected() {
        assert!("sarcastic".parse::<Personality>().is_err());
        assert!("Confident".parse::<Personality>().is_err());
    }

    #[test]
    fn every_instruction_caps_length() {
        for p in TEMPLATES {
            assert!(p.instruction().contains("2-3 sentences"), "{p}");
        }
    }

    #[test]
    fn display_names_are_distinct() {
        let names: std::collections::HashSet<_> =
            TEMPLATES.iter().map(|p| p.display_name()).collect();
        assert_eq!(names.len(), TEMPLATES.len());
    }
}
