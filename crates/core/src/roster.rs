//! Participant kinds, roster planning and join input.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::personality::{Personality, TEMPLATES};

/// Whether a participant is a person or a generated speaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantKind {
    Human,
    Simulated,
}

impl ParticipantKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ParticipantKind::Human => "human",
            ParticipantKind::Simulated => "simulated",
        }
    }
}

impl fmt::Display for ParticipantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParticipantKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "human" => Ok(ParticipantKind::Human),
            "simulated" => Ok(ParticipantKind::Simulated),
            other => Err(CoreError::Validation(format!(
                "Unknown participant kind '{other}'"
            ))),
        }
    }
}

/// The simulated participants a new session starts with.
///
/// Takes the first `min(requested, TEMPLATES.len())` templates in order, so
/// every personality appears at most once.
pub fn plan_simulated_roster(requested: i32) -> Vec<Personality> {
    let take = usize::try_from(requested.max(0))
        .unwrap_or(0)
        .min(TEMPLATES.len());
    TEMPLATES[..take].to_vec()
}

/// Input for adding a participant to a session.
///
/// A personality is required for simulated participants and forbidden for
/// humans; see [`AddParticipantRequest::check_personality`].
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddParticipantRequest {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,
    pub kind: ParticipantKind,
    pub personality: Option<Personality>,
}

impl AddParticipantRequest {
    pub fn check_personality(&self) -> Result<(), CoreError> {
        match (self.kind, self.personality) {
            (ParticipantKind::Simulated, None) => Err(CoreError::Validation(
                "simulated participants require a personality".into(),
            )),
            (ParticipantKind::Human, Some(_)) => Err(CoreError::Validation(
                "human participants cannot carry a personality".into(),
            )),
            _ => Ok(()),
        }
    }
}
