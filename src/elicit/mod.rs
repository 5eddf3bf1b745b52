//! Business-requirements elicitation.
//!
//! An [`ElicitationSession`] keeps the transcript and the accumulated request
//! text, splices the request into a [`ChecklistTemplate`], asks a completion
//! provider whether the checklist is satisfied, and surfaces one follow-up
//! question at a time until the model answers with `Success!`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::providers::ProviderError;

pub mod followup;
pub mod session;
pub mod template;
pub mod transcript;

pub use followup::{extract_follow_up, is_satisfied, SUCCESS_MARKER};
pub use session::{ElicitationSession, TurnOutcome};
pub use template::{ChecklistTemplate, ConfigurationError, SlotKind};
pub use transcript::Transcript;

/// Session progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Still gathering details.
    #[default]
    Collecting,
    /// The model reported every criterion met. Terminal.
    Satisfied,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Collecting => f.write_str("collecting"),
            Self::Satisfied => f.write_str("satisfied"),
        }
    }
}

/// How completion context is assembled for each turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextStrategy {
    /// Accumulated request spliced into the checklist template, sent as one prompt.
    #[default]
    Checklist,
    /// Raw transcript sent as chat history; the template is not used.
    History,
}

impl std::fmt::Display for ContextStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Checklist => f.write_str("checklist"),
            Self::History => f.write_str("history"),
        }
    }
}

/// Unrecognised strategy name.
#[derive(Debug, thiserror::Error)]
#[error("unknown context strategy '{0}', expected 'checklist' or 'history'")]
pub struct UnknownStrategy(pub String);

impl FromStr for ContextStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "checklist" => Ok(Self::Checklist),
            "history" => Ok(Self::History),
            other => Err(UnknownStrategy(other.to_owned())),
        }
    }
}

/// Errors surfaced by a session, kind plus message.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Checklist document missing, unreadable or without a single slot.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),
    /// The completion call failed; the user's turn is already recorded.
    #[error("{0}")]
    CompletionService(#[from] ProviderError),
}

impl SessionError {
    /// Stable kind name for display next to the message.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "ConfigurationError",
            Self::CompletionService(_) => "CompletionServiceError",
        }
    }
}
