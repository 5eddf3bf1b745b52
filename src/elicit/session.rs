//! The elicitation session: one conversation, owned exclusively by its caller.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::providers::{CompletionRequest, LlmProvider, Message};

use super::followup::{extract_follow_up, is_satisfied};
use super::template::ChecklistTemplate;
use super::transcript::Transcript;
use super::{ContextStrategy, SessionError, SessionState};

/// Result of a completed turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// Full response text from the completion service.
    pub response: String,
    /// Extracted follow-up question; empty when satisfied or none was found.
    pub follow_up: String,
    /// Session state after this turn.
    pub state: SessionState,
}

impl TurnOutcome {
    /// Whether the session reached [`SessionState::Satisfied`].
    pub fn is_satisfied(&self) -> bool {
        self.state == SessionState::Satisfied
    }
}

/// A multi-turn conversation driven toward the checklist's `Success!` state.
///
/// The user's message and the accumulated request are committed before the
/// completion call; the assistant's messages only after it succeeds. A failed
/// call therefore leaves the turn recorded and the state unchanged.
#[derive(Debug)]
pub struct ElicitationSession {
    id: Uuid,
    template: Arc<ChecklistTemplate>,
    strategy: ContextStrategy,
    system_prompt: Option<String>,
    max_tokens: Option<u32>,
    transcript: Transcript,
    /// User turns and raw model replies; derived follow-ups are display-only.
    history: Vec<Message>,
    accumulated: String,
    state: SessionState,
    turns: u32,
}

impl ElicitationSession {
    /// Start an empty session over an already-loaded template.
    pub fn start(template: Arc<ChecklistTemplate>) -> Self {
        let id = Uuid::new_v4();
        debug!(session_id = %id, "session started");
        Self {
            id,
            template,
            strategy: ContextStrategy::default(),
            system_prompt: None,
            max_tokens: None,
            transcript: Transcript::new(),
            history: Vec::new(),
            accumulated: String::new(),
            state: SessionState::Collecting,
            turns: 0,
        }
    }

    /// Load the checklist at `path` and start a session over it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Configuration`] if the checklist is missing,
    /// unreadable or lacks exactly one slot.
    pub fn start_from_path(path: &Path) -> Result<Self, SessionError> {
        let template = ChecklistTemplate::load(path)?;
        Ok(Self::start(Arc::new(template)))
    }

    /// Seed the transcript with a system message. Blank prompts are ignored.
    ///
    /// Call before the first turn.
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return self;
        }
        self.transcript.push(Message::system(prompt.clone()));
        self.system_prompt = Some(prompt);
        self
    }

    /// Choose how completion context is assembled.
    #[must_use]
    pub fn with_strategy(mut self, strategy: ContextStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Cap the response length of each completion.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Session identifier, used in logs and exports.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Context strategy in use.
    pub fn strategy(&self) -> ContextStrategy {
        self.strategy
    }

    /// The append-only transcript.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Every user message so far, each followed by `\n`.
    pub fn accumulated_request(&self) -> &str {
        &self.accumulated
    }

    /// The shared checklist template.
    pub fn template(&self) -> &Arc<ChecklistTemplate> {
        &self.template
    }

    /// Number of submitted user turns, including failed ones.
    pub fn turns(&self) -> u32 {
        self.turns
    }

    /// The completion request the next call would send.
    pub fn build_request(&self) -> CompletionRequest {
        let mut request = match self.strategy {
            ContextStrategy::Checklist => {
                CompletionRequest::from_prompt(self.template.render(&self.accumulated))
            }
            ContextStrategy::History => CompletionRequest {
                messages: self.history.clone(),
                ..CompletionRequest::default()
            },
        };
        request.system = self.system_prompt.clone();
        request.max_tokens = self.max_tokens;
        request
    }

    /// Run one turn: record `text`, ask the provider, decide, and report.
    ///
    /// `text` is expected to be non-blank; the input surface filters empty
    /// submissions. Turns after [`SessionState::Satisfied`] still run and
    /// never leave that state.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::CompletionService`] if the provider call fails.
    /// The user message and accumulated request stay committed; no assistant
    /// message is recorded.
    pub async fn submit_user_turn(
        &mut self,
        provider: &dyn LlmProvider,
        text: &str,
    ) -> Result<TurnOutcome, SessionError> {
        self.turns = self.turns.saturating_add(1);
        self.transcript.push(Message::user(text));
        self.history.push(Message::user(text));
        self.accumulated.push_str(text);
        self.accumulated.push('\n');

        let request = self.build_request();
        debug!(
            session_id = %self.id,
            turn = self.turns,
            strategy = %self.strategy,
            messages = request.messages.len(),
            "sending completion request"
        );

        let response = provider.complete(request).await?;
        debug!(
            session_id = %self.id,
            model = %response.model,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            stop_reason = ?response.stop_reason,
            "completion received"
        );

        self.transcript.push(Message::assistant(response.text.clone()));
        self.history.push(Message::assistant(response.text.clone()));

        let follow_up = if is_satisfied(&response.text) {
            self.state = SessionState::Satisfied;
            String::new()
        } else {
            let question = extract_follow_up(&response.text).to_owned();
            if !question.is_empty() {
                self.transcript.push(Message::assistant(question.clone()));
            }
            question
        };

        info!(
            session_id = %self.id,
            turn = self.turns,
            state = %self.state,
            follow_up = !follow_up.is_empty(),
            "turn complete"
        );

        Ok(TurnOutcome {
            response: response.text,
            follow_up,
            state: self.state,
        })
    }

    /// Write the transcript as JSON to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save_transcript(&self, path: &Path) -> anyhow::Result<()> {
        self.transcript.export(self.id, self.state).save(path)
    }
}
