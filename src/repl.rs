//! Line-oriented chat surface for an elicitation session.
//!
//! Reads user lines, renders transcript entries as `role> text`, and stops
//! asking for input once the session is satisfied. Slash commands:
//! `/reset`, `/transcript`, `/quit`.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

use crate::config::SessionSettings;
use crate::elicit::{ChecklistTemplate, ElicitationSession, TurnOutcome};
use crate::providers::{LlmProvider, Message};

/// Heading printed when the chat opens.
pub const BANNER: &str = "Sales Request Assistant\n\
Please provide details about your request. I will guide you through a few questions.";

const PROMPT: &str = "you> ";
const NO_FOLLOW_UP_HINT: &str =
    "(no follow-up question detected; add any details you think are still missing)";

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Whitespace only; ignored.
    Blank,
    /// `/quit` or `/exit`.
    Quit,
    /// `/reset`: discard the session and start over with the same template.
    Reset,
    /// `/transcript`: replay the conversation so far.
    Transcript,
    /// Anything else is a user turn.
    Text(String),
}

impl Input {
    /// Classify one raw line. Text turns keep the line exactly as typed.
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "" => Self::Blank,
            "/quit" | "/exit" => Self::Quit,
            "/reset" => Self::Reset,
            "/transcript" => Self::Transcript,
            _ => Self::Text(line.to_owned()),
        }
    }
}

/// Drives sessions against one provider and one shared template.
pub struct Repl<W: Write> {
    provider: Arc<dyn LlmProvider>,
    template: Arc<ChecklistTemplate>,
    settings: SessionSettings,
    max_tokens: u32,
    transcript_path: Option<PathBuf>,
    out: W,
}

impl<W: Write> Repl<W> {
    /// Create a chat surface writing to `out`.
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        template: Arc<ChecklistTemplate>,
        settings: SessionSettings,
        max_tokens: u32,
        out: W,
    ) -> Self {
        Self {
            provider,
            template,
            settings,
            max_tokens,
            transcript_path: None,
            out,
        }
    }

    /// Save the transcript as JSON to `path` when a session ends.
    #[must_use]
    pub fn with_transcript_path(mut self, path: Option<PathBuf>) -> Self {
        self.transcript_path = path;
        self
    }

    /// Consume the surface and return its writer.
    pub fn into_writer(self) -> W {
        self.out
    }

    fn new_session(&self) -> ElicitationSession {
        ElicitationSession::start(Arc::clone(&self.template))
            .with_strategy(self.settings.strategy)
            .with_system_prompt(self.settings.system_prompt.clone())
            .with_max_tokens(self.max_tokens)
    }

    /// Run until `/quit`, end of input, or a satisfied session.
    ///
    /// Returns the last session so the caller can inspect it.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input, writing output or saving the
    /// transcript fails. Completion failures are reported inline instead.
    pub async fn run<R>(&mut self, input: R) -> anyhow::Result<ElicitationSession>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        let mut session = self.new_session();
        info!(session_id = %session.id(), model = %self.provider.model_id(), "chat opened");
        writeln!(self.out, "{BANNER}\n")?;

        loop {
            write!(self.out, "{PROMPT}")?;
            self.out.flush()?;

            let Some(line) = lines.next_line().await.context("failed to read input")? else {
                writeln!(self.out)?;
                break;
            };

            match Input::parse(&line) {
                Input::Blank => continue,
                Input::Quit => break,
                Input::Reset => {
                    self.finish(&session)?;
                    session = self.new_session();
                    info!(session_id = %session.id(), "session reset");
                    writeln!(self.out, "(started a new request)")?;
                }
                Input::Transcript => {
                    for message in session.transcript().visible() {
                        self.render(message)?;
                    }
                }
                Input::Text(text) => {
                    match session.submit_user_turn(self.provider.as_ref(), &text).await {
                        Ok(outcome) => {
                            if self.render_outcome(&outcome)? {
                                break;
                            }
                        }
                        Err(e) => {
                            writeln!(self.out, "error [{}]: {e}", e.kind())?;
                        }
                    }
                }
            }
        }

        self.finish(&session)?;
        Ok(session)
    }

    /// Print a turn; returns `true` once the request is complete.
    fn render_outcome(&mut self, outcome: &TurnOutcome) -> anyhow::Result<bool> {
        writeln!(self.out, "assistant> {}", outcome.response)?;
        if outcome.is_satisfied() {
            writeln!(self.out, "\nAll required information has been collected.")?;
            return Ok(true);
        }
        if outcome.follow_up.is_empty() {
            warn!("response carried neither a follow-up question nor the success marker");
            writeln!(self.out, "{NO_FOLLOW_UP_HINT}")?;
        } else {
            writeln!(self.out, "assistant> {}", outcome.follow_up)?;
        }
        Ok(false)
    }

    fn render(&mut self, message: &Message) -> anyhow::Result<()> {
        writeln!(self.out, "{}> {}", message.role, message.content)?;
        Ok(())
    }

    fn finish(&mut self, session: &ElicitationSession) -> anyhow::Result<()> {
        let Some(path) = &self.transcript_path else {
            return Ok(());
        };
        if session.turns() == 0 {
            return Ok(());
        }
        session.save_transcript(path)?;
        info!(session_id = %session.id(), path = %path.display(), "transcript saved");
        Ok(())
    }
}
