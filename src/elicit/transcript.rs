//! Append-only conversation transcript and its JSON export.

use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::providers::{Message, Role};

use super::SessionState;

/// Ordered record of every message in a session.
///
/// Entries are only ever appended; insertion order is the replay order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// An empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// All entries in insertion order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Entries a user-facing surface should replay (system messages excluded).
    pub fn visible(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.role != Role::System)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Snapshot for persistence.
    pub fn export(&self, session_id: Uuid, state: SessionState) -> TranscriptExport<'_> {
        TranscriptExport {
            session_id,
            exported_at: Utc::now(),
            state,
            messages: &self.messages,
        }
    }
}

/// Serialized form written when a conversation is saved.
#[derive(Debug, Serialize)]
pub struct TranscriptExport<'a> {
    /// Session the transcript belongs to.
    pub session_id: Uuid,
    /// Export time.
    pub exported_at: DateTime<Utc>,
    /// Session state at export time.
    pub state: SessionState,
    /// Entries in insertion order.
    pub messages: &'a [Message],
}

impl TranscriptExport<'_> {
    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize transcript")
    }

    /// Write the JSON export to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = self.to_json_pretty()?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write transcript to {}", path.display()))
    }
}
