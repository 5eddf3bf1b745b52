//! Checklist template: the grounding prompt the accumulated request is
//! spliced into before every completion call.
//!
//! A template carries exactly one slot. Documents written for the original
//! assistant use the quoted-block anchor `User Request:\n"""`; newer ones use
//! the `{{USER_REQUEST}}` placeholder. Slot validation happens at load time,
//! so [`ChecklistTemplate::render`] can never produce a malformed prompt.

use std::path::{Path, PathBuf};

use tracing::info;

/// Quoted-block opener the accumulated request is inserted after.
pub const ANCHOR: &str = "User Request:\n\"\"\"";

/// Named placeholder replaced by the accumulated request.
pub const PLACEHOLDER: &str = "{{USER_REQUEST}}";

/// The kind of slot a template was validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// Legacy literal anchor ([`ANCHOR`]).
    Anchor,
    /// Named placeholder ([`PLACEHOLDER`]).
    Placeholder,
}

impl std::fmt::Display for SlotKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anchor => f.write_str("anchor (User Request: \"\"\")"),
            Self::Placeholder => f.write_str("placeholder ({{USER_REQUEST}})"),
        }
    }
}

/// Checklist document problems. All of them are fatal at session start.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// The document does not exist.
    #[error("checklist document not found at {}", path.display())]
    Missing {
        /// Configured location.
        path: PathBuf,
    },
    /// The document exists but could not be read as UTF-8 text.
    #[error("checklist document {} could not be read: {source}", path.display())]
    Unreadable {
        /// Configured location.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The slot is missing or repeated.
    #[error("checklist template must contain exactly one {slot} slot, found {found}")]
    SlotCount {
        /// Slot kind that was checked.
        slot: SlotKind,
        /// Number of occurrences found.
        found: usize,
    },
}

/// Immutable checklist prompt with one validated slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistTemplate {
    text: String,
    slot: SlotKind,
    source: Option<PathBuf>,
}

impl ChecklistTemplate {
    /// Read and validate the checklist document at `path`.
    ///
    /// Meant to be called once per process; share the result with
    /// `Arc<ChecklistTemplate>` across sessions.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Missing`] when the file does not exist,
    /// [`ConfigurationError::Unreadable`] on any other read failure, and
    /// [`ConfigurationError::SlotCount`] when the slot is absent or repeated.
    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        let text = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigurationError::Missing {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigurationError::Unreadable {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let mut template = Self::parse(text)?;
        template.source = Some(path.to_path_buf());
        info!(
            path = %path.display(),
            bytes = template.text.len(),
            slot = ?template.slot,
            "checklist template loaded"
        );
        Ok(template)
    }

    /// Validate template text that did not come from a file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::SlotCount`] when the slot is absent or repeated.
    pub fn parse(text: impl Into<String>) -> Result<Self, ConfigurationError> {
        let text = text.into();

        let placeholders = text.matches(PLACEHOLDER).count();
        let slot = if placeholders > 0 {
            if placeholders != 1 {
                return Err(ConfigurationError::SlotCount {
                    slot: SlotKind::Placeholder,
                    found: placeholders,
                });
            }
            SlotKind::Placeholder
        } else {
            let anchors = text.matches(ANCHOR).count();
            if anchors != 1 {
                return Err(ConfigurationError::SlotCount {
                    slot: SlotKind::Anchor,
                    found: anchors,
                });
            }
            SlotKind::Anchor
        };

        Ok(Self {
            text,
            slot,
            source: None,
        })
    }

    /// Splice the accumulated request into the template.
    ///
    /// Anchor templates keep the opener and get a newline, the request and a
    /// newline inserted right after it, so the closing `"""` still matches.
    /// Placeholder templates get the request substituted verbatim.
    pub fn render(&self, accumulated: &str) -> String {
        match self.slot {
            SlotKind::Anchor => {
                let replacement = format!("{ANCHOR}\n{accumulated}\n");
                self.text.replacen(ANCHOR, &replacement, 1)
            }
            SlotKind::Placeholder => self.text.replacen(PLACEHOLDER, accumulated, 1),
        }
    }

    /// Which slot this template uses.
    pub fn slot(&self) -> SlotKind {
        self.slot
    }

    /// Raw template text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// File the template was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}
