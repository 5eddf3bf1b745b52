//! Configuration loading.
//!
//! Loads `salesreq.toml` (or `$SALESREQ_CONFIG_PATH`, or an explicit
//! `--config` path). Environment variables override file values; file
//! values override defaults.
//!
//! Precedence: env vars > config file > defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::elicit::ContextStrategy;
use crate::providers::azure::DEFAULT_AZURE_API_VERSION;
use crate::providers::ollama::DEFAULT_OLLAMA_URL;
use crate::providers::openai::DEFAULT_OPENAI_BASE_URL;

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "salesreq.toml";

/// Log filter used when neither `RUST_LOG` nor `[logging] level` is set.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// System prompt that opens every transcript unless configured otherwise.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant that collects sales request \
information by asking smart questions and guiding the user through the required fields.";

// ── Top-level config ────────────────────────────────────────────

/// Top-level configuration loaded from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Completion service selection and limits (`[model]`).
    pub model: ModelConfig,
    /// Checklist document location (`[checklist]`).
    pub checklist: ChecklistConfig,
    /// Elicitation behaviour (`[session]`).
    pub session: SessionSettings,
    /// Log filter and optional file sink (`[logging]`).
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration with precedence: env > TOML file > defaults.
    ///
    /// `explicit` is a path given on the command line; it must exist.
    /// Otherwise `$SALESREQ_CONFIG_PATH` or `./salesreq.toml` is read, and a
    /// missing file yields defaults. `env` resolves variable names so the
    /// caller decides whether `.env` values are visible.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read or parsed,
    /// or if an explicit path does not exist.
    pub fn load(explicit: Option<&Path>, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = config_path_with(&env);
                match std::fs::read_to_string(&path) {
                    Ok(contents) => {
                        tracing::info!(path = %path.display(), "loading config from file");
                        Self::from_toml(&contents)
                            .with_context(|| format!("invalid config at {}", path.display()))?
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                        tracing::debug!(path = %path.display(), "no config file found, using defaults");
                        Self::default()
                    }
                    Err(e) => {
                        return Err(anyhow::anyhow!(
                            "failed to read config file {}: {e}",
                            path.display()
                        ))
                    }
                }
            }
        };
        config.apply_overrides(env);
        Ok(config)
    }

    /// Read and parse a specific config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        tracing::info!(path = %path.display(), "loading config from file");
        Self::from_toml(&contents).with_context(|| format!("invalid config at {}", path.display()))
    }

    /// Parse a TOML string into config.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid config TOML.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_str).context("failed to parse config TOML")?;
        Ok(config)
    }

    /// Apply environment variable overrides (env > config > defaults).
    ///
    /// Takes a resolver function for testability (avoids `set_var` in tests).
    pub fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        // Model.
        // The deployment rewrite goes first so an explicit SALESREQ_MODEL wins.
        if let Some(deployment) = env("AZURE_COMPLETION_MODEL") {
            if self.model.default.starts_with("azure/") {
                self.model.default = format!("azure/{deployment}");
            }
        }
        if let Some(v) = env("SALESREQ_MODEL") {
            self.model.default = v;
        }
        if let Some(v) = env("SALESREQ_MAX_TOKENS") {
            match v.parse() {
                Ok(n) => self.model.max_tokens = n,
                Err(_) => tracing::warn!(
                    var = "SALESREQ_MAX_TOKENS",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
        if let Some(v) = env("OPENAI_BASE_URL") {
            self.model.openai_base_url = v;
        }
        if let Some(v) = env("OLLAMA_URL") {
            self.model.ollama_base_url = v;
        }
        if let Some(v) = env("AZURE_OPENAI_ENDPOINT") {
            self.model.azure_endpoint = Some(v);
        }
        if let Some(v) = env("OPENAI_API_VERSION") {
            self.model.azure_api_version = v;
        }

        // Checklist.
        if let Some(v) = env("SALESREQ_CHECKLIST_PATH") {
            self.checklist.path = PathBuf::from(v);
        }

        // Session.
        if let Some(v) = env("SALESREQ_STRATEGY") {
            match v.parse() {
                Ok(strategy) => self.session.strategy = strategy,
                Err(_) => tracing::warn!(
                    var = "SALESREQ_STRATEGY",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }

        // Logging.
        if let Some(v) = env("SALESREQ_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = env("SALESREQ_LOG_DIR") {
            self.logging.dir = Some(PathBuf::from(v));
        }
    }
}

/// Resolve the config file path from `$SALESREQ_CONFIG_PATH` or the default.
fn config_path_with(env: impl Fn(&str) -> Option<String>) -> PathBuf {
    env("SALESREQ_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

// ── Model config ────────────────────────────────────────────────

/// Completion service settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model spec in `<provider>/<model>` form, e.g. `azure/gpt-4o`.
    pub default: String,
    /// Maximum response tokens per completion.
    pub max_tokens: u32,
    /// Whole-request timeout for the completion call, in seconds.
    pub timeout_secs: u64,
    /// OpenAI API base URL.
    pub openai_base_url: String,
    /// Ollama server base URL.
    pub ollama_base_url: String,
    /// Azure OpenAI resource endpoint, e.g. `https://my-res.openai.azure.com`.
    pub azure_endpoint: Option<String>,
    /// Azure OpenAI `api-version` query parameter.
    pub azure_api_version: String,
}

impl ModelConfig {
    /// Completion request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            default: "azure/gpt-4o".to_owned(),
            max_tokens: 1024,
            timeout_secs: 120,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_owned(),
            ollama_base_url: DEFAULT_OLLAMA_URL.to_owned(),
            azure_endpoint: None,
            azure_api_version: DEFAULT_AZURE_API_VERSION.to_owned(),
        }
    }
}

// ── Checklist config ────────────────────────────────────────────

/// Where the checklist template is read from.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChecklistConfig {
    /// Path to the plain-text checklist document.
    pub path: PathBuf,
}

impl Default for ChecklistConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("checklist.txt"),
        }
    }
}

// ── Session config ──────────────────────────────────────────────

/// Elicitation session settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// How completion context is assembled each turn.
    pub strategy: ContextStrategy,
    /// System message seeded into every transcript. Empty disables it.
    pub system_prompt: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            strategy: ContextStrategy::default(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_owned(),
        }
    }
}

// ── Logging config ──────────────────────────────────────────────

/// Logging settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
    /// Directory for daily-rolling JSON logs; stderr only when unset.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_owned(),
            dir: None,
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────
