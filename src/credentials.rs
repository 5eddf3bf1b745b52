//! Credential loading from the process environment and an optional `.env` file.
//!
//! The process environment wins over `.env` entries, matching the usual
//! `dotenv` contract: a file never overrides what the shell already exported.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use tracing::debug;

/// `.env` file looked up in the working directory when none is given.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Runtime credentials and environment settings.
#[derive(Clone, Default)]
pub struct Credentials {
    vars: BTreeMap<String, String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("keys", &self.vars.keys().collect::<Vec<_>>())
            .field("values", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    /// Build credentials from a key-value map.
    pub fn from_map(vars: BTreeMap<String, String>) -> Self {
        Self { vars }
    }

    /// Returns a value for a key, if present and non-empty.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    /// Owned lookup usable as the env resolver for [`crate::config::Config::load`].
    pub fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_owned)
    }

    /// Number of loaded entries.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether nothing was loaded.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Parse a `.env` file into key-value pairs.
///
/// # Errors
///
/// Returns an error if the file does not exist or a line cannot be parsed.
pub fn read_env_file(path: &Path) -> anyhow::Result<BTreeMap<String, String>> {
    if !path.exists() {
        return Err(anyhow::anyhow!("env file does not exist: {}", path.display()));
    }

    let mut vars = BTreeMap::new();
    let iter = dotenvy::from_path_iter(path)
        .with_context(|| format!("failed to read env file {}", path.display()))?;

    for item in iter {
        let (key, value) = item.with_context(|| {
            format!("failed to parse key-value entry in env file {}", path.display())
        })?;
        vars.insert(key, value);
    }

    Ok(vars)
}

/// Merge process environment over `.env` entries.
///
/// `explicit` must exist when given. Without it, `./.env` is read if present.
///
/// # Errors
///
/// Returns an error if an explicit file is missing or any file is malformed.
pub fn load_credentials(explicit: Option<&Path>) -> anyhow::Result<Credentials> {
    let mut vars = match explicit {
        Some(path) => read_env_file(path)?,
        None => {
            let default = Path::new(DEFAULT_ENV_FILE);
            if default.exists() {
                read_env_file(default)?
            } else {
                BTreeMap::new()
            }
        }
    };
    debug!(entries = vars.len(), "loaded env file entries");

    merge_process_env(&mut vars, std::env::vars());
    Ok(Credentials::from_map(vars))
}

/// Overlay `process` entries onto `file_vars`; process values win.
pub fn merge_process_env(
    file_vars: &mut BTreeMap<String, String>,
    process: impl IntoIterator<Item = (String, String)>,
) {
    for (key, value) in process {
        file_vars.insert(key, value);
    }
}
