//! Database connection settings.
//!
//! Settings are plain data supplied by the embedding application, usually
//! deserialized from its JSON configuration.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

/// Busy timeout applied when settings do not override it.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Connection settings for the follower database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbSettings {
    /// Database file path. `None` opens a private in-memory database.
    pub path: Option<PathBuf>,
    /// How long a statement waits on a locked database before failing.
    pub busy_timeout_ms: u64,
}

impl Default for DbSettings {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl DbSettings {
    /// Settings for a database file at `path` with default timeouts.
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Parses settings from a JSON document; missing fields use defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(raw).map_err(SettingsError::Parse)?;
        if let Some(path) = settings.path.as_ref() {
            if path.as_os_str().is_empty() {
                return Err(SettingsError::EmptyPath);
            }
        }
        Ok(settings)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

/// Errors raised while loading `DbSettings`.
#[derive(Debug)]
pub enum SettingsError {
    Parse(serde_json::Error),
    EmptyPath,
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid database settings: {err}"),
            Self::EmptyPath => write!(f, "database path cannot be empty"),
        }
    }
}

impl Error for SettingsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::EmptyPath => None,
        }
    }
}
