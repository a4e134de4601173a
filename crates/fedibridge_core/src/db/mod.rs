//! Follower database lifecycle: connection bootstrap, schema versioning,
//! schema init and full reset.
//!
//! # Invariants
//! - The follower schema version lives in `PRAGMA user_version`.
//! - A connection handed to repositories has the latest schema applied.
//! - Errors name the lifecycle step that failed (open, migrate, reset).

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod initializer;
pub mod migrations;
mod open;
mod settings;

pub use initializer::{delete_all, init_db};
pub use open::{open_db, open_db_in_memory, open_db_with_settings};
pub use settings::{DbSettings, SettingsError, DEFAULT_BUSY_TIMEOUT_MS};

pub type DbResult<T> = Result<T, DbError>;

/// Failure of a follower database operation.
#[derive(Debug)]
pub enum DbError {
    /// Statement failure outside a named lifecycle step.
    Sqlite(rusqlite::Error),
    /// Schema step `version` could not be applied; nothing was committed.
    Migration {
        version: u32,
        source: rusqlite::Error,
    },
    /// The file was written by a newer build with an unknown follower schema.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// `delete_all` failed and rolled back; followers are unchanged.
    Reset(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "follower database error: {err}"),
            Self::Migration { version, source } => {
                write!(f, "follower schema step {version} failed: {source}")
            }
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "follower schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::Reset(err) => write!(f, "failed to delete all followers: {err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::Reset(err) => Some(err),
            Self::Migration { source, .. } => Some(source),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
