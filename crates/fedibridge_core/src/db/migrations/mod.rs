//! Versioned follower schema.
//!
//! Each step is a SQL script applied once, in version order, inside a single
//! transaction together with every other pending step.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// `(version, script)` pairs; versions start at 1 and increase by one.
const SCHEMA_STEPS: &[(u32, &str)] = &[(1, include_str!("0001_followers.sql"))];

/// Returns the follower schema version this build writes.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |(version, _)| *version)
}

/// Returns the follower schema version stored in the database.
pub fn current_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Brings the follower schema up to `latest_version()`.
///
/// A failing step rolls back every step of this call.
pub fn apply_migrations(conn: &Connection) -> DbResult<()> {
    let from = current_version(conn)?;
    let to = latest_version();
    if from > to {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: to,
        });
    }

    let pending: Vec<_> = SCHEMA_STEPS
        .iter()
        .filter(|(version, _)| *version > from)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.unchecked_transaction()?;
    for &&(version, script) in &pending {
        tx.execute_batch(script)
            .and_then(|()| tx.pragma_update(None, "user_version", version))
            .map_err(|source| DbError::Migration { version, source })?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={} steps={}",
        from,
        to,
        pending.len()
    );
    Ok(())
}
