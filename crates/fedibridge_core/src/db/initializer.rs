//! Schema lifecycle operations for the follower database.
//!
//! # Responsibility
//! - Create or upgrade the schema on first deployment (`init_db`).
//! - Remove every follower in one atomic step (`delete_all`).
//!
//! # Invariants
//! - `init_db` is idempotent.
//! - `delete_all` either empties both follower tables or changes nothing.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::time::Instant;

/// Creates the follower schema, or upgrades it to the latest version.
pub fn init_db(conn: &Connection) -> DbResult<()> {
    apply_migrations(conn)?;
    info!("event=db_init module=db status=ok");
    Ok(())
}

/// Deletes every follower row and its followings.
///
/// Returns the number of followers removed. The `followers` id sequence is
/// left untouched so removed ids are not handed out again.
pub fn delete_all(conn: &Connection) -> DbResult<usize> {
    let started_at = Instant::now();

    let result = delete_all_rows(conn).map_err(DbError::Reset);

    match &result {
        Ok(removed) => info!(
            "event=db_delete_all module=db status=ok removed={} duration_ms={}",
            removed,
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=db_delete_all module=db status=error duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        ),
    }

    result
}

fn delete_all_rows(conn: &Connection) -> rusqlite::Result<usize> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM follower_followings;", [])?;
    let removed = tx.execute("DELETE FROM followers;", [])?;
    tx.commit()?;
    Ok(removed)
}
