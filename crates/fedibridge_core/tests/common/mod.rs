#![allow(dead_code)]

use fedibridge_core::db::{delete_all, init_db, open_db};
use fedibridge_core::{FollowingId, SqliteFollowerRepository, SyncWatermark};
use rusqlite::Connection;
use std::collections::BTreeMap;
use tempfile::TempDir;

/// File-backed database scoped to one test.
///
/// The schema is initialized on creation and every follower is removed on
/// drop; a failing cleanup is reported and does not fail the test.
pub struct TestDb {
    pub conn: Connection,
    _dir: TempDir,
}

impl TestDb {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let conn = open_db(dir.path().join("followers.db")).unwrap();
        init_db(&conn).unwrap();
        Self { conn, _dir: dir }
    }

    pub fn repo(&self) -> SqliteFollowerRepository<'_> {
        SqliteFollowerRepository::new(&self.conn)
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        if let Err(err) = delete_all(&self.conn) {
            eprintln!("test cleanup failed: {err}");
        }
    }
}

pub fn sync_status(entries: &[(FollowingId, SyncWatermark)]) -> BTreeMap<FollowingId, SyncWatermark> {
    entries.iter().copied().collect()
}
