//! Follower repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and reverse-lookup APIs over `followers` storage.
//! - Keep SQL and column encoding details inside the persistence boundary.
//!
//! # Invariants
//! - Handle inputs are normalized via `normalize_handle` before any SQL.
//! - A follower row and its `follower_followings` rows are written in the
//!   same transaction.
//! - `followings` and `followings_sync_status` are replaced wholesale on
//!   update, never merged.
//! - Duplicate `(acct, host)` creates surface as `RepoError::AlreadyExists`.

use crate::db::DbError;
use crate::model::follower::{
    normalize_handle, Follower, FollowerId, FollowerValidationError, FollowingId, SyncWatermark,
};
use rusqlite::{ffi, params, Connection, ErrorCode, Row};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

const FOLLOWER_SELECT_SQL: &str = "SELECT
    id,
    acct,
    host,
    followings_sync
FROM followers";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for follower persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(FollowerValidationError),
    Db(DbError),
    /// Unique constraint violation on the normalized `(acct, host)` pair.
    AlreadyExists {
        acct: String,
        host: String,
    },
    NotFound(FollowerId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::AlreadyExists { acct, host } => {
                write!(f, "follower already exists: {acct}@{host}")
            }
            Self::NotFound(id) => write!(f, "follower not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted follower data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::AlreadyExists { .. } | Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<FollowerValidationError> for RepoError {
    fn from(value: FollowerValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for follower storage.
pub trait FollowerRepository {
    fn create_follower(
        &self,
        acct: &str,
        host: &str,
        followings: &[FollowingId],
        followings_sync: &BTreeMap<FollowingId, SyncWatermark>,
    ) -> RepoResult<FollowerId>;
    fn get_follower(&self, acct: &str, host: &str) -> RepoResult<Option<Follower>>;
    fn get_follower_by_id(&self, id: FollowerId) -> RepoResult<Option<Follower>>;
    fn get_followers(&self, following_id: FollowingId) -> RepoResult<Vec<Follower>>;
    fn get_all_followers(&self) -> RepoResult<Vec<Follower>>;
    fn get_followers_count(&self) -> RepoResult<u64>;
    fn update_follower(
        &self,
        id: FollowerId,
        followings: &[FollowingId],
        followings_sync: &BTreeMap<FollowingId, SyncWatermark>,
    ) -> RepoResult<()>;
    fn delete_follower(&self, id: FollowerId) -> RepoResult<()>;
    fn delete_follower_by_handle(&self, acct: &str, host: &str) -> RepoResult<()>;
}

/// SQLite-backed follower repository.
pub struct SqliteFollowerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFollowerRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_followers(
        &self,
        filter_sql: &str,
        params: impl rusqlite::Params,
    ) -> RepoResult<Vec<Follower>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{FOLLOWER_SELECT_SQL} {filter_sql}"))?;
        let mut rows = stmt.query(params)?;
        let mut followers = Vec::new();

        while let Some(row) = rows.next()? {
            followers.push(parse_follower_row(row)?);
        }
        for follower in &mut followers {
            follower.followings = load_followings(self.conn, follower.id)?;
        }

        Ok(followers)
    }
}

impl FollowerRepository for SqliteFollowerRepository<'_> {
    fn create_follower(
        &self,
        acct: &str,
        host: &str,
        followings: &[FollowingId],
        followings_sync: &BTreeMap<FollowingId, SyncWatermark>,
    ) -> RepoResult<FollowerId> {
        let (acct, host) = normalize_handle(acct, host)?;
        let sync_json = encode_sync_status(followings_sync)?;

        let tx = self.conn.unchecked_transaction()?;
        let inserted = tx.execute(
            "INSERT INTO followers (
                acct,
                host,
                followings_sync
            ) VALUES (?1, ?2, ?3);",
            params![&acct, &host, &sync_json],
        );
        match inserted {
            Ok(_) => {}
            Err(err) if is_unique_violation(&err) => {
                return Err(RepoError::AlreadyExists { acct, host });
            }
            Err(err) => return Err(err.into()),
        }

        let id = tx.last_insert_rowid();
        insert_followings(&tx, id, followings)?;
        tx.commit()?;

        Ok(id)
    }

    fn get_follower(&self, acct: &str, host: &str) -> RepoResult<Option<Follower>> {
        let (acct, host) = normalize_handle(acct, host)?;
        let followers = self.query_followers("WHERE acct = ?1 AND host = ?2;", params![acct, host])?;
        Ok(followers.into_iter().next())
    }

    fn get_follower_by_id(&self, id: FollowerId) -> RepoResult<Option<Follower>> {
        let followers = self.query_followers("WHERE id = ?1;", [id])?;
        Ok(followers.into_iter().next())
    }

    fn get_followers(&self, following_id: FollowingId) -> RepoResult<Vec<Follower>> {
        self.query_followers(
            "WHERE EXISTS (
                SELECT 1
                FROM follower_followings
                WHERE follower_followings.follower_id = followers.id
                  AND follower_followings.following_id = ?1
             )
             ORDER BY id ASC;",
            [following_id],
        )
    }

    fn get_all_followers(&self) -> RepoResult<Vec<Follower>> {
        self.query_followers("ORDER BY id ASC;", [])
    }

    fn get_followers_count(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM followers;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative follower count `{count}`")))
    }

    fn update_follower(
        &self,
        id: FollowerId,
        followings: &[FollowingId],
        followings_sync: &BTreeMap<FollowingId, SyncWatermark>,
    ) -> RepoResult<()> {
        let sync_json = encode_sync_status(followings_sync)?;

        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE followers
             SET
                followings_sync = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?2;",
            params![sync_json, id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        tx.execute(
            "DELETE FROM follower_followings WHERE follower_id = ?1;",
            [id],
        )?;
        insert_followings(&tx, id, followings)?;
        tx.commit()?;

        Ok(())
    }

    fn delete_follower(&self, id: FollowerId) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM follower_followings WHERE follower_id = ?1;",
            [id],
        )?;
        tx.execute("DELETE FROM followers WHERE id = ?1;", [id])?;
        tx.commit()?;
        Ok(())
    }

    fn delete_follower_by_handle(&self, acct: &str, host: &str) -> RepoResult<()> {
        let (acct, host) = normalize_handle(acct, host)?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM follower_followings
             WHERE follower_id IN (
                SELECT id FROM followers WHERE acct = ?1 AND host = ?2
             );",
            params![acct, host],
        )?;
        tx.execute(
            "DELETE FROM followers WHERE acct = ?1 AND host = ?2;",
            params![acct, host],
        )?;
        tx.commit()?;
        Ok(())
    }
}

fn parse_follower_row(row: &Row<'_>) -> RepoResult<Follower> {
    let id: FollowerId = row.get("id")?;
    let sync_text: String = row.get("followings_sync")?;
    let followings_sync_status = decode_sync_status(&sync_text).map_err(|err| {
        RepoError::InvalidData(format!(
            "invalid followings_sync value `{sync_text}` in followers.followings_sync for id {id}: {err}"
        ))
    })?;

    let follower = Follower {
        id,
        acct: row.get("acct")?,
        host: row.get("host")?,
        followings: Vec::new(),
        followings_sync_status,
    };
    follower.validate()?;
    Ok(follower)
}

fn load_followings(conn: &Connection, id: FollowerId) -> RepoResult<Vec<FollowingId>> {
    let mut stmt = conn.prepare_cached(
        "SELECT following_id
         FROM follower_followings
         WHERE follower_id = ?1
         ORDER BY position ASC;",
    )?;
    let followings = stmt
        .query_map([id], |row| row.get::<_, FollowingId>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(followings)
}

fn insert_followings(
    conn: &Connection,
    id: FollowerId,
    followings: &[FollowingId],
) -> RepoResult<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO follower_followings (
            follower_id,
            position,
            following_id
        ) VALUES (?1, ?2, ?3);",
    )?;
    for (position, following_id) in followings.iter().enumerate() {
        let position = i64::try_from(position).map_err(|_| {
            RepoError::InvalidData(format!("followings position {position} overflows i64"))
        })?;
        stmt.execute(params![id, position, following_id])?;
    }
    Ok(())
}

fn encode_sync_status(status: &BTreeMap<FollowingId, SyncWatermark>) -> RepoResult<String> {
    serde_json::to_string(status)
        .map_err(|err| RepoError::InvalidData(format!("failed to encode followings_sync: {err}")))
}

fn decode_sync_status(
    value: &str,
) -> Result<BTreeMap<FollowingId, SyncWatermark>, serde_json::Error> {
    serde_json::from_str(value)
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => {
            failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
        }
        _ => false,
    }
}
