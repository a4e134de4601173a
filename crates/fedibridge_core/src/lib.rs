//! Follower storage core for the federation bridge.
//! This crate owns the follower record, its SQLite schema and the
//! follow/unfollow use cases built on top of it.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{delete_all, init_db, open_db, open_db_in_memory, open_db_with_settings, DbSettings};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::follower::{
    Follower, FollowerId, FollowerValidationError, FollowingId, SyncWatermark,
    UNSYNCED_WATERMARK,
};
pub use repo::follower_repo::{
    FollowerRepository, RepoError, RepoResult, SqliteFollowerRepository,
};
pub use service::follower_service::{FollowerService, UnfollowOutcome};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
