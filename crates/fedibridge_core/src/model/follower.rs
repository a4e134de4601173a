//! Follower domain model.
//!
//! # Responsibility
//! - Define the remote-account record tracked by the bridge.
//! - Provide handle validation and normalization shared by all store paths.
//!
//! # Invariants
//! - `(acct, host)` is stored lowercased; no other rewriting is applied.
//! - `id` is assigned by storage once and never changes afterwards.
//! - `followings` order is preserved; `followings_sync_status` is keyed
//!   independently and may cover a different set of ids.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned surrogate key of a follower row.
pub type FollowerId = i64;

/// Identifier of an upstream account a follower is following.
pub type FollowingId = i32;

/// Last synchronization point recorded for one following id.
pub type SyncWatermark = i64;

/// Watermark seeded for a following id that has never been synced.
pub const UNSYNCED_WATERMARK: SyncWatermark = -1;

/// Validation errors for follower handles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowerValidationError {
    EmptyAcct,
    EmptyHost,
}

impl Display for FollowerValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyAcct => write!(f, "follower acct cannot be empty"),
            Self::EmptyHost => write!(f, "follower host cannot be empty"),
        }
    }
}

impl Error for FollowerValidationError {}

/// A remote account following content bridged by this instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follower {
    pub id: FollowerId,
    /// Account handle on the originating host, without the `@host` part.
    pub acct: String,
    /// Domain of the originating server.
    pub host: String,
    /// Upstream account ids this follower follows, in stored order.
    pub followings: Vec<FollowingId>,
    /// Per following id sync watermark.
    pub followings_sync_status: BTreeMap<FollowingId, SyncWatermark>,
}

impl Follower {
    /// Validates handle-level invariants of a loaded or constructed follower.
    pub fn validate(&self) -> Result<(), FollowerValidationError> {
        validate_handle(&self.acct, &self.host)
    }

    /// Returns whether `following_id` is an element of `followings`.
    pub fn is_following(&self, following_id: FollowingId) -> bool {
        self.followings.contains(&following_id)
    }
}

/// Rejects empty or whitespace-only handle parts.
pub fn validate_handle(acct: &str, host: &str) -> Result<(), FollowerValidationError> {
    if acct.trim().is_empty() {
        return Err(FollowerValidationError::EmptyAcct);
    }
    if host.trim().is_empty() {
        return Err(FollowerValidationError::EmptyHost);
    }
    Ok(())
}

/// Validates and normalizes a handle into its stored form.
///
/// Both parts are lowercased so `MyHandle@Domain.ext` and
/// `myhandle@domain.ext` address the same follower. Surrounding whitespace
/// is kept and takes part in the exact match.
pub fn normalize_handle(
    acct: &str,
    host: &str,
) -> Result<(String, String), FollowerValidationError> {
    validate_handle(acct, host)?;
    Ok((acct.to_lowercase(), host.to_lowercase()))
}
