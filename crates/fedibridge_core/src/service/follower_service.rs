//! Follower use-case service.
//!
//! # Responsibility
//! - Provide stable entry points for callers handling follow/unfollow
//!   activities and sync progress.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository normalization or error contracts.
//! - Service layer remains storage-agnostic.
//! - A follower with no remaining followings is removed by `unfollow`.

use crate::model::follower::{
    Follower, FollowerId, FollowingId, SyncWatermark, UNSYNCED_WATERMARK,
};
use crate::repo::follower_repo::{FollowerRepository, RepoError, RepoResult};
use log::info;
use std::collections::BTreeMap;

/// Result of an `unfollow` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnfollowOutcome {
    /// No follower or the follower did not follow the id.
    NotFollowing,
    /// The id was removed and other followings remain.
    Updated(FollowerId),
    /// The last following was removed, so the follower was deleted.
    Removed(FollowerId),
}

/// Use-case service wrapper for follower storage.
pub struct FollowerService<R: FollowerRepository> {
    repo: R,
}

impl<R: FollowerRepository> FollowerService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_follower(
        &self,
        acct: &str,
        host: &str,
        followings: &[FollowingId],
        followings_sync: &BTreeMap<FollowingId, SyncWatermark>,
    ) -> RepoResult<FollowerId> {
        self.repo.create_follower(acct, host, followings, followings_sync)
    }

    pub fn get_follower(&self, acct: &str, host: &str) -> RepoResult<Option<Follower>> {
        self.repo.get_follower(acct, host)
    }

    pub fn get_follower_by_id(&self, id: FollowerId) -> RepoResult<Option<Follower>> {
        self.repo.get_follower_by_id(id)
    }

    /// Lists followers whose `followings` contain `following_id`.
    pub fn get_followers(&self, following_id: FollowingId) -> RepoResult<Vec<Follower>> {
        self.repo.get_followers(following_id)
    }

    pub fn get_all_followers(&self) -> RepoResult<Vec<Follower>> {
        self.repo.get_all_followers()
    }

    pub fn get_followers_count(&self) -> RepoResult<u64> {
        self.repo.get_followers_count()
    }

    /// Replaces both collections of follower `id`.
    ///
    /// Returns `RepoError::NotFound` unchanged when `id` is unknown.
    pub fn update_follower(
        &self,
        id: FollowerId,
        followings: &[FollowingId],
        followings_sync: &BTreeMap<FollowingId, SyncWatermark>,
    ) -> RepoResult<()> {
        self.repo.update_follower(id, followings, followings_sync)
    }

    pub fn delete_follower(&self, id: FollowerId) -> RepoResult<()> {
        self.repo.delete_follower(id)
    }

    pub fn delete_follower_by_handle(&self, acct: &str, host: &str) -> RepoResult<()> {
        self.repo.delete_follower_by_handle(acct, host)
    }

    /// Records that `acct@host` follows `following_id`.
    ///
    /// # Contract
    /// - Creates the follower when absent.
    /// - Appends `following_id` once; repeated calls are no-ops.
    /// - Seeds the watermark with `UNSYNCED_WATERMARK` only when no entry
    ///   exists, so sync progress survives a repeated follow.
    pub fn follow(
        &self,
        acct: &str,
        host: &str,
        following_id: FollowingId,
    ) -> RepoResult<FollowerId> {
        let Some(mut follower) = self.repo.get_follower(acct, host)? else {
            let sync = BTreeMap::from([(following_id, UNSYNCED_WATERMARK)]);
            let id = self.repo.create_follower(acct, host, &[following_id], &sync)?;
            info!(
                "event=follow module=service status=ok follower_id={} following_id={} created=true",
                id, following_id
            );
            return Ok(id);
        };

        let mut changed = false;
        if !follower.is_following(following_id) {
            follower.followings.push(following_id);
            changed = true;
        }
        if !follower.followings_sync_status.contains_key(&following_id) {
            follower
                .followings_sync_status
                .insert(following_id, UNSYNCED_WATERMARK);
            changed = true;
        }

        if changed {
            self.repo.update_follower(
                follower.id,
                &follower.followings,
                &follower.followings_sync_status,
            )?;
        }
        info!(
            "event=follow module=service status=ok follower_id={} following_id={} created=false changed={}",
            follower.id, following_id, changed
        );
        Ok(follower.id)
    }

    /// Records that `acct@host` stopped following `following_id`.
    pub fn unfollow(
        &self,
        acct: &str,
        host: &str,
        following_id: FollowingId,
    ) -> RepoResult<UnfollowOutcome> {
        let Some(mut follower) = self.repo.get_follower(acct, host)? else {
            return Ok(UnfollowOutcome::NotFollowing);
        };

        let had_sync = follower
            .followings_sync_status
            .remove(&following_id)
            .is_some();
        let before = follower.followings.len();
        follower.followings.retain(|id| *id != following_id);
        if follower.followings.len() == before && !had_sync {
            return Ok(UnfollowOutcome::NotFollowing);
        }

        let outcome = if follower.followings.is_empty() {
            self.repo.delete_follower(follower.id)?;
            UnfollowOutcome::Removed(follower.id)
        } else {
            self.repo.update_follower(
                follower.id,
                &follower.followings,
                &follower.followings_sync_status,
            )?;
            UnfollowOutcome::Updated(follower.id)
        };

        info!(
            "event=unfollow module=service status=ok follower_id={} following_id={} removed={}",
            follower.id,
            following_id,
            matches!(outcome, UnfollowOutcome::Removed(_))
        );
        Ok(outcome)
    }

    /// Sets the sync watermark of one following id for follower `id`.
    ///
    /// `followings` is left as stored.
    pub fn record_sync(
        &self,
        id: FollowerId,
        following_id: FollowingId,
        watermark: SyncWatermark,
    ) -> RepoResult<()> {
        let mut follower = self
            .repo
            .get_follower_by_id(id)?
            .ok_or(RepoError::NotFound(id))?;
        follower
            .followings_sync_status
            .insert(following_id, watermark);
        self.repo.update_follower(
            follower.id,
            &follower.followings,
            &follower.followings_sync_status,
        )
    }
}
