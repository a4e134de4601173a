//! Domain model for bridged federation accounts.
//!
//! # Responsibility
//! - Define canonical data structures used by the store and services.
//!
//! # Invariants
//! - Every follower is identified by a storage-assigned `FollowerId` and by
//!   its normalized `(acct, host)` handle.

pub mod follower;
