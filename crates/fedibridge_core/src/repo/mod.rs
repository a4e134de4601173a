//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define data access contracts consumed by the service layer.
//! - Isolate SQLite query details from follow/unfollow orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `AlreadyExists`)
//!   in addition to DB transport errors.
//! - Absence on reads is `Ok(None)` / an empty list, never an error.

pub mod follower_repo;
