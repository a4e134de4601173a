//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into follow/unfollow level APIs.
//! - Keep protocol handlers decoupled from storage details.

pub mod follower_service;
