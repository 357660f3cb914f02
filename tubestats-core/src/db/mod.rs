//! Database layer for tubestats
//!
//! This module provides the storage layer using SQLite with:
//! - Schema migrations
//! - Repository pattern for generated reviews

pub mod repo;
pub mod schema;

pub use repo::{Database, ReviewSummary, StoredReview};
