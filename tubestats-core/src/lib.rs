//! # tubestats-core
//!
//! Core library for tubestats - annual reviews of a YouTube channel's output.
//!
//! This library provides:
//! - Domain types for classified video records
//! - Annual review analytics (general stats and highlights)
//! - Ingestion from JSON exports and the classified videos API
//! - A SQLite store for generated reviews
//! - The keyword card editor
//! - Configuration management and logging infrastructure
//!
//! ## Example
//!
//! ```rust,no_run
//! use tubestats_core::analytics::{compute_annual_review_stats_with, ReviewOptions, ReviewPeriod};
//! use tubestats_core::ingest::{load_videos, prepare_videos};
//! use tubestats_core::Config;
//! use std::path::Path;
//!
//! let config = Config::load().expect("failed to load config");
//! let videos = load_videos(Path::new("videos.json")).expect("failed to load videos");
//! let (videos, _) = prepare_videos(videos, ReviewPeriod::Year(2024), &config.review)
//!     .expect("invalid review config");
//!
//! let options = ReviewOptions::with_offset(config.review.utc_offset().expect("invalid offset"));
//! let review = compute_annual_review_stats_with(&videos, &options);
//! println!("{} live videos", review.stats.video_counts.live);
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use db::Database;
pub use error::{Error, Result};
pub use types::*;

// Public modules
pub mod analytics;
pub mod config;
pub mod db;
pub mod editor;
pub mod error;
pub mod format;
pub mod ingest;
pub mod logging;
pub mod types;
