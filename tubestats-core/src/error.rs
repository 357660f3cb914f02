//! Error types for tubestats-core

use thiserror::Error;

/// Main error type for the tubestats-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Classified videos API error
    #[error("API error: {0}")]
    Api(String),

    /// Keyword card editor error
    #[error("editor error: {0}")]
    Editor(String),

    /// No stored review for a channel/year
    #[error("review not found: {channel_id} {year}")]
    ReviewNotFound { channel_id: String, year: i32 },
}

/// Result type alias for tubestats-core
pub type Result<T> = std::result::Result<T, Error>;
