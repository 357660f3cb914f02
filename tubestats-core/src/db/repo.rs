//! Database repository layer
//!
//! Stores generated annual reviews, one per channel and year. Saving a review
//! again for the same channel and year overwrites the previous one.

use crate::analytics::AnnualReview;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A generated review with the context it was generated in.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredReview {
    pub channel_id: String,
    pub year: i32,
    /// Start of the reviewed window (inclusive)
    pub period_start: DateTime<Utc>,
    /// End of the reviewed window (exclusive)
    pub period_end: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
    /// Number of videos the review was computed from
    pub video_count: i64,
    pub review: AnnualReview,
}

impl StoredReview {
    /// Storage key, `"{channel_id}_{year}"`.
    pub fn id(&self) -> String {
        review_id(&self.channel_id, self.year)
    }
}

fn review_id(channel_id: &str, year: i32) -> String {
    format!("{}_{}", channel_id, year)
}

/// Review listing entry without the payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSummary {
    pub channel_id: String,
    pub year: i32,
    pub generated_at: DateTime<Utc>,
    pub video_count: i64,
}

/// Database handle (single connection)
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        let conn = self.lock();
        super::schema::run_migrations(&conn)
    }

    // ============================================
    // Annual review operations
    // ============================================

    /// Insert or overwrite the review of a channel and year
    pub fn upsert_review(&self, stored: &StoredReview) -> Result<()> {
        let stats = serde_json::to_string(&stored.review.stats)?;
        let special = serde_json::to_string(&stored.review.special)?;

        let conn = self.lock();
        conn.execute(
            r#"
            INSERT INTO annual_reviews (
                id, channel_id, year, period_start, period_end, generated_at,
                video_count, stats, special
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(id) DO UPDATE SET
                period_start = excluded.period_start,
                period_end = excluded.period_end,
                generated_at = excluded.generated_at,
                video_count = excluded.video_count,
                stats = excluded.stats,
                special = excluded.special
            "#,
            params![
                stored.id(),
                stored.channel_id,
                stored.year,
                stored.period_start.to_rfc3339(),
                stored.period_end.to_rfc3339(),
                stored.generated_at.to_rfc3339(),
                stored.video_count,
                stats,
                special,
            ],
        )?;

        tracing::info!(
            id = %stored.id(),
            video_count = stored.video_count,
            "Saved annual review"
        );
        Ok(())
    }

    /// Get the review of a channel and year
    pub fn get_review(&self, channel_id: &str, year: i32) -> Result<Option<StoredReview>> {
        let conn = self.lock();
        conn.query_row(
            r#"
            SELECT channel_id, year, period_start, period_end, generated_at,
                   video_count, stats, special
            FROM annual_reviews
            WHERE id = ?
            "#,
            [review_id(channel_id, year)],
            Self::row_to_review,
        )
        .optional()
        .map_err(Error::from)
    }

    /// Get the review of a channel and year, failing if it was never saved
    pub fn require_review(&self, channel_id: &str, year: i32) -> Result<StoredReview> {
        self.get_review(channel_id, year)?
            .ok_or_else(|| Error::ReviewNotFound {
                channel_id: channel_id.to_string(),
                year,
            })
    }

    /// List saved reviews of a channel, most recent year first
    pub fn list_reviews(&self, channel_id: &str) -> Result<Vec<ReviewSummary>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            r#"
            SELECT channel_id, year, generated_at, video_count
            FROM annual_reviews
            WHERE channel_id = ?
            ORDER BY year DESC
            "#,
        )?;

        let reviews = stmt
            .query_map([channel_id], |row| {
                Ok(ReviewSummary {
                    channel_id: row.get(0)?,
                    year: row.get(1)?,
                    generated_at: parse_datetime(row, 2)?,
                    video_count: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(reviews)
    }

    /// Delete the review of a channel and year; returns whether one existed
    pub fn delete_review(&self, channel_id: &str, year: i32) -> Result<bool> {
        let conn = self.lock();
        let deleted = conn.execute(
            "DELETE FROM annual_reviews WHERE id = ?",
            [review_id(channel_id, year)],
        )?;
        Ok(deleted > 0)
    }

    fn row_to_review(row: &Row<'_>) -> rusqlite::Result<StoredReview> {
        Ok(StoredReview {
            channel_id: row.get(0)?,
            year: row.get(1)?,
            period_start: parse_datetime(row, 2)?,
            period_end: parse_datetime(row, 3)?,
            generated_at: parse_datetime(row, 4)?,
            video_count: row.get(5)?,
            review: AnnualReview {
                stats: parse_json(row, 6)?,
                special: parse_json(row, 7)?,
            },
        })
    }
}

fn parse_datetime(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_json<T: serde::de::DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
