//! Ingestion layer for classified video records
//!
//! Video records reach a review from one of two sources and then go through
//! the same preparation steps:
//!
//! ```text
//! ┌─────────────────┐
//! │   JSON export   │ ──┐
//! └─────────────────┘   │     ┌──────────────────────┐     ┌─────────────────┐
//!                       ├───► │ fill_uncategorized   │ ──► │ Vec<VideoRecord>│
//! ┌─────────────────┐   │     │ filter_to_period     │     │  (review input) │
//! │ Classified API  │ ──┘     └──────────────────────┘     └─────────────────┘
//! └─────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tubestats_core::analytics::ReviewPeriod;
//! use tubestats_core::ingest::{load_videos, prepare_videos};
//!
//! let videos = load_videos(Path::new("videos.json"))?;
//! let (videos, summary) = prepare_videos(videos, ReviewPeriod::Year(2024), &config.review)?;
//! println!("{} videos in period", summary.kept);
//! ```

mod client;

pub use client::{ApiClient, ClassifiedVideosRequest, SkipKeywordRequest, SyncApiClient};

use std::path::Path;

use chrono::FixedOffset;
use serde::Deserialize;

use crate::analytics::ReviewPeriod;
use crate::config::ReviewConfig;
use crate::error::{Error, Result};
use crate::types::{MatchedPair, VideoRecord};

/// Body of a classified videos export or API response.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VideoPayload {
    Wrapped { videos: Vec<VideoRecord> },
    Bare(Vec<VideoRecord>),
}

impl VideoPayload {
    fn into_videos(self) -> Vec<VideoRecord> {
        match self {
            VideoPayload::Wrapped { videos } | VideoPayload::Bare(videos) => videos,
        }
    }
}

/// Outcome of preparing records for a review.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestSummary {
    /// Records received
    pub received: usize,
    /// Records given the uncategorized label
    pub filled_uncategorized: usize,
    /// Records dropped for falling outside the period
    pub outside_period: usize,
    /// Records dropped because the publish date could not be parsed
    pub undated: usize,
    /// Records handed to the review
    pub kept: usize,
}

/// Parse video records from JSON text.
///
/// Accepts either a bare array of records or an object with a `videos` array.
pub fn parse_videos(json: &str) -> Result<Vec<VideoRecord>> {
    let payload: VideoPayload = serde_json::from_str(json)?;
    Ok(payload.into_videos())
}

/// Load video records from a JSON file.
pub fn load_videos(path: &Path) -> Result<Vec<VideoRecord>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("failed to read {}: {}", path.display(), e),
        ))
    })?;
    let videos = parse_videos(&content)?;
    tracing::info!(path = %path.display(), count = videos.len(), "Loaded video records");
    Ok(videos)
}

/// Give records without any classifier match the uncategorized label.
///
/// A record is touched only when it has neither `matched_categories` nor
/// `matched_pairs`. Returns how many records were changed.
pub fn fill_uncategorized(videos: &mut [VideoRecord], label: &str) -> usize {
    let mut filled = 0;
    for video in videos.iter_mut().filter(|v| v.is_uncategorized()) {
        video.matched_categories = vec![label.to_string()];
        video.matched_pairs = vec![MatchedPair {
            main: label.to_string(),
            ..Default::default()
        }];
        filled += 1;
    }
    filled
}

/// Keep records published inside `period`.
///
/// Records with unparseable publish dates are dropped; the second value of the
/// returned tuple counts them.
pub fn filter_to_period(
    videos: Vec<VideoRecord>,
    period: ReviewPeriod,
    offset: &FixedOffset,
) -> (Vec<VideoRecord>, usize) {
    let mut undated = 0;
    let kept = videos
        .into_iter()
        .filter(|video| match video.published_at() {
            Some(ts) => period.contains(ts, offset),
            None => {
                tracing::warn!(
                    video_id = %video.video_id,
                    publish_date = %video.publish_date,
                    "Dropping video with unparseable publish date"
                );
                undated += 1;
                false
            }
        })
        .collect();
    (kept, undated)
}

/// Run the preparation steps a review expects.
pub fn prepare_videos(
    mut videos: Vec<VideoRecord>,
    period: ReviewPeriod,
    config: &ReviewConfig,
) -> Result<(Vec<VideoRecord>, IngestSummary)> {
    let offset = config.utc_offset()?;
    let received = videos.len();

    let filled_uncategorized = fill_uncategorized(&mut videos, &config.uncategorized_label);
    let (videos, undated) = filter_to_period(videos, period, &offset);

    let summary = IngestSummary {
        received,
        filled_uncategorized,
        outside_period: received - undated - videos.len(),
        undated,
        kept: videos.len(),
    };

    tracing::info!(
        period = %period.display_name(),
        received = summary.received,
        kept = summary.kept,
        filled_uncategorized = summary.filled_uncategorized,
        "Prepared videos for review"
    );

    Ok((videos, summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(id: &str, date: &str, categories: &[&str]) -> VideoRecord {
        VideoRecord {
            video_id: id.to_string(),
            publish_date: date.to_string(),
            video_type: "live".to_string(),
            matched_categories: categories.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_wrapped_and_bare_payloads() {
        let wrapped = r#"{"videos": [{"videoId": "a", "type": "live"}]}"#;
        assert_eq!(parse_videos(wrapped).unwrap()[0].video_id, "a");

        let bare = r#"[{"videoId": "a"}, {"videoId": "b"}]"#;
        assert_eq!(parse_videos(bare).unwrap().len(), 2);

        assert!(parse_videos(r#"{"items": []}"#).is_err());
    }

    #[test]
    fn test_fill_uncategorized() {
        let mut videos = vec![
            video("a", "2024-01-01T00:00:00Z", &[]),
            video("b", "2024-01-01T00:00:00Z", &["Games"]),
            VideoRecord {
                matched_pairs: vec![MatchedPair {
                    main: "Games".to_string(),
                    keyword: "Tetris".to_string(),
                    hit_keywords: vec![],
                }],
                ..video("c", "2024-01-01T00:00:00Z", &[])
            },
        ];

        let filled = fill_uncategorized(&mut videos, "未分類");
        assert_eq!(filled, 1);
        assert_eq!(videos[0].matched_categories, vec!["未分類"]);
        assert_eq!(videos[0].matched_pairs[0].main, "未分類");
        assert_eq!(videos[1].matched_categories, vec!["Games"]);
        assert!(videos[2].matched_categories.is_empty());
    }

    #[test]
    fn test_filter_to_period() {
        let taipei = FixedOffset::east_opt(8 * 3600).unwrap();
        let videos = vec![
            video("before", "2023-12-31T15:00:00Z", &[]),
            video("first", "2023-12-31T16:00:00Z", &[]),
            video("inside", "2024-06-01T00:00:00Z", &[]),
            video("after", "2024-12-31T16:30:00Z", &[]),
            video("bad", "someday", &[]),
        ];

        let (kept, undated) = filter_to_period(videos, ReviewPeriod::Year(2024), &taipei);
        let ids: Vec<_> = kept.iter().map(|v| v.video_id.as_str()).collect();
        assert_eq!(ids, vec!["first", "inside"]);
        assert_eq!(undated, 1);
    }

    #[test]
    fn test_prepare_videos_summary() {
        let videos = vec![
            video("a", "2024-03-01T00:00:00Z", &[]),
            video("b", "2024-03-02T00:00:00Z", &["Chat"]),
            video("c", "2025-03-01T00:00:00Z", &[]),
            video("d", "", &[]),
        ];

        let (kept, summary) =
            prepare_videos(videos, ReviewPeriod::Year(2024), &ReviewConfig::default()).unwrap();

        assert_eq!(kept.len(), 2);
        assert_eq!(
            summary,
            IngestSummary {
                received: 4,
                filled_uncategorized: 3,
                outside_period: 1,
                undated: 1,
                kept: 2,
            }
        );
    }

    #[test]
    fn test_load_videos_missing_file() {
        let err = load_videos(Path::new("/nonexistent/videos.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/videos.json"));
    }
}
