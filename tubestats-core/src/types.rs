//! Core domain types for tubestats
//!
//! These types describe the classified video records a channel review is
//! computed from.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Video record** | One upload of a channel with its classifier output |
//! | **Video type** | Normalized kind of upload: live stream, regular video or short |
//! | **Category** | A classification label (game or topic) attached to a video |
//! | **Matched pair** | Which main category and keyword produced a category match |
//!
//! Upstream data labels types in free form (`"直播"`, `"Live"`, `" shorts "`).
//! Every consumer goes through [`normalize_type`]; nothing else inspects the raw
//! label.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ============================================
// Video Type
// ============================================

/// Normalized kind of a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoType {
    /// Stream recording
    Live,
    /// Regular upload
    Videos,
    /// Short-form vertical video
    Shorts,
    /// Label we do not know; excluded from every count
    Unrecognized,
}

impl VideoType {
    /// Canonical label of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoType::Live => "live",
            VideoType::Videos => "videos",
            VideoType::Shorts => "shorts",
            VideoType::Unrecognized => "unrecognized",
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, VideoType::Unrecognized)
    }
}

impl std::fmt::Display for VideoType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a free-form type label onto a [`VideoType`].
///
/// Case and surrounding whitespace are ignored. Unknown labels, including the
/// empty string, become [`VideoType::Unrecognized`].
pub fn normalize_type(raw: &str) -> VideoType {
    let label = raw.trim().to_lowercase();
    match label.as_str() {
        "直播檔" | "直播" | "live" => VideoType::Live,
        "影片" | "video" | "videos" => VideoType::Videos,
        "shorts" | "短片" => VideoType::Shorts,
        _ => VideoType::Unrecognized,
    }
}

// ============================================
// Video Record
// ============================================

/// Which main category and keyword a classifier match came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedPair {
    #[serde(default, deserialize_with = "null_as_default")]
    pub main: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub keyword: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hit_keywords: Vec<String>,
}

/// A classified video as delivered by the data loader.
///
/// Missing or `null` fields fall back to empty values so sparse upstream data
/// never fails to load. Fields the review does not use are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub video_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// ISO timestamp as delivered (usually UTC)
    #[serde(default, deserialize_with = "null_as_default")]
    pub publish_date: String,
    /// Length in seconds
    #[serde(default, deserialize_with = "deserialize_seconds")]
    pub duration: Option<i64>,
    /// Free-form type label, see [`normalize_type`]
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub video_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub matched_categories: Vec<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub matched_pairs: Vec<MatchedPair>,
}

impl VideoRecord {
    /// Normalized type of this video.
    pub fn kind(&self) -> VideoType {
        normalize_type(&self.video_type)
    }

    pub fn is_live(&self) -> bool {
        self.kind() == VideoType::Live
    }

    /// Duration in seconds, 0 when unknown.
    pub fn duration_secs(&self) -> i64 {
        self.duration.unwrap_or(0)
    }

    /// Parsed publish time, `None` if the timestamp is malformed.
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        parse_publish_date(&self.publish_date)
    }

    /// Calendar day of publication at the given offset.
    pub fn published_day(&self, offset: &FixedOffset) -> Option<NaiveDate> {
        self.published_at()
            .map(|ts| ts.with_timezone(offset).date_naive())
    }

    /// True when the classifier attached neither categories nor pairs.
    pub fn is_uncategorized(&self) -> bool {
        self.matched_categories.is_empty() && self.matched_pairs.is_empty()
    }
}

/// Parse an upstream publish timestamp.
///
/// Accepts RFC 3339, a date-time without offset (read as UTC) and a bare
/// `YYYY-MM-DD` (UTC midnight).
pub fn parse_publish_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
    ];
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Durations arrive as integers or floats; round to whole seconds.
fn deserialize_seconds<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = Option::<f64>::deserialize(deserializer)?;
    Ok(secs.filter(|s| s.is_finite()).map(|s| s.round() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_normalize_type_labels() {
        assert_eq!(normalize_type("直播檔"), VideoType::Live);
        assert_eq!(normalize_type("直播"), VideoType::Live);
        assert_eq!(normalize_type("  LIVE "), VideoType::Live);
        assert_eq!(normalize_type("影片"), VideoType::Videos);
        assert_eq!(normalize_type("Video"), VideoType::Videos);
        assert_eq!(normalize_type("videos"), VideoType::Videos);
        assert_eq!(normalize_type("Shorts"), VideoType::Shorts);
        assert_eq!(normalize_type("短片"), VideoType::Shorts);
    }

    #[test]
    fn test_normalize_type_unrecognized() {
        assert_eq!(normalize_type(""), VideoType::Unrecognized);
        assert_eq!(normalize_type("   "), VideoType::Unrecognized);
        assert_eq!(normalize_type("podcast"), VideoType::Unrecognized);
        assert_eq!(normalize_type("lives"), VideoType::Unrecognized);
    }

    #[test]
    fn test_normalize_type_idempotent_on_canonical_labels() {
        for kind in [VideoType::Live, VideoType::Videos, VideoType::Shorts] {
            assert_eq!(normalize_type(kind.as_str()), kind);
            assert_eq!(normalize_type(&kind.as_str().to_uppercase()), kind);
        }
        assert!(!VideoType::Unrecognized.is_recognized());
    }

    #[test]
    fn test_parse_publish_date_formats() {
        let ts = parse_publish_date("2024-03-05T16:30:00Z").unwrap();
        assert_eq!((ts.month(), ts.day(), ts.hour()), (3, 5, 16));

        let ts = parse_publish_date("2024-03-05T16:30:00+08:00").unwrap();
        assert_eq!(ts.hour(), 8);

        let ts = parse_publish_date("2024-03-05T16:30:00.000").unwrap();
        assert_eq!(ts.minute(), 30);

        let ts = parse_publish_date("2024-03-05").unwrap();
        assert_eq!((ts.day(), ts.hour()), (5, 0));

        assert!(parse_publish_date("").is_none());
        assert!(parse_publish_date("not a date").is_none());
        assert!(parse_publish_date("2024-13-01").is_none());
    }

    #[test]
    fn test_published_day_uses_offset() {
        let video = VideoRecord {
            publish_date: "2024-01-31T17:00:00Z".to_string(),
            ..Default::default()
        };
        let utc = FixedOffset::east_opt(0).unwrap();
        let taipei = FixedOffset::east_opt(8 * 3600).unwrap();

        assert_eq!(
            video.published_day(&utc),
            NaiveDate::from_ymd_opt(2024, 1, 31)
        );
        assert_eq!(
            video.published_day(&taipei),
            NaiveDate::from_ymd_opt(2024, 2, 1)
        );
    }

    #[test]
    fn test_deserialize_sparse_record() {
        let json = r#"{
            "videoId": "abc",
            "title": "Stream",
            "publishDate": "2024-01-01T12:00:00Z",
            "type": "直播",
            "matchedCategories": null
        }"#;
        let video: VideoRecord = serde_json::from_str(json).unwrap();
        assert_eq!(video.kind(), VideoType::Live);
        assert_eq!(video.duration, None);
        assert_eq!(video.duration_secs(), 0);
        assert!(video.matched_categories.is_empty());
        assert!(video.is_uncategorized());
    }

    #[test]
    fn test_deserialize_float_duration_and_pairs() {
        let json = r#"{
            "videoId": "abc",
            "publishDate": "2024-01-01T12:00:00Z",
            "duration": 3599.6,
            "type": "live",
            "matchedCategories": [],
            "matchedPairs": [{"main": "Games", "keyword": "Elden Ring", "hitKeywords": ["elden"]}]
        }"#;
        let video: VideoRecord = serde_json::from_str(json).unwrap();
        assert_eq!(video.duration, Some(3600));
        assert_eq!(video.matched_pairs[0].hit_keywords, vec!["elden"]);
        assert!(!video.is_uncategorized());
    }
}
