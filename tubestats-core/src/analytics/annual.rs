//! Annual review - counts and durations for a channel's year
//!
//! Buckets videos by normalized type and by month, and adds up live time per
//! category. A live video tagged with several categories contributes its full
//! duration to each of them, so category totals may exceed total live time.

use std::collections::HashSet;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use super::special::{compute_special_stats_with, SpecialStats};
use super::{round_half_up, ReviewOptions, Tally};
use crate::types::{VideoRecord, VideoType};

/// Video counts per type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoCounts {
    pub shorts: i64,
    pub videos: i64,
    pub live: i64,
}

impl VideoCounts {
    /// Count one video of the given type; unrecognized types are ignored.
    pub fn increment(&mut self, kind: VideoType) {
        match kind {
            VideoType::Shorts => self.shorts += 1,
            VideoType::Videos => self.videos += 1,
            VideoType::Live => self.live += 1,
            VideoType::Unrecognized => {}
        }
    }

    pub fn get(&self, kind: VideoType) -> i64 {
        match kind {
            VideoType::Shorts => self.shorts,
            VideoType::Videos => self.videos,
            VideoType::Live => self.live,
            VideoType::Unrecognized => 0,
        }
    }

    pub fn total(&self) -> i64 {
        self.shorts + self.videos + self.live
    }
}

/// Video counts of one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyVideoCount {
    /// Month 1-12
    pub month: u32,
    #[serde(flatten)]
    pub counts: VideoCounts,
}

/// Live seconds attributed to a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTime {
    pub category: String,
    pub seconds: i64,
}

/// Live seconds per category within one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyCategoryTime {
    /// Month 1-12
    pub month: u32,
    pub category_times: Vec<CategoryTime>,
}

/// A category's slice of the category breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRatio {
    pub category: String,
    /// Hours, rounded to one decimal
    pub hours: f64,
    /// Share of the summed hours, 0-100
    pub percentage: f64,
}

/// General statistics of a review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualStats {
    pub video_counts: VideoCounts,
    /// Total live time, rounded to whole hours
    pub total_live_hours: i64,
    /// Distinct calendar days with at least one live video
    pub total_live_days: usize,
    /// Always 12 entries, January first
    pub monthly_video_counts: Vec<MonthlyVideoCount>,
    /// Categories in the order they were first seen
    pub category_time: Vec<CategoryTime>,
    /// Always 12 entries, January first
    pub monthly_category_time: Vec<MonthlyCategoryTime>,
}

impl AnnualStats {
    /// Category breakdown in hours for pie-style summaries.
    ///
    /// Categories are ordered by hours, largest first, with `uncategorized_label`
    /// always last.
    pub fn category_ratio(&self, uncategorized_label: &str) -> Vec<CategoryRatio> {
        let to_hours = |secs: i64| (secs as f64 / 3600.0 * 10.0).round() / 10.0;

        let mut categorized: Vec<(String, f64)> = self
            .category_time
            .iter()
            .filter(|c| c.category != uncategorized_label)
            .map(|c| (c.category.clone(), to_hours(c.seconds)))
            .collect();
        categorized.sort_by(|a, b| b.1.total_cmp(&a.1));

        if let Some(uncategorized) = self
            .category_time
            .iter()
            .find(|c| c.category == uncategorized_label)
        {
            categorized.push((uncategorized.category.clone(), to_hours(uncategorized.seconds)));
        }

        let total: f64 = categorized.iter().map(|(_, hours)| hours).sum();
        categorized
            .into_iter()
            .map(|(category, hours)| CategoryRatio {
                category,
                hours,
                percentage: if total > 0.0 {
                    hours / total * 100.0
                } else {
                    0.0
                },
            })
            .collect()
    }
}

/// Both reports of a review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualReview {
    pub stats: AnnualStats,
    pub special: SpecialStats,
}

/// Compute the annual review with days and months cut in UTC.
pub fn compute_annual_review_stats(videos: &[VideoRecord]) -> AnnualReview {
    compute_annual_review_stats_with(videos, &ReviewOptions::default())
}

/// Compute the annual review for a collection of videos.
///
/// Videos of unrecognized type are skipped entirely. Videos whose publish date
/// cannot be parsed count toward type totals, live hours and overall category
/// time, but are left out of every month bucket and of live days.
pub fn compute_annual_review_stats_with(
    videos: &[VideoRecord],
    options: &ReviewOptions,
) -> AnnualReview {
    let mut video_counts = VideoCounts::default();
    let total_live_seconds: i64 = videos
        .iter()
        .filter(|v| v.is_live())
        .map(|v| v.duration_secs())
        .fold(0i64, i64::saturating_add);

    let mut live_days = HashSet::new();
    let mut monthly_counts = [VideoCounts::default(); 12];
    let mut category_seconds: Tally<String> = Tally::default();
    let mut monthly_category_seconds: Vec<Tally<String>> =
        (0..12).map(|_| Tally::default()).collect();
    let mut undated = 0usize;

    for video in videos {
        let kind = video.kind();
        if !kind.is_recognized() {
            continue;
        }

        video_counts.increment(kind);

        let local = video
            .published_at()
            .map(|ts| ts.with_timezone(&options.utc_offset));
        let month_index = local.map(|ts| ts.month0() as usize);
        match month_index {
            Some(i) => monthly_counts[i].increment(kind),
            None => undated += 1,
        }

        if kind == VideoType::Live {
            if let Some(ts) = local {
                live_days.insert(ts.date_naive());
            }

            let duration = video.duration_secs();
            for category in &video.matched_categories {
                category_seconds.add(category, duration);
                if let Some(i) = month_index {
                    monthly_category_seconds[i].add(category, duration);
                }
            }
        }
    }

    if undated > 0 {
        tracing::warn!(
            undated,
            "Videos with unparseable publish dates left out of monthly buckets"
        );
    }

    let monthly_video_counts = monthly_counts
        .iter()
        .zip(1u32..)
        .map(|(counts, month)| MonthlyVideoCount {
            month,
            counts: *counts,
        })
        .collect();

    let category_time = into_category_times(category_seconds);

    let monthly_category_time = monthly_category_seconds
        .into_iter()
        .zip(1u32..)
        .map(|(tally, month)| MonthlyCategoryTime {
            month,
            category_times: into_category_times(tally),
        })
        .collect();

    tracing::debug!(
        videos = videos.len(),
        live = video_counts.live,
        total_live_seconds,
        "Computed annual stats"
    );

    AnnualReview {
        stats: AnnualStats {
            video_counts,
            total_live_hours: round_half_up(total_live_seconds as f64 / 3600.0),
            total_live_days: live_days.len(),
            monthly_video_counts,
            category_time,
            monthly_category_time,
        },
        special: compute_special_stats_with(videos, options),
    }
}

fn into_category_times(tally: Tally<String>) -> Vec<CategoryTime> {
    tally
        .into_entries()
        .into_iter()
        .map(|(category, seconds)| CategoryTime { category, seconds })
        .collect()
}
