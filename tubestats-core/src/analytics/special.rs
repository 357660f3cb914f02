//! Special stats - the superlatives of a review
//!
//! Everything here looks at live videos only: the longest stream, the longest
//! run of consecutive streaming days, the month with the most streamed time and
//! the categories streamed the longest.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{round_half_up, ReviewOptions, Tally};
use crate::types::VideoRecord;

/// A single live video as shown in highlights.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveSummary {
    pub video_id: String,
    pub title: String,
    /// Duration in seconds
    pub duration: i64,
    /// Publish timestamp as delivered
    pub publish_date: String,
}

impl From<&VideoRecord> for LiveSummary {
    fn from(video: &VideoRecord) -> Self {
        Self {
            video_id: video.video_id.clone(),
            title: video.title.clone(),
            duration: video.duration_secs(),
            publish_date: video.publish_date.clone(),
        }
    }
}

/// The longest run of consecutive days with at least one live video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStreak {
    pub days: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Live seconds streamed during the streak
    pub total_duration: i64,
    /// Streams of the streak, by day then publish time
    pub items: Vec<LiveSummary>,
}

/// Month with the most live seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthActivity {
    /// Month 1-12
    pub month: u32,
    pub total_duration: i64,
}

/// A category's share of all category-attributed live time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryShare {
    pub category: String,
    pub total_duration: i64,
    /// Rounded percentage of the summed category durations
    pub percentage: i64,
}

/// Superlatives computed over the live videos of a review.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialStats {
    pub longest_live: Option<LiveSummary>,
    pub longest_streak_days: i64,
    pub longest_live_streak: Option<LiveStreak>,
    pub most_active_month: Option<MonthActivity>,
    pub top_game: Option<CategoryShare>,
    pub second_top_game: Option<CategoryShare>,
    pub distinct_game_count: usize,
    pub distinct_game_list: Vec<String>,
}

/// Streak being walked over sorted day keys.
struct StreakRun<'a> {
    days: i64,
    start: NaiveDate,
    end: NaiveDate,
    total_duration: i64,
    items: Vec<(DateTime<Utc>, &'a VideoRecord)>,
}

impl<'a> StreakRun<'a> {
    fn start(day: NaiveDate, items: &[(DateTime<Utc>, &'a VideoRecord)]) -> Self {
        Self {
            days: 1,
            start: day,
            end: day,
            total_duration: day_duration(items),
            items: items.to_vec(),
        }
    }

    fn extend(&mut self, day: NaiveDate, items: &[(DateTime<Utc>, &'a VideoRecord)]) {
        self.days += 1;
        self.end = day;
        self.total_duration = self.total_duration.saturating_add(day_duration(items));
        self.items.extend_from_slice(items);
    }

    /// Longer wins, then more streamed time, then the later end date.
    fn beats(&self, other: &StreakRun<'_>) -> bool {
        (self.days, self.total_duration, self.end) > (other.days, other.total_duration, other.end)
    }

    fn into_streak(self) -> LiveStreak {
        LiveStreak {
            days: self.days,
            start_date: self.start,
            end_date: self.end,
            total_duration: self.total_duration,
            items: self
                .items
                .into_iter()
                .map(|(_, video)| LiveSummary::from(video))
                .collect(),
        }
    }
}

fn day_duration(items: &[(DateTime<Utc>, &VideoRecord)]) -> i64 {
    items
        .iter()
        .fold(0i64, |acc, (_, v)| acc.saturating_add(v.duration_secs()))
}

fn keep_better<'a>(best: Option<StreakRun<'a>>, candidate: StreakRun<'a>) -> Option<StreakRun<'a>> {
    match best {
        Some(best) if !candidate.beats(&best) => Some(best),
        _ => Some(candidate),
    }
}

fn longest_streak(live: &[&VideoRecord], options: &ReviewOptions) -> Option<LiveStreak> {
    let mut by_day: BTreeMap<NaiveDate, Vec<(DateTime<Utc>, &VideoRecord)>> = BTreeMap::new();
    for video in live.iter().copied() {
        if let Some(ts) = video.published_at() {
            let day = ts.with_timezone(&options.utc_offset).date_naive();
            by_day.entry(day).or_default().push((ts, video));
        }
    }

    let mut best: Option<StreakRun<'_>> = None;
    let mut current: Option<StreakRun<'_>> = None;
    let mut prev_day: Option<NaiveDate> = None;

    for (day, items) in by_day.iter_mut() {
        items.sort_by_key(|(ts, _)| *ts);

        match (current.as_mut(), prev_day) {
            (Some(run), Some(prev)) if (*day - prev).num_days() == 1 => run.extend(*day, items),
            _ => {
                if let Some(run) = current.take() {
                    best = keep_better(best, run);
                }
                current = Some(StreakRun::start(*day, items));
            }
        }
        prev_day = Some(*day);
    }
    if let Some(run) = current {
        best = keep_better(best, run);
    }

    best.map(StreakRun::into_streak)
}

fn share(category: String, total_duration: i64, total: i64) -> CategoryShare {
    let percentage = if total > 0 {
        round_half_up(total_duration as f64 / total as f64 * 100.0)
    } else {
        0
    };
    CategoryShare {
        category,
        total_duration,
        percentage,
    }
}

/// Compute special stats with days and months cut in UTC.
pub fn compute_special_stats(videos: &[VideoRecord]) -> SpecialStats {
    compute_special_stats_with(videos, &ReviewOptions::default())
}

/// Compute special stats for a collection of videos.
///
/// Only live videos are considered. Videos whose publish date cannot be
/// parsed still count for the longest stream and category time, but not for
/// streaks or the busiest month.
pub fn compute_special_stats_with(videos: &[VideoRecord], options: &ReviewOptions) -> SpecialStats {
    let live: Vec<&VideoRecord> = videos.iter().filter(|v| v.is_live()).collect();
    if live.is_empty() {
        return SpecialStats::default();
    }

    // First encountered wins ties
    let longest_live = live
        .iter()
        .copied()
        .reduce(|best, v| {
            if v.duration_secs() > best.duration_secs() {
                v
            } else {
                best
            }
        })
        .map(LiveSummary::from);

    let longest_live_streak = longest_streak(&live, options);

    let mut month_durations: Tally<u32> = Tally::default();
    for video in &live {
        if let Some(ts) = video.published_at() {
            let month = ts.with_timezone(&options.utc_offset).month();
            month_durations.add(&month, video.duration_secs());
        }
    }
    let most_active_month = month_durations
        .into_ranked()
        .into_iter()
        .next()
        .map(|(month, total_duration)| MonthActivity {
            month,
            total_duration,
        });

    let mut category_durations: Tally<String> = Tally::default();
    for video in &live {
        for category in &video.matched_categories {
            category_durations.add(category, video.duration_secs());
        }
    }
    let total_category_duration = category_durations.total();
    let ranked = category_durations.into_ranked();

    let mut shares = ranked
        .iter()
        .take(2)
        .map(|(category, secs)| share(category.clone(), *secs, total_category_duration));
    let top_game = shares.next();
    let second_top_game = shares.next();

    let distinct_game_list: Vec<String> = ranked.into_iter().map(|(category, _)| category).collect();

    tracing::debug!(
        live_videos = live.len(),
        categories = distinct_game_list.len(),
        "Computed special stats"
    );

    SpecialStats {
        longest_live,
        longest_streak_days: longest_live_streak.as_ref().map_or(0, |s| s.days),
        longest_live_streak,
        most_active_month,
        top_game,
        second_top_game,
        distinct_game_count: distinct_game_list.len(),
        distinct_game_list,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn live(id: &str, date: &str, duration: Option<i64>, categories: &[&str]) -> VideoRecord {
        VideoRecord {
            video_id: id.to_string(),
            title: format!("Stream {}", id),
            publish_date: date.to_string(),
            duration,
            video_type: "直播".to_string(),
            matched_categories: categories.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_no_live_videos() {
        let videos = vec![VideoRecord {
            video_type: "shorts".to_string(),
            publish_date: "2024-01-01T00:00:00Z".to_string(),
            duration: Some(30),
            ..Default::default()
        }];
        let special = compute_special_stats(&videos);
        assert_eq!(special, SpecialStats::default());
        assert!(special.longest_live.is_none());
        assert_eq!(special.longest_streak_days, 0);
        assert!(special.distinct_game_list.is_empty());
    }

    #[test]
    fn test_consecutive_days_streak() {
        let videos = vec![
            live("a", "2024-01-01T12:00:00Z", Some(3600), &[]),
            live("b", "2024-01-02T12:00:00Z", Some(3600), &[]),
            live("c", "2024-01-03T12:00:00Z", Some(3600), &[]),
        ];
        let special = compute_special_stats(&videos);
        assert_eq!(special.longest_streak_days, 3);

        let streak = special.longest_live_streak.unwrap();
        assert_eq!(streak.start_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(streak.end_date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(streak.total_duration, 10800);
        assert_eq!(streak.items.len(), 3);
    }

    #[test]
    fn test_single_day_and_gap() {
        let videos = vec![
            live("a", "2024-03-01T10:00:00Z", Some(100), &[]),
            live("b", "2024-03-01T20:00:00Z", Some(100), &[]),
        ];
        assert_eq!(compute_special_stats(&videos).longest_streak_days, 1);

        let videos = vec![
            live("a", "2024-03-01T10:00:00Z", Some(100), &[]),
            live("b", "2024-03-03T10:00:00Z", Some(100), &[]),
            live("c", "2024-03-04T10:00:00Z", Some(100), &[]),
        ];
        assert_eq!(compute_special_stats(&videos).longest_streak_days, 2);
    }

    #[test]
    fn test_streak_tie_breaks_on_duration_then_end_date() {
        let videos = vec![
            live("a", "2024-01-01T10:00:00Z", Some(100), &[]),
            live("b", "2024-01-02T10:00:00Z", Some(100), &[]),
            live("c", "2024-01-10T10:00:00Z", Some(500), &[]),
            live("d", "2024-01-11T10:00:00Z", Some(100), &[]),
        ];
        let streak = compute_special_stats(&videos).longest_live_streak.unwrap();
        assert_eq!(streak.start_date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());

        let videos = vec![
            live("a", "2024-01-01T10:00:00Z", Some(100), &[]),
            live("b", "2024-01-02T10:00:00Z", Some(100), &[]),
            live("c", "2024-01-10T10:00:00Z", Some(100), &[]),
            live("d", "2024-01-11T10:00:00Z", Some(100), &[]),
        ];
        let streak = compute_special_stats(&videos).longest_live_streak.unwrap();
        assert_eq!(streak.end_date, NaiveDate::from_ymd_opt(2024, 1, 11).unwrap());
    }

    #[test]
    fn test_streak_items_sorted_by_time() {
        let videos = vec![
            live("late", "2024-01-02T20:00:00Z", Some(1), &[]),
            live("early", "2024-01-02T08:00:00Z", Some(1), &[]),
            live("first", "2024-01-01T23:00:00Z", Some(1), &[]),
        ];
        let streak = compute_special_stats(&videos).longest_live_streak.unwrap();
        let ids: Vec<_> = streak.items.iter().map(|i| i.video_id.as_str()).collect();
        assert_eq!(ids, vec!["first", "early", "late"]);
    }

    #[test]
    fn test_streak_respects_offset() {
        // 2024-01-01T17:00Z is Jan 2 in Taipei
        let videos = vec![
            live("a", "2024-01-01T01:00:00Z", Some(1), &[]),
            live("b", "2024-01-01T17:00:00Z", Some(1), &[]),
        ];
        assert_eq!(compute_special_stats(&videos).longest_streak_days, 1);

        let taipei = ReviewOptions::with_offset(FixedOffset::east_opt(8 * 3600).unwrap());
        assert_eq!(
            compute_special_stats_with(&videos, &taipei).longest_streak_days,
            2
        );
    }

    #[test]
    fn test_longest_live_first_wins_ties() {
        let videos = vec![
            live("short", "2024-01-01T00:00:00Z", Some(10), &[]),
            live("first", "2024-01-02T00:00:00Z", Some(7200), &[]),
            live("second", "2024-01-03T00:00:00Z", Some(7200), &[]),
        ];
        let longest = compute_special_stats(&videos).longest_live.unwrap();
        assert_eq!(longest.video_id, "first");
        assert_eq!(longest.duration, 7200);
    }

    #[test]
    fn test_missing_duration_counts_as_zero() {
        let videos = vec![live("a", "2024-01-01T00:00:00Z", None, &["A"])];
        let special = compute_special_stats(&videos);
        assert_eq!(special.longest_live.unwrap().duration, 0);
        let top = special.top_game.unwrap();
        assert_eq!(top.total_duration, 0);
        assert_eq!(top.percentage, 0);
    }

    #[test]
    fn test_top_categories_double_count() {
        let videos = vec![
            live("a", "2024-01-01T00:00:00Z", Some(100), &["A"]),
            live("b", "2024-01-02T00:00:00Z", Some(50), &["A", "B"]),
        ];
        let special = compute_special_stats(&videos);

        assert_eq!(
            special.top_game,
            Some(CategoryShare {
                category: "A".to_string(),
                total_duration: 150,
                percentage: 75,
            })
        );
        assert_eq!(
            special.second_top_game,
            Some(CategoryShare {
                category: "B".to_string(),
                total_duration: 50,
                percentage: 25,
            })
        );
        assert_eq!(special.distinct_game_list, vec!["A", "B"]);
        assert_eq!(special.distinct_game_count, 2);
    }

    #[test]
    fn test_most_active_month_first_inserted_wins_ties() {
        let videos = vec![
            live("a", "2024-05-01T00:00:00Z", Some(100), &[]),
            live("b", "2024-02-01T00:00:00Z", Some(100), &[]),
            live("c", "2024-03-01T00:00:00Z", Some(40), &[]),
        ];
        let month = compute_special_stats(&videos).most_active_month.unwrap();
        assert_eq!(month.month, 5);
        assert_eq!(month.total_duration, 100);
    }

    #[test]
    fn test_unparseable_date_excluded_from_calendar_stats() {
        let videos = vec![
            live("bad", "yesterday", Some(9000), &["A"]),
            live("ok", "2024-07-01T00:00:00Z", Some(100), &["B"]),
        ];
        let special = compute_special_stats(&videos);
        assert_eq!(special.longest_live.unwrap().video_id, "bad");
        assert_eq!(special.longest_streak_days, 1);
        assert_eq!(special.most_active_month.unwrap().month, 7);
        assert_eq!(special.top_game.unwrap().category, "A");
    }
}
