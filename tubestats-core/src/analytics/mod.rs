//! Analytics module for tubestats
//!
//! Provides the annual review of a channel:
//! - Annual stats (counts per type and month, live hours, category time)
//! - Special stats (longest stream, longest streak, busiest month, top categories)
//! - Review periods anchored at a fixed UTC offset
//!
//! Every computation is a pure function over a slice of [`VideoRecord`]s.
//! Accumulators live only for the duration of one call.
//!
//! [`VideoRecord`]: crate::types::VideoRecord

pub mod annual;
pub mod period;
pub mod special;

use chrono::{FixedOffset, Offset, Utc};
use std::collections::HashMap;
use std::hash::Hash;

pub use annual::{
    compute_annual_review_stats, compute_annual_review_stats_with, AnnualReview, AnnualStats,
    CategoryRatio, CategoryTime, MonthlyCategoryTime, MonthlyVideoCount, VideoCounts,
};
pub use period::ReviewPeriod;
pub use special::{
    compute_special_stats, compute_special_stats_with, CategoryShare, LiveStreak, LiveSummary,
    MonthActivity, SpecialStats,
};

/// Options shared by the review computations.
#[derive(Debug, Clone, Copy)]
pub struct ReviewOptions {
    /// Offset used to cut publish timestamps into calendar days and months
    pub utc_offset: FixedOffset,
}

impl Default for ReviewOptions {
    fn default() -> Self {
        Self {
            utc_offset: Utc.fix(),
        }
    }
}

impl ReviewOptions {
    pub fn with_offset(utc_offset: FixedOffset) -> Self {
        Self { utc_offset }
    }
}

/// Round half up, so `2.5 -> 3` and `-2.5 -> -2`.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Sums per key, remembering the order keys were first seen.
#[derive(Debug, Clone)]
pub(crate) struct Tally<K> {
    entries: Vec<(K, i64)>,
    index: HashMap<K, usize>,
}

impl<K> Default for Tally<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> Tally<K> {
    pub(crate) fn add(&mut self, key: &K, amount: i64) {
        match self.index.get(key) {
            Some(&i) => {
                let total = &mut self.entries[i].1;
                *total = total.saturating_add(amount);
            }
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key.clone(), amount));
            }
        }
    }

    pub(crate) fn total(&self) -> i64 {
        self.entries
            .iter()
            .fold(0i64, |acc, (_, v)| acc.saturating_add(*v))
    }

    /// Entries in first-seen order.
    pub(crate) fn into_entries(self) -> Vec<(K, i64)> {
        self.entries
    }

    /// Entries by value, largest first; ties keep first-seen order.
    pub(crate) fn into_ranked(self) -> Vec<(K, i64)> {
        let mut entries = self.entries;
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(2.49), 2);
        assert_eq!(round_half_up(0.0), 0);
        assert_eq!(round_half_up(-2.5), -2);
    }

    #[test]
    fn test_tally_keeps_first_seen_order_on_ties() {
        let mut tally = Tally::default();
        tally.add(&"b".to_string(), 10);
        tally.add(&"a".to_string(), 30);
        tally.add(&"c".to_string(), 30);
        tally.add(&"b".to_string(), 5);

        assert_eq!(tally.total(), 75);
        let ranked: Vec<_> = tally.clone().into_ranked();
        assert_eq!(ranked[0].0, "a");
        assert_eq!(ranked[1].0, "c");
        assert_eq!(ranked[2], ("b".to_string(), 15));

        let entries = tally.into_entries();
        assert_eq!(entries[0].0, "b");
    }
}
