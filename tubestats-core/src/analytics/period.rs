//! Review periods
//!
//! A period is a calendar year or month read at a fixed UTC offset. The
//! product reviews a channel's year as seen from Taipei (UTC+8), so the
//! window `2024` starts at `2023-12-31T16:00:00Z`.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeZone, Utc};

/// Time period a review covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewPeriod {
    /// Full year (e.g., 2024)
    Year(i32),
    /// Specific month (year, month 1-12)
    Month(i32, u32),
}

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// English name of a month (1-12).
pub fn month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|i| MONTH_NAMES.get(i as usize))
        .copied()
        .unwrap_or("Unknown")
}

fn local_midnight(date: NaiveDate, offset: &FixedOffset) -> DateTime<Utc> {
    let naive = date.and_hms_opt(0, 0, 0).unwrap_or_default();
    match offset.from_local_datetime(&naive).single() {
        Some(local) => local.with_timezone(&Utc),
        None => naive.and_utc(),
    }
}

impl ReviewPeriod {
    fn first_day(&self) -> NaiveDate {
        let (year, month) = match *self {
            ReviewPeriod::Year(year) => (year, 1),
            ReviewPeriod::Month(year, month) => (year, month.clamp(1, 12)),
        };
        NaiveDate::from_ymd_opt(year, month, 1).unwrap_or_default()
    }

    fn first_day_after(&self) -> NaiveDate {
        let (year, month) = match *self {
            ReviewPeriod::Year(year) => (year.saturating_add(1), 1),
            ReviewPeriod::Month(year, month) if month >= 12 => (year.saturating_add(1), 1),
            ReviewPeriod::Month(year, month) => (year, month.max(1) + 1),
        };
        NaiveDate::from_ymd_opt(year, month, 1).unwrap_or_default()
    }

    /// Start of this period (inclusive) at the given offset.
    pub fn start(&self, offset: &FixedOffset) -> DateTime<Utc> {
        local_midnight(self.first_day(), offset)
    }

    /// End of this period (exclusive) at the given offset.
    pub fn end(&self, offset: &FixedOffset) -> DateTime<Utc> {
        local_midnight(self.first_day_after(), offset)
    }

    /// Whether a timestamp falls in this period.
    pub fn contains(&self, ts: DateTime<Utc>, offset: &FixedOffset) -> bool {
        ts >= self.start(offset) && ts < self.end(offset)
    }

    /// Number of calendar days in this period.
    pub fn total_days(&self) -> i64 {
        (self.first_day_after() - self.first_day()).num_days()
    }

    /// Calendar year of this period.
    pub fn year(&self) -> i32 {
        match *self {
            ReviewPeriod::Year(year) | ReviewPeriod::Month(year, _) => year,
        }
    }

    /// Get the previous period.
    pub fn previous(&self) -> Self {
        match *self {
            ReviewPeriod::Year(year) => ReviewPeriod::Year(year.saturating_sub(1)),
            ReviewPeriod::Month(year, month) if month <= 1 => {
                ReviewPeriod::Month(year.saturating_sub(1), 12)
            }
            ReviewPeriod::Month(year, month) => ReviewPeriod::Month(year, month - 1),
        }
    }

    /// Get display name for this period.
    pub fn display_name(&self) -> String {
        match *self {
            ReviewPeriod::Year(year) => format!("{}", year),
            ReviewPeriod::Month(year, month) => format!("{} {}", month_name(month), year),
        }
    }

    /// The year that is current at the given offset.
    pub fn current_year(offset: &FixedOffset) -> Self {
        ReviewPeriod::Year(Utc::now().with_timezone(offset).year())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taipei() -> FixedOffset {
        FixedOffset::east_opt(8 * 3600).unwrap()
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_year_bounds_at_offset() {
        let period = ReviewPeriod::Year(2024);
        assert_eq!(
            period.start(&taipei()).to_rfc3339(),
            "2023-12-31T16:00:00+00:00"
        );
        assert_eq!(
            period.end(&taipei()).to_rfc3339(),
            "2024-12-31T16:00:00+00:00"
        );
        assert_eq!(period.start(&utc()).to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert_eq!(period.total_days(), 366);
    }

    #[test]
    fn test_contains_edges() {
        let period = ReviewPeriod::Year(2024);
        let ts = |s: &str| DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc);

        assert!(period.contains(ts("2023-12-31T16:00:00Z"), &taipei()));
        assert!(!period.contains(ts("2023-12-31T15:59:59Z"), &taipei()));
        assert!(period.contains(ts("2024-12-31T15:59:59Z"), &taipei()));
        assert!(!period.contains(ts("2024-12-31T16:00:00Z"), &taipei()));
    }

    #[test]
    fn test_month_period() {
        let period = ReviewPeriod::Month(2024, 12);
        assert_eq!(period.display_name(), "December 2024");
        assert_eq!(period.previous(), ReviewPeriod::Month(2024, 11));
        assert_eq!(period.end(&utc()).to_rfc3339(), "2025-01-01T00:00:00+00:00");
        assert_eq!(period.total_days(), 31);

        let jan = ReviewPeriod::Month(2024, 1);
        assert_eq!(jan.previous(), ReviewPeriod::Month(2023, 12));
        assert_eq!(ReviewPeriod::Month(2024, 2).total_days(), 29);
    }

    #[test]
    fn test_year_period() {
        let period = ReviewPeriod::Year(2024);
        assert_eq!(period.display_name(), "2024");
        assert_eq!(period.previous(), ReviewPeriod::Year(2023));
        assert_eq!(period.year(), 2024);
    }

    #[test]
    fn test_month_name() {
        assert_eq!(month_name(1), "January");
        assert_eq!(month_name(12), "December");
        assert_eq!(month_name(0), "Unknown");
        assert_eq!(month_name(13), "Unknown");
    }

    #[test]
    fn test_extreme_years_do_not_overflow() {
        assert_eq!(ReviewPeriod::Year(i32::MIN).previous(), ReviewPeriod::Year(i32::MIN));
        assert_eq!(
            ReviewPeriod::Month(i32::MIN, 1).previous(),
            ReviewPeriod::Month(i32::MIN, 12)
        );

        // Years chrono cannot represent give an empty period
        let far = ReviewPeriod::Year(i32::MAX);
        assert_eq!(far.total_days(), 0);
        assert!(!far.contains(Utc::now(), &taipei()));
        assert_eq!(
            ReviewPeriod::Month(i32::MAX, 12).start(&utc()),
            ReviewPeriod::Month(i32::MAX, 12).end(&utc())
        );
    }
}
