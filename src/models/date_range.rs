//! Inclusive calendar date range with the bounds the form enforces

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::climate::DATE_KEY_FORMAT;

/// Days subtracted from today for the default start date (30 years of 365 days)
pub const DEFAULT_LOOKBACK_DAYS: u64 = 30 * 365;

/// Earliest start date the form offers
#[must_use]
pub fn default_earliest_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1990, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Inclusive range of days, `start <= end`
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Pull both dates inside the form bounds.
    ///
    /// The start is kept within `[earliest, today]` and the end within
    /// `[start, today]`; a start chosen after the end drags the end forward.
    #[must_use]
    pub fn bounded(start: NaiveDate, end: NaiveDate, earliest: NaiveDate, today: NaiveDate) -> Self {
        let start = start.max(earliest).min(today);
        let end = end.max(start).min(today);
        Self { start, end }
    }

    /// Default form range: `lookback_days` before today up to today
    #[must_use]
    pub fn default_until(today: NaiveDate, earliest: NaiveDate, lookback_days: u64) -> Self {
        let start = today
            .checked_sub_days(Days::new(lookback_days))
            .unwrap_or(earliest);
        Self::bounded(start, today, earliest, today)
    }

    /// Start as `YYYYMMDD`
    #[must_use]
    pub fn start_key(&self) -> String {
        self.start.format(DATE_KEY_FORMAT).to_string()
    }

    /// End as `YYYYMMDD`
    #[must_use]
    pub fn end_key(&self) -> String {
        self.end.format(DATE_KEY_FORMAT).to_string()
    }

    /// Number of days covered, both ends included
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_are_inclusive() {
        let range = DateRange {
            start: date(2020, 1, 1),
            end: date(2020, 1, 3),
        };
        assert_eq!(range.days(), 3);
    }

    #[test]
    fn test_keys_are_compact() {
        let range = DateRange {
            start: date(2020, 1, 1),
            end: date(2020, 12, 31),
        };
        assert_eq!(range.start_key(), "20200101");
        assert_eq!(range.end_key(), "20201231");
    }

    #[rstest]
    // start after end drags the end forward
    #[case(date(2020, 6, 1), date(2020, 1, 1), date(2020, 6, 1), date(2020, 6, 1))]
    // start before the floor is pulled up to it
    #[case(date(1980, 1, 1), date(2020, 1, 1), date(1990, 1, 1), date(2020, 1, 1))]
    // end in the future is pulled back to today
    #[case(date(2020, 1, 1), date(2030, 1, 1), date(2020, 1, 1), date(2024, 5, 10))]
    // start in the future lands on today, end follows
    #[case(date(2030, 1, 1), date(2030, 2, 1), date(2024, 5, 10), date(2024, 5, 10))]
    // already valid ranges are untouched
    #[case(date(2020, 1, 1), date(2020, 1, 3), date(2020, 1, 1), date(2020, 1, 3))]
    fn test_bounded(
        #[case] start: NaiveDate,
        #[case] end: NaiveDate,
        #[case] expected_start: NaiveDate,
        #[case] expected_end: NaiveDate,
    ) {
        let today = date(2024, 5, 10);
        let range = DateRange::bounded(start, end, default_earliest_date(), today);
        assert_eq!(range.start, expected_start);
        assert_eq!(range.end, expected_end);
    }

    #[test]
    fn test_default_until() {
        let today = date(2026, 10, 18);
        let range = DateRange::default_until(today, default_earliest_date(), DEFAULT_LOOKBACK_DAYS);
        assert_eq!(range.end, today);
        assert_eq!((range.end - range.start).num_days(), 30 * 365);

        // a long lookback never crosses the floor
        let range = DateRange::default_until(today, default_earliest_date(), 100 * 365);
        assert_eq!(range.start, default_earliest_date());
    }
}
