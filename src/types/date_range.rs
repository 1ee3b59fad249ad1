//! Inclusive calendar date ranges covered by an interpolation run.

use crate::interpolation::error::ConfigurationError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// An inclusive range of calendar days, `start..=end`.
///
/// The interpolation engine produces one value slot per day of this range, so
/// that gaps remain visible to the writers even when no station reported.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use swat_meteo::DateRange;
///
/// let range = DateRange::new(
///     NaiveDate::from_ymd_opt(2020, 12, 30).unwrap(),
///     NaiveDate::from_ymd_opt(2021, 1, 2).unwrap(),
/// )?;
/// assert_eq!(range.num_days(), 4);
/// assert_eq!(range.num_years(), 2);
/// # Ok::<(), swat_meteo::ConfigurationError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Creates a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ConfigurationError> {
        if start > end {
            return Err(ConfigurationError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days in the range, both ends included.
    pub fn num_days(&self) -> usize {
        ((self.end - self.start).num_days() + 1).max(0) as usize
    }

    /// Number of distinct calendar years touched by the range.
    pub fn num_years(&self) -> usize {
        ((self.end.year() - self.start.year()) + 1).max(0) as usize
    }

    /// Iterates the days of the range in chronological order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take(self.num_days())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Position of `date` within [`DateRange::days`], if it is inside the range.
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        if self.contains(date) {
            Some((date - self.start).num_days() as usize)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_single_day_range() {
        let range = DateRange::new(date(2021, 6, 1), date(2021, 6, 1)).unwrap();
        assert_eq!(range.num_days(), 1);
        assert_eq!(range.days().collect::<Vec<_>>(), vec![date(2021, 6, 1)]);
    }

    #[test]
    fn test_days_are_contiguous_across_leap_day() {
        let range = DateRange::new(date(2020, 2, 27), date(2020, 3, 1)).unwrap();
        let days: Vec<_> = range.days().collect();
        assert_eq!(
            days,
            vec![
                date(2020, 2, 27),
                date(2020, 2, 28),
                date(2020, 2, 29),
                date(2020, 3, 1)
            ]
        );
        assert_eq!(range.index_of(date(2020, 2, 29)), Some(2));
        assert_eq!(range.index_of(date(2020, 3, 2)), None);
    }

    #[test]
    fn test_reversed_range_is_rejected() {
        let err = DateRange::new(date(2021, 1, 2), date(2021, 1, 1)).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidDateRange { .. }));
    }
}
