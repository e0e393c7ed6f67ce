use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use banking_core::{DomainError, DomainResult};

/// Inclusive period a statement covers.
///
/// Built from calendar dates: `start` is midnight of the first day and `end`
/// is 23:59:59 of the last day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl StatementWindow {
    pub fn from_dates(start_date: NaiveDate, end_date: NaiveDate) -> DomainResult<Self> {
        if end_date < start_date {
            return Err(DomainError::validation(
                "end date must not be before start date",
            ));
        }

        let start = start_date.and_time(NaiveTime::MIN).and_utc();
        let end = end_date
            .and_hms_opt(23, 59, 59)
            .ok_or_else(|| DomainError::validation("end date out of range"))?
            .and_utc();

        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Whether `at` falls inside the window, both ends inclusive.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn window_spans_whole_days() {
        let window = StatementWindow::from_dates(date(2025, 10, 1), date(2025, 10, 31)).unwrap();

        assert_eq!(window.start(), Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap());
        assert_eq!(window.end(), Utc.with_ymd_and_hms(2025, 10, 31, 23, 59, 59).unwrap());
        assert_eq!(window.end().second(), 59);
    }

    #[test]
    fn single_day_window_is_allowed() {
        let window = StatementWindow::from_dates(date(2025, 1, 1), date(2025, 1, 1)).unwrap();
        assert!(window.contains(Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()));
        assert!(!window.contains(Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap()));
    }

    #[test]
    fn reversed_window_is_rejected() {
        assert!(matches!(
            StatementWindow::from_dates(date(2025, 2, 1), date(2025, 1, 31)),
            Err(DomainError::Validation(_))
        ));
    }
}
