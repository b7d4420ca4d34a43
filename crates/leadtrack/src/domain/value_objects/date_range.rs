//! DateRange - Inclusive span of calendar days

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Inclusive range of calendar days `[start, end]`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DomainError> {
        if end < start {
            return Err(DomainError::Validation(format!(
                "End date {} is before start date {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    /// The `days` calendar days ending on `today` (at least one day)
    pub fn last_n_days(today: NaiveDate, days: u32) -> Result<Self, DomainError> {
        let span = i64::from(days.max(1)) - 1;
        let start = today
            .checked_sub_signed(Duration::days(span))
            .ok_or_else(|| {
                DomainError::Validation(format!("{} days before {} is out of range", days, today))
            })?;
        Ok(Self { start, end: today })
    }

    /// Number of days covered, counting both ends
    pub fn days(&self) -> usize {
        let diff = (self.end - self.start).num_days();
        if diff < 0 {
            0
        } else {
            diff as usize + 1
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every day in the range, ascending
    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| DomainError::Validation(format!("Invalid date (expected YYYY-MM-DD): {}", value)))
}

/// RFC 3339, or `YYYY-MM-DDTHH:MM[:SS]` without an offset taken as UTC
pub fn parse_datetime(value: &str) -> Result<DateTime<Utc>, DomainError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| {
            DomainError::Validation(format!(
                "Invalid time (expected YYYY-MM-DDTHH:MM:SS): {}",
                value
            ))
        })
}
