//! Reporting month model.
//!
//! Timesheets, aggregates and submissions are all scoped to one calendar
//! month. [`ReportingMonth`] is that scope.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A calendar month that shifts are reported against.
///
/// # Example
///
/// ```
/// use timesheet_engine::models::ReportingMonth;
/// use chrono::NaiveDate;
///
/// let month = ReportingMonth::new(2026, 2).unwrap();
/// assert_eq!(month.days_in_month(), 28);
/// assert!(month.contains_date(NaiveDate::from_ymd_opt(2026, 2, 28).unwrap()));
/// assert!(!month.contains_date(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReportingMonth {
    /// The calendar year.
    pub year: i32,
    /// The month, 1 (January) through 12 (December).
    pub month: u32,
}

impl ReportingMonth {
    /// Creates a reporting month, rejecting months outside 1..=12.
    pub fn new(year: i32, month: u32) -> EngineResult<Self> {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(EngineError::validation(
                "month",
                format!("{}-{} is not a valid calendar month", year, month),
            ));
        }
        Ok(Self { year, month })
    }

    /// Returns the month a date falls in.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The first day of the month.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// The number of days in the month.
    pub fn days_in_month(&self) -> u32 {
        let Some(first) = self.first_day() else {
            return 0;
        };
        let next = first
            .checked_add_months(chrono::Months::new(1))
            .unwrap_or(first);
        (next - first).num_days() as u32
    }

    /// Checks whether a date falls within this month.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for ReportingMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
