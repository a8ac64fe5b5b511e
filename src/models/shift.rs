//! Shift entry model and related types.
//!
//! A [`ShiftEntry`] is one employee's planned and actual attendance for one
//! calendar date. Times are kept as the `"HH:MM"` wall-clock strings the
//! scheduling screens produce; they are parsed by the calculation layer.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::ReportingMonth;

/// Why an employee did not work a shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsenceKind {
    /// Off sick.
    Sick,
    /// On vacation.
    Vacation,
}

/// Lifecycle status of a shift entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftStatus {
    /// Scheduled, not yet confirmed by the employee.
    Planned,
    /// Confirmed as worked.
    Confirmed,
    /// Edited after confirmation.
    Changed,
    /// Part of an open signature batch.
    Submitted,
    /// Countersigned by the recipient.
    Completed,
    /// Soft-deleted; ignored by every calculation.
    Deleted,
}

/// One employee's attendance record for one date.
///
/// At most one entry exists per (employee, date).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftEntry {
    /// Unique identifier for the shift.
    pub id: String,
    /// The employee the shift belongs to.
    pub employee_id: String,
    /// The calendar date of the shift (the date it starts on).
    pub date: NaiveDate,
    /// Planned start, `"HH:MM"`.
    #[serde(default)]
    pub planned_start: Option<String>,
    /// Planned end, `"HH:MM"`.
    #[serde(default)]
    pub planned_end: Option<String>,
    /// Actual start, `"HH:MM"`.
    #[serde(default)]
    pub actual_start: Option<String>,
    /// Actual end, `"HH:MM"`.
    #[serde(default)]
    pub actual_end: Option<String>,
    /// Unpaid break taken during the shift, in minutes.
    #[serde(default)]
    pub break_minutes: u32,
    /// Set when the employee did not work the shift.
    #[serde(default)]
    pub absence: Option<AbsenceKind>,
    /// Employee designated to cover the shift if this employee is absent.
    #[serde(default)]
    pub backup_employee_id: Option<String>,
    /// Lifecycle status.
    pub status: ShiftStatus,
    /// Free-text note. Backup-covering shifts carry the backup marker here.
    #[serde(default)]
    pub note: Option<String>,
    /// The sheet (team + period) that batches this shift for signing.
    pub sheet: String,
}

impl ShiftEntry {
    /// Returns the start/end pair the hours are computed from.
    ///
    /// Actual times win when both are recorded, otherwise planned times are
    /// used. Returns `None` when neither pair is complete.
    ///
    /// # Examples
    ///
    /// ```
    /// use timesheet_engine::models::{ShiftEntry, ShiftStatus};
    /// use chrono::NaiveDate;
    ///
    /// let shift = ShiftEntry {
    ///     id: "shift_001".to_string(),
    ///     employee_id: "emp_001".to_string(),
    ///     date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
    ///     planned_start: Some("08:00".to_string()),
    ///     planned_end: Some("16:00".to_string()),
    ///     actual_start: Some("08:30".to_string()),
    ///     actual_end: Some("16:30".to_string()),
    ///     break_minutes: 0,
    ///     absence: None,
    ///     backup_employee_id: None,
    ///     status: ShiftStatus::Confirmed,
    ///     note: None,
    ///     sheet: "team_north_2026_01".to_string(),
    /// };
    /// assert_eq!(shift.effective_times(), Some(("08:30", "16:30")));
    /// ```
    pub fn effective_times(&self) -> Option<(&str, &str)> {
        match (&self.actual_start, &self.actual_end) {
            (Some(start), Some(end)) => Some((start.as_str(), end.as_str())),
            _ => match (&self.planned_start, &self.planned_end) {
                (Some(start), Some(end)) => Some((start.as_str(), end.as_str())),
                _ => None,
            },
        }
    }

    /// Returns true if the shift records an absence instead of work.
    pub fn is_absence(&self) -> bool {
        self.absence.is_some()
    }

    /// Returns true if the shift is soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.status == ShiftStatus::Deleted
    }

    /// Returns true if the note carries the given backup marker.
    pub fn has_backup_marker(&self, marker: &str) -> bool {
        self.note.as_deref().is_some_and(|note| note.contains(marker))
    }

    /// Returns true if the shift falls within the given month.
    pub fn in_month(&self, month: ReportingMonth) -> bool {
        month.contains_date(self.date)
    }

    /// Returns the day of the week for the shift date.
    pub fn day_of_week(&self) -> Weekday {
        self.date.weekday()
    }
}
