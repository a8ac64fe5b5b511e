//! Computed hour totals.
//!
//! These records are derived fresh from shift entries on every request and
//! are never persisted. [`PremiumBreakdown`] covers a single shift,
//! [`MonthlyAggregate`] one employee's month, [`OvertimeSummary`] the
//! comparison against contracted hours and [`PayEstimate`] the money view.

use std::iter::Sum;
use std::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Hours of one worked shift split by premium category.
///
/// `total_hours` is every worked hour. `night_hours`, `sunday_hours` and
/// `holiday_hours` overlap each other and are each a subset of the total;
/// `regular_hours` is the part of the total that carries no premium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PremiumBreakdown {
    /// All worked hours of the shift.
    pub total_hours: Decimal,
    /// Worked hours without any premium.
    pub regular_hours: Decimal,
    /// Hours inside the night window.
    pub night_hours: Decimal,
    /// Hours credited as Sunday work.
    pub sunday_hours: Decimal,
    /// Hours credited as public holiday work.
    pub holiday_hours: Decimal,
}

/// One employee's totals for one month.
///
/// # Example
///
/// ```
/// use timesheet_engine::models::{MonthlyAggregate, PremiumBreakdown};
/// use rust_decimal::Decimal;
///
/// let mut aggregate = MonthlyAggregate::default();
/// aggregate.add_worked(&PremiumBreakdown {
///     total_hours: Decimal::new(8, 0),
///     regular_hours: Decimal::new(6, 0),
///     night_hours: Decimal::new(2, 0),
///     ..Default::default()
/// });
/// assert_eq!(aggregate.total_hours, Decimal::new(8, 0));
/// assert_eq!(aggregate.worked_days, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    /// All worked hours, including backup coverage. Never includes absences.
    pub total_hours: Decimal,
    /// Worked hours without any premium.
    pub regular_hours: Decimal,
    /// Hours inside the night window.
    pub night_hours: Decimal,
    /// Sunday hours.
    pub sunday_hours: Decimal,
    /// Public holiday hours.
    pub holiday_hours: Decimal,
    /// Hours worked as a backup for an absent colleague (also in the totals above).
    pub backup_hours: Decimal,
    /// Number of backup-covering shifts worked.
    pub backup_days: u32,
    /// Hours recorded as sick.
    pub sick_hours: Decimal,
    /// Number of sick days.
    pub sick_days: u32,
    /// Hours recorded as vacation.
    pub vacation_hours: Decimal,
    /// Number of vacation days.
    pub vacation_days: u32,
    /// Number of worked shifts.
    pub worked_days: u32,
}

impl MonthlyAggregate {
    /// Folds one worked shift into the totals.
    pub fn add_worked(&mut self, breakdown: &PremiumBreakdown) {
        self.total_hours += breakdown.total_hours;
        self.regular_hours += breakdown.regular_hours;
        self.night_hours += breakdown.night_hours;
        self.sunday_hours += breakdown.sunday_hours;
        self.holiday_hours += breakdown.holiday_hours;
        self.worked_days += 1;
    }

    /// Records that a worked shift was backup coverage.
    pub fn add_backup(&mut self, hours: Decimal) {
        self.backup_hours += hours;
        self.backup_days += 1;
    }
}

/// Actual versus contracted hours for one employee.
///
/// Summable across employees with `+` or [`Iterator::sum`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OvertimeSummary {
    /// Contracted hours for the period.
    pub target_hours: Decimal,
    /// Worked hours for the period.
    pub actual_hours: Decimal,
    /// `actual_hours - target_hours`; negative for a deficit.
    pub overtime: Decimal,
    /// Sick hours, passed through for reporting.
    pub sick_hours: Decimal,
    /// Vacation hours, passed through for reporting.
    pub vacation_hours: Decimal,
}

impl Add for OvertimeSummary {
    type Output = OvertimeSummary;

    fn add(self, rhs: OvertimeSummary) -> OvertimeSummary {
        OvertimeSummary {
            target_hours: self.target_hours + rhs.target_hours,
            actual_hours: self.actual_hours + rhs.actual_hours,
            overtime: self.overtime + rhs.overtime,
            sick_hours: self.sick_hours + rhs.sick_hours,
            vacation_hours: self.vacation_hours + rhs.vacation_hours,
        }
    }
}

impl Sum for OvertimeSummary {
    fn sum<I: Iterator<Item = OvertimeSummary>>(iter: I) -> Self {
        iter.fold(OvertimeSummary::default(), Add::add)
    }
}

/// Gross pay estimate derived from a monthly aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PayEstimate {
    /// Worked hours at the base wage.
    pub base_pay: Decimal,
    /// Night surcharge.
    pub night_premium: Decimal,
    /// Sunday surcharge.
    pub sunday_premium: Decimal,
    /// Holiday surcharge.
    pub holiday_premium: Decimal,
    /// Sick and vacation hours at the base wage.
    pub absence_pay: Decimal,
    /// Sum of all components.
    pub gross_pay: Decimal,
}
