//! Overtime against contracted hours.
//!
//! Compares an employee's aggregated worked hours with their contracted
//! weekly target scaled to the month. The caller chooses how many working
//! weeks the month has; [`working_weeks_in_month`] is the usual choice.

use rust_decimal::Decimal;

use crate::models::{MonthlyAggregate, OvertimeSummary, ReportingMonth};

/// Working weeks in a month, counted as calendar days divided by seven.
///
/// # Examples
///
/// ```
/// use timesheet_engine::calculation::working_weeks_in_month;
/// use timesheet_engine::models::ReportingMonth;
/// use rust_decimal::Decimal;
///
/// let february = ReportingMonth::new(2026, 2).unwrap();
/// assert_eq!(working_weeks_in_month(february), Decimal::new(4, 0));
/// ```
pub fn working_weeks_in_month(month: ReportingMonth) -> Decimal {
    Decimal::from(month.days_in_month()) / Decimal::from(7)
}

/// Computes target, actual and overtime hours for one employee.
///
/// # Arguments
///
/// * `weekly_target_hours` - Contracted hours per week
/// * `working_weeks` - Weeks the target is multiplied by
/// * `aggregate` - The employee's monthly totals
///
/// # Examples
///
/// ```
/// use timesheet_engine::calculation::calculate_overtime;
/// use timesheet_engine::models::MonthlyAggregate;
/// use rust_decimal::Decimal;
///
/// let aggregate = MonthlyAggregate {
///     total_hours: Decimal::new(130, 0),
///     ..Default::default()
/// };
/// let summary = calculate_overtime(Decimal::new(30, 0), Decimal::new(4, 0), &aggregate);
/// assert_eq!(summary.target_hours, Decimal::new(120, 0));
/// assert_eq!(summary.overtime, Decimal::new(10, 0));
/// ```
pub fn calculate_overtime(
    weekly_target_hours: Decimal,
    working_weeks: Decimal,
    aggregate: &MonthlyAggregate,
) -> OvertimeSummary {
    let target_hours = weekly_target_hours * working_weeks;
    let actual_hours = aggregate.total_hours;

    OvertimeSummary {
        target_hours,
        actual_hours,
        overtime: actual_hours - target_hours,
        sick_hours: aggregate.sick_hours,
        vacation_hours: aggregate.vacation_hours,
    }
}
