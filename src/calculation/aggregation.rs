//! Monthly aggregation of shift entries.
//!
//! Folds one employee's shifts for one month into a [`MonthlyAggregate`].
//! Worked shifts go through the premium calculation; absence entries feed
//! the sick and vacation accumulators instead of the worked totals.
//!
//! Backup coverage is credited through the backup's own covering entry: the
//! entry is worked time like any other and is additionally counted as backup
//! time when its note carries the backup marker. An unmarked entry of the
//! backup on the same date is ordinary work even when an absent colleague
//! names this employee as backup. If the backup could
//! not work either, the covering entry is deleted (see
//! [`crate::schedule::ShiftService::record_absence`]) and nothing is left to
//! aggregate for that date.

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::EngineResult;
use crate::models::{
    AbsenceKind, EmployeePremiumConfig, MonthlyAggregate, ReportingMonth, ShiftEntry,
};

use super::premiums::{CalculationRules, calculate_shift_premiums, shift_minutes};
use super::time_arithmetic::minutes_to_hours;

/// Computes an employee's totals for a month.
///
/// # Arguments
///
/// * `employee_id` - The employee to aggregate
/// * `month` - The reporting month
/// * `own_shifts` - The employee's shifts (entries of other employees are ignored)
/// * `organization_shifts` - Every shift of the organization in the month,
///   used to recognise backup coverage
/// * `premium` - The employee's premium settings
/// * `rules` - Night window, holiday calendar and backup marker
///
/// # Errors
///
/// Returns a validation error when a counted entry carries a malformed time.
///
/// # Examples
///
/// ```
/// use timesheet_engine::calculation::aggregate_month;
/// use timesheet_engine::config::EngineConfig;
/// use timesheet_engine::models::{EmployeePremiumConfig, ReportingMonth, ShiftEntry, ShiftStatus};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let config = EngineConfig::default();
/// let shift = ShiftEntry {
///     id: "shift_001".to_string(),
///     employee_id: "emp_001".to_string(),
///     date: NaiveDate::from_ymd_opt(2026, 1, 14).unwrap(),
///     planned_start: Some("08:00".to_string()),
///     planned_end: Some("16:00".to_string()),
///     actual_start: None,
///     actual_end: None,
///     break_minutes: 0,
///     absence: None,
///     backup_employee_id: None,
///     status: ShiftStatus::Confirmed,
///     note: None,
///     sheet: "team_north".to_string(),
/// };
///
/// let month = ReportingMonth::new(2026, 1).unwrap();
/// let shifts = vec![shift];
/// let aggregate = aggregate_month(
///     "emp_001",
///     month,
///     &shifts,
///     &shifts,
///     &EmployeePremiumConfig::default(),
///     &config.rules(),
/// )
/// .unwrap();
/// assert_eq!(aggregate.total_hours, Decimal::new(8, 0));
/// ```
pub fn aggregate_month(
    employee_id: &str,
    month: ReportingMonth,
    own_shifts: &[ShiftEntry],
    organization_shifts: &[ShiftEntry],
    premium: &EmployeePremiumConfig,
    rules: &CalculationRules<'_>,
) -> EngineResult<MonthlyAggregate> {
    let mut aggregate = MonthlyAggregate::default();

    let counted = own_shifts
        .iter()
        .filter(|s| s.employee_id == employee_id && !s.is_deleted() && s.in_month(month));

    for shift in counted {
        match shift.absence {
            Some(kind) => {
                let hours = absence_hours(shift)?;
                match kind {
                    AbsenceKind::Sick => {
                        aggregate.sick_hours += hours;
                        aggregate.sick_days += 1;
                    }
                    AbsenceKind::Vacation => {
                        aggregate.vacation_hours += hours;
                        aggregate.vacation_days += 1;
                    }
                }
            }
            None => {
                let breakdown = calculate_shift_premiums(shift, premium, rules)?;
                aggregate.add_worked(&breakdown);
                if is_backup_cover(shift, organization_shifts, rules.backup_marker) {
                    aggregate.add_backup(breakdown.total_hours);
                }
            }
        }
    }

    debug!(
        employee_id,
        month = %month,
        total_hours = %aggregate.total_hours,
        backup_hours = %aggregate.backup_hours,
        sick_days = aggregate.sick_days,
        vacation_days = aggregate.vacation_days,
        "Monthly aggregate computed"
    );

    Ok(aggregate)
}

/// Wall-clock hours of an absence entry, from actual or planned times.
///
/// An absence without any complete time pair still counts as a day but
/// contributes no hours.
fn absence_hours(shift: &ShiftEntry) -> EngineResult<Decimal> {
    match shift.effective_times() {
        Some((start, end)) => Ok(minutes_to_hours(shift_minutes(start, end)?)),
        None => Ok(Decimal::ZERO),
    }
}

/// Returns true if a worked entry covers an absent colleague.
///
/// Only entries whose note carries the backup marker are covers. A marked
/// entry stops counting when the colleague shifts that name this employee as
/// backup on the same date are all present again; when none are in
/// `organization_shifts` the marker alone decides.
pub fn is_backup_cover(
    shift: &ShiftEntry,
    organization_shifts: &[ShiftEntry],
    marker: &str,
) -> bool {
    if shift.is_absence() || !shift.has_backup_marker(marker) {
        return false;
    }
    let mut primaries = organization_shifts
        .iter()
        .filter(|primary| {
            primary.employee_id != shift.employee_id
                && primary.date == shift.date
                && !primary.is_deleted()
                && primary.backup_employee_id.as_deref() == Some(shift.employee_id.as_str())
        })
        .peekable();
    primaries.peek().is_none() || primaries.any(ShiftEntry::is_absence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::{HolidayCalendar, NightWindow};
    use crate::models::ShiftStatus;
    use chrono::NaiveDate;

    const MARKER: &str = "[backup]";

    fn rules(calendar: &HolidayCalendar) -> CalculationRules<'_> {
        CalculationRules {
            calendar,
            night_window: NightWindow::default(),
            backup_marker: MARKER,
        }
    }

    fn january() -> ReportingMonth {
        ReportingMonth::new(2026, 1).unwrap()
    }

    fn premium() -> EmployeePremiumConfig {
        EmployeePremiumConfig {
            hourly_wage: Decimal::new(15, 0),
            night_premium_enabled: true,
            night_premium_percent: Decimal::new(25, 0),
            sunday_premium_enabled: true,
            sunday_premium_percent: Decimal::new(50, 0),
            holiday_premium_enabled: true,
            holiday_premium_percent: Decimal::new(100, 0),
        }
    }

    fn shift(id: &str, employee: &str, day: u32, start: &str, end: &str) -> ShiftEntry {
        ShiftEntry {
            id: id.to_string(),
            employee_id: employee.to_string(),
            date: NaiveDate::from_ymd_opt(2026, 1, day).unwrap(),
            planned_start: Some(start.to_string()),
            planned_end: Some(end.to_string()),
            actual_start: None,
            actual_end: None,
            break_minutes: 0,
            absence: None,
            backup_employee_id: None,
            status: ShiftStatus::Confirmed,
            note: None,
            sheet: "team_north".to_string(),
        }
    }

    fn hours(h: i64) -> Decimal {
        Decimal::new(h, 0)
    }

    #[test]
    fn test_sums_worked_shifts() {
        let calendar = HolidayCalendar::default();
        let shifts = vec![
            shift("s1", "emp_a", 14, "08:00", "16:00"),
            shift("s2", "emp_a", 15, "22:00", "06:00"),
            // 2026-01-18 is a Sunday
            shift("s3", "emp_a", 18, "08:00", "12:00"),
        ];
        let aggregate =
            aggregate_month("emp_a", january(), &shifts, &shifts, &premium(), &rules(&calendar))
                .unwrap();
        assert_eq!(aggregate.total_hours, hours(20));
        assert_eq!(aggregate.night_hours, hours(8));
        assert_eq!(aggregate.sunday_hours, hours(4));
        assert_eq!(aggregate.regular_hours, hours(8));
        assert_eq!(aggregate.holiday_hours, Decimal::ZERO);
        assert_eq!(aggregate.worked_days, 3);
    }

    #[test]
    fn test_new_years_day_counts_as_holiday() {
        let calendar = HolidayCalendar::default();
        let shifts = vec![shift("s1", "emp_a", 1, "08:00", "14:00")];
        let aggregate =
            aggregate_month("emp_a", january(), &shifts, &shifts, &premium(), &rules(&calendar))
                .unwrap();
        assert_eq!(aggregate.holiday_hours, hours(6));
    }

    #[test]
    fn test_absences_feed_accumulators_only() {
        let calendar = HolidayCalendar::default();
        let mut sick = shift("s1", "emp_a", 14, "22:00", "06:00");
        sick.absence = Some(AbsenceKind::Sick);
        let mut vacation = shift("s2", "emp_a", 15, "08:00", "14:30");
        vacation.absence = Some(AbsenceKind::Vacation);
        let shifts = vec![sick, vacation];

        let aggregate =
            aggregate_month("emp_a", january(), &shifts, &shifts, &premium(), &rules(&calendar))
                .unwrap();
        assert_eq!(aggregate.total_hours, Decimal::ZERO);
        assert_eq!(aggregate.regular_hours, Decimal::ZERO);
        assert_eq!(aggregate.night_hours, Decimal::ZERO);
        assert_eq!(aggregate.sick_hours, hours(8));
        assert_eq!(aggregate.sick_days, 1);
        assert_eq!(aggregate.vacation_hours, Decimal::new(65, 1));
        assert_eq!(aggregate.vacation_days, 1);
    }

    #[test]
    fn test_absence_prefers_actual_times() {
        let calendar = HolidayCalendar::default();
        let mut sick = shift("s1", "emp_a", 14, "08:00", "16:00");
        sick.actual_start = Some("08:00".to_string());
        sick.actual_end = Some("11:00".to_string());
        sick.absence = Some(AbsenceKind::Sick);
        let shifts = vec![sick];
        let aggregate =
            aggregate_month("emp_a", january(), &shifts, &shifts, &premium(), &rules(&calendar))
                .unwrap();
        assert_eq!(aggregate.sick_hours, hours(3));
    }

    #[test]
    fn test_backup_hours_go_to_backup_not_primary() {
        let calendar = HolidayCalendar::default();
        let mut primary = shift("s1", "emp_a", 14, "08:00", "16:00");
        primary.absence = Some(AbsenceKind::Sick);
        primary.backup_employee_id = Some("emp_b".to_string());
        let mut cover = shift("s2", "emp_b", 14, "08:00", "16:00");
        cover.note = Some(format!("{} covering emp_a", MARKER));
        let organization = vec![primary.clone(), cover.clone()];

        let a = aggregate_month(
            "emp_a",
            january(),
            &organization,
            &organization,
            &premium(),
            &rules(&calendar),
        )
        .unwrap();
        let b = aggregate_month(
            "emp_b",
            january(),
            &organization,
            &organization,
            &premium(),
            &rules(&calendar),
        )
        .unwrap();

        assert_eq!(a.total_hours, Decimal::ZERO);
        assert_eq!(a.sick_hours, hours(8));
        assert_eq!(b.total_hours, hours(8));
        assert_eq!(b.backup_hours, hours(8));
        assert_eq!(b.backup_days, 1);
        assert_eq!(b.sick_days, 0);
    }

    #[test]
    fn test_backup_marker_alone_identifies_cover() {
        let calendar = HolidayCalendar::default();
        let mut cover = shift("s2", "emp_b", 14, "08:00", "12:00");
        cover.note = Some(format!("{} covering emp_a", MARKER));
        let shifts = vec![cover];
        let b = aggregate_month("emp_b", january(), &shifts, &shifts, &premium(), &rules(&calendar))
            .unwrap();
        assert_eq!(b.backup_hours, hours(4));
    }

    #[test]
    fn test_deleted_cover_leaves_no_record_for_backup() {
        let calendar = HolidayCalendar::default();
        let mut primary = shift("s1", "emp_a", 14, "08:00", "16:00");
        primary.absence = Some(AbsenceKind::Sick);
        primary.backup_employee_id = Some("emp_b".to_string());
        // emp_b's covering entry was removed because emp_b could not work either
        let organization = vec![primary];
        let b = aggregate_month(
            "emp_b",
            january(),
            &organization,
            &organization,
            &premium(),
            &rules(&calendar),
        )
        .unwrap();
        assert_eq!(b, MonthlyAggregate::default());
    }

    #[test]
    fn test_unmarked_shift_beside_absent_primary_is_ordinary_work() {
        let calendar = HolidayCalendar::default();
        let mut primary = shift("s1", "emp_a", 14, "08:00", "16:00");
        primary.absence = Some(AbsenceKind::Sick);
        primary.backup_employee_id = Some("emp_b".to_string());
        // emp_b's cover was withdrawn; this is an unrelated evening shift
        let own = shift("s2", "emp_b", 14, "17:00", "21:00");
        let organization = vec![primary, own];
        let b = aggregate_month(
            "emp_b",
            january(),
            &organization,
            &organization,
            &premium(),
            &rules(&calendar),
        )
        .unwrap();
        assert_eq!(b.total_hours, hours(4));
        assert_eq!(b.backup_hours, Decimal::ZERO);
        assert_eq!(b.backup_days, 0);
    }

    #[test]
    fn test_marked_cover_for_present_primary_is_not_credited() {
        let calendar = HolidayCalendar::default();
        let mut primary = shift("s1", "emp_a", 14, "08:00", "16:00");
        primary.backup_employee_id = Some("emp_b".to_string());
        let mut cover = shift("s2", "emp_b", 14, "08:00", "16:00");
        cover.note = Some(format!("{} covering emp_a", MARKER));
        let organization = vec![primary, cover];
        let b = aggregate_month(
            "emp_b",
            january(),
            &organization,
            &organization,
            &premium(),
            &rules(&calendar),
        )
        .unwrap();
        assert_eq!(b.total_hours, hours(8));
        assert_eq!(b.backup_hours, Decimal::ZERO);
    }

    #[test]
    fn test_backup_on_present_primary_is_not_cover() {
        let calendar = HolidayCalendar::default();
        let mut primary = shift("s1", "emp_a", 14, "08:00", "16:00");
        primary.backup_employee_id = Some("emp_b".to_string());
        let other = shift("s2", "emp_b", 14, "16:00", "22:00");
        let organization = vec![primary, other];
        let b = aggregate_month(
            "emp_b",
            january(),
            &organization,
            &organization,
            &premium(),
            &rules(&calendar),
        )
        .unwrap();
        assert_eq!(b.total_hours, hours(6));
        assert_eq!(b.backup_hours, Decimal::ZERO);
    }

    #[test]
    fn test_skips_deleted_other_months_and_other_employees() {
        let calendar = HolidayCalendar::default();
        let mut deleted = shift("s1", "emp_a", 14, "08:00", "16:00");
        deleted.status = ShiftStatus::Deleted;
        let mut february = shift("s2", "emp_a", 14, "08:00", "16:00");
        february.date = NaiveDate::from_ymd_opt(2026, 2, 3).unwrap();
        let other = shift("s3", "emp_x", 14, "08:00", "16:00");
        let shifts = vec![deleted, february, other];
        let aggregate =
            aggregate_month("emp_a", january(), &shifts, &shifts, &premium(), &rules(&calendar))
                .unwrap();
        assert_eq!(aggregate, MonthlyAggregate::default());
    }

    #[test]
    fn test_malformed_time_fails_aggregation() {
        let calendar = HolidayCalendar::default();
        let shifts = vec![shift("s1", "emp_a", 14, "08:00", "16:99")];
        let err =
            aggregate_month("emp_a", january(), &shifts, &shifts, &premium(), &rules(&calendar))
                .unwrap_err();
        assert!(err.is_validation());
    }
}
