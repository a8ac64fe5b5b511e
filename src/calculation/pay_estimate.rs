//! Gross pay estimate for payroll export.
//!
//! Worked hours are paid at the base wage; night, Sunday and holiday hours
//! additionally earn their surcharge percentage when enabled. Sick and
//! vacation hours are paid at the base wage.

use rust_decimal::Decimal;

use crate::models::{EmployeePremiumConfig, MonthlyAggregate, PayEstimate};

/// Estimates gross pay from a monthly aggregate.
///
/// Amounts are rounded to cents.
///
/// # Examples
///
/// ```
/// use timesheet_engine::calculation::estimate_gross_pay;
/// use timesheet_engine::models::{EmployeePremiumConfig, MonthlyAggregate};
/// use rust_decimal::Decimal;
///
/// let config = EmployeePremiumConfig {
///     hourly_wage: Decimal::new(20, 0),
///     night_premium_enabled: true,
///     night_premium_percent: Decimal::new(25, 0),
///     ..Default::default()
/// };
/// let aggregate = MonthlyAggregate {
///     total_hours: Decimal::new(10, 0),
///     night_hours: Decimal::new(4, 0),
///     ..Default::default()
/// };
/// let estimate = estimate_gross_pay(&aggregate, &config);
/// // 10h x 20 + 4h x 20 x 25%
/// assert_eq!(estimate.gross_pay, Decimal::new(220, 0));
/// ```
pub fn estimate_gross_pay(
    aggregate: &MonthlyAggregate,
    config: &EmployeePremiumConfig,
) -> PayEstimate {
    let wage = config.hourly_wage;
    let surcharge = |enabled: bool, hours: Decimal, percent: Decimal| {
        if enabled {
            (hours * wage * percent / Decimal::ONE_HUNDRED).round_dp(2)
        } else {
            Decimal::ZERO
        }
    };

    let base_pay = (aggregate.total_hours * wage).round_dp(2);
    let night_premium = surcharge(
        config.night_premium_enabled,
        aggregate.night_hours,
        config.night_premium_percent,
    );
    let sunday_premium = surcharge(
        config.sunday_premium_enabled,
        aggregate.sunday_hours,
        config.sunday_premium_percent,
    );
    let holiday_premium = surcharge(
        config.holiday_premium_enabled,
        aggregate.holiday_hours,
        config.holiday_premium_percent,
    );
    let absence_pay = ((aggregate.sick_hours + aggregate.vacation_hours) * wage).round_dp(2);

    PayEstimate {
        base_pay,
        night_premium,
        sunday_premium,
        holiday_premium,
        absence_pay,
        gross_pay: base_pay + night_premium + sunday_premium + holiday_premium + absence_pay,
    }
}
