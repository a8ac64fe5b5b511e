//! Calculation logic for the timesheet engine.
//!
//! This module contains the pure functions that turn shift entries into
//! hours: wall-clock time arithmetic, the public holiday calendar, the
//! per-shift premium split, monthly aggregation including backup coverage,
//! overtime against contracted hours and the gross pay estimate.

mod aggregation;
mod holidays;
mod overtime;
mod pay_estimate;
mod premiums;
mod time_arithmetic;

pub use aggregation::{aggregate_month, is_backup_cover};
pub use holidays::{EasterHoliday, FixedHoliday, HolidayCalendar, easter_sunday};
pub use overtime::{calculate_overtime, working_weeks_in_month};
pub use pay_estimate::estimate_gross_pay;
pub use premiums::{
    CalculationRules, NightWindow, calculate_premiums, calculate_shift_premiums, shift_minutes,
};
pub use time_arithmetic::{MINUTES_PER_DAY, minutes_between, minutes_to_hours, parse_hhmm};
