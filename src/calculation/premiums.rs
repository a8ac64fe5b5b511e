//! Premium hour calculation for a single shift.
//!
//! A shift's worked time is split into regular, night, Sunday and public
//! holiday hours. Night hours come from intersecting the shift with the night
//! window on a 24-hour wheel, so both the shift and the window may cross
//! midnight. Sunday and holiday hours are attributed by the shift's stored
//! date as a whole: a Saturday-night shift running into Sunday morning earns
//! no Sunday hours, a shift stored on the Sunday earns them all.

use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{EmployeePremiumConfig, PremiumBreakdown, ShiftEntry};

use super::holidays::HolidayCalendar;
use super::time_arithmetic::{MINUTES_PER_DAY, minutes_between, minutes_to_hours, parse_hhmm};

/// The wall-clock window in which worked minutes count as night work.
///
/// Deserializes from `{ start: "HH:MM", end: "HH:MM" }` and validates both
/// values. `end <= start` means the window crosses midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawNightWindow", into = "RawNightWindow")]
pub struct NightWindow {
    start_minute: u32,
    end_minute: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawNightWindow {
    start: String,
    end: String,
}

impl TryFrom<RawNightWindow> for NightWindow {
    type Error = EngineError;

    fn try_from(raw: RawNightWindow) -> Result<Self, Self::Error> {
        NightWindow::parse(&raw.start, &raw.end)
    }
}

impl From<NightWindow> for RawNightWindow {
    fn from(window: NightWindow) -> Self {
        let fmt = |m: u32| format!("{:02}:{:02}", m / 60, m % 60);
        RawNightWindow {
            start: fmt(window.start_minute),
            end: fmt(window.end_minute),
        }
    }
}

impl Default for NightWindow {
    /// 22:00 to 06:00.
    fn default() -> Self {
        Self {
            start_minute: 22 * 60,
            end_minute: 6 * 60,
        }
    }
}

impl NightWindow {
    /// Parses a window from two `"HH:MM"` values.
    pub fn parse(start: &str, end: &str) -> EngineResult<Self> {
        Ok(Self {
            start_minute: parse_hhmm(start)?,
            end_minute: parse_hhmm(end)?,
        })
    }

    /// Minutes of the interval `[start_minute, start_minute + duration)` that
    /// fall inside the window.
    ///
    /// `start_minute` is minutes since midnight, `duration` at most one day.
    pub fn overlap_minutes(&self, start_minute: u32, duration: u32) -> u32 {
        let shift_start = i64::from(start_minute);
        let shift_end = shift_start + i64::from(duration);
        let day = i64::from(MINUTES_PER_DAY);

        let window_start = i64::from(self.start_minute);
        let mut window_end = i64::from(self.end_minute);
        if window_end <= window_start {
            window_end += day;
        }

        // The shift spans at most [0, 2 days); the window repeats daily.
        (-1..=2)
            .map(|k| {
                let lo = shift_start.max(window_start + k * day);
                let hi = shift_end.min(window_end + k * day);
                (hi - lo).max(0)
            })
            .sum::<i64>() as u32
    }
}

/// Everything besides the employee's own settings that premiums depend on.
#[derive(Debug, Clone, Copy)]
pub struct CalculationRules<'a> {
    /// Public holidays of the configured region.
    pub calendar: &'a HolidayCalendar,
    /// The night window.
    pub night_window: NightWindow,
    /// Note marker identifying backup-covering shifts.
    pub backup_marker: &'a str,
}

/// Wall-clock minutes of a shift.
///
/// `"00:00"`-`"00:00"` is a full 24-hour shift; otherwise an end at or before
/// the start wraps past midnight.
pub fn shift_minutes(start: &str, end: &str) -> EngineResult<u32> {
    if start == "00:00" && end == "00:00" {
        return Ok(MINUTES_PER_DAY);
    }
    minutes_between(start, end)
}

/// Splits one worked shift into premium categories.
///
/// # Arguments
///
/// * `date` - The date the shift is stored under (decides Sunday/holiday)
/// * `start`, `end` - `"HH:MM"` bounds
/// * `break_minutes` - Unpaid break deducted from worked time
/// * `config` - The employee's premium settings
/// * `rules` - Night window and holiday calendar
///
/// # Examples
///
/// ```
/// use timesheet_engine::calculation::{calculate_premiums, CalculationRules, HolidayCalendar, NightWindow};
/// use timesheet_engine::models::EmployeePremiumConfig;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let calendar = HolidayCalendar::default();
/// let rules = CalculationRules {
///     calendar: &calendar,
///     night_window: NightWindow::default(),
///     backup_marker: "[backup]",
/// };
/// let config = EmployeePremiumConfig {
///     night_premium_enabled: true,
///     ..Default::default()
/// };
///
/// // Thursday 20:00 to Friday 04:00
/// let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
/// let result = calculate_premiums(date, "20:00", "04:00", 0, &config, &rules).unwrap();
/// assert_eq!(result.total_hours, Decimal::new(8, 0));
/// assert_eq!(result.night_hours, Decimal::new(6, 0));
/// assert_eq!(result.regular_hours, Decimal::new(2, 0));
/// ```
pub fn calculate_premiums(
    date: NaiveDate,
    start: &str,
    end: &str,
    break_minutes: u32,
    config: &EmployeePremiumConfig,
    rules: &CalculationRules<'_>,
) -> EngineResult<PremiumBreakdown> {
    let elapsed = shift_minutes(start, end)?;
    let worked = elapsed.saturating_sub(break_minutes);
    let total_hours = minutes_to_hours(worked);

    let night_hours = if config.night_premium_enabled {
        let night = rules.night_window.overlap_minutes(parse_hhmm(start)?, elapsed);
        minutes_to_hours(night.min(worked))
    } else {
        Decimal::ZERO
    };

    let sunday_hours = if config.sunday_premium_enabled && date.weekday() == Weekday::Sun {
        total_hours
    } else {
        Decimal::ZERO
    };

    let holiday_hours = if config.holiday_premium_enabled && rules.calendar.is_holiday(date) {
        total_hours
    } else {
        Decimal::ZERO
    };

    let regular_hours = if sunday_hours > Decimal::ZERO || holiday_hours > Decimal::ZERO {
        Decimal::ZERO
    } else {
        total_hours - night_hours
    };

    Ok(PremiumBreakdown {
        total_hours,
        regular_hours,
        night_hours,
        sunday_hours,
        holiday_hours,
    })
}

/// Splits a shift entry into premium categories.
///
/// Absence entries contribute nothing. A worked entry without a complete
/// pair of actual or planned times is rejected rather than counted as zero.
pub fn calculate_shift_premiums(
    shift: &ShiftEntry,
    config: &EmployeePremiumConfig,
    rules: &CalculationRules<'_>,
) -> EngineResult<PremiumBreakdown> {
    if shift.is_absence() {
        return Ok(PremiumBreakdown::default());
    }
    let (start, end) = shift.effective_times().ok_or_else(|| {
        EngineError::validation(
            "times",
            format!("shift '{}' has neither actual nor planned times", shift.id),
        )
    })?;
    calculate_premiums(shift.date, start, end, shift.break_minutes, config, rules)
}
