//! Wall-clock time arithmetic.
//!
//! Shift times are `"HH:MM"` strings without a date. These helpers turn them
//! into minutes since midnight and compute elapsed time, treating an end at
//! or before the start as the next day.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};

/// Minutes in one day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Parses an `"HH:MM"` value into minutes since midnight.
///
/// Exactly two hour digits, a colon and two minute digits are accepted;
/// hours must be 00-23 and minutes 00-59.
///
/// # Examples
///
/// ```
/// use timesheet_engine::calculation::parse_hhmm;
///
/// assert_eq!(parse_hhmm("06:30").unwrap(), 390);
/// assert!(parse_hhmm("6:30").is_err());
/// assert!(parse_hhmm("24:00").is_err());
/// ```
pub fn parse_hhmm(value: &str) -> EngineResult<u32> {
    let invalid = |message: &str| EngineError::InvalidTime {
        value: value.to_string(),
        message: message.to_string(),
    };

    let bytes = value.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return Err(invalid("expected HH:MM"));
    }
    let digits = [bytes[0], bytes[1], bytes[3], bytes[4]];
    if !digits.iter().all(u8::is_ascii_digit) {
        return Err(invalid("expected HH:MM"));
    }

    let hours = u32::from(bytes[0] - b'0') * 10 + u32::from(bytes[1] - b'0');
    let minutes = u32::from(bytes[3] - b'0') * 10 + u32::from(bytes[4] - b'0');
    if hours > 23 {
        return Err(invalid("hour must be between 00 and 23"));
    }
    if minutes > 59 {
        return Err(invalid("minute must be between 00 and 59"));
    }

    Ok(hours * 60 + minutes)
}

/// Returns the elapsed minutes from `start` to `end`.
///
/// When `end <= start` the interval crosses midnight and a full day is
/// added, so `"22:00"`-`"06:00"` is 480 minutes and identical values are
/// 1440 minutes.
///
/// # Examples
///
/// ```
/// use timesheet_engine::calculation::minutes_between;
///
/// assert_eq!(minutes_between("08:00", "16:00").unwrap(), 480);
/// assert_eq!(minutes_between("22:00", "06:00").unwrap(), 480);
/// ```
pub fn minutes_between(start: &str, end: &str) -> EngineResult<u32> {
    let start = parse_hhmm(start)?;
    let end = parse_hhmm(end)?;
    // Identical values are a full day, never an empty shift.
    if end == start {
        return Ok(MINUTES_PER_DAY);
    }
    if end < start {
        Ok(end + MINUTES_PER_DAY - start)
    } else {
        Ok(end - start)
    }
}

/// Converts minutes to decimal hours.
pub fn minutes_to_hours(minutes: u32) -> Decimal {
    Decimal::from(minutes) / Decimal::from(60)
}
