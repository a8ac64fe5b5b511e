//! Public holiday calendar.
//!
//! A [`HolidayCalendar`] combines fixed month/day holidays with holidays
//! defined as day offsets from Easter Sunday. Weekends are not holidays
//! here; Sunday work is detected by weekday in the premium calculation.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// A holiday on the same month and day every year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedHoliday {
    /// Month, 1-12.
    pub month: u32,
    /// Day of month.
    pub day: u32,
    /// Holiday name.
    pub name: String,
}

/// A holiday that moves with Easter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EasterHoliday {
    /// Days relative to Easter Sunday (negative for days before).
    pub offset_days: i64,
    /// Holiday name.
    pub name: String,
}

/// The public holidays of one region.
///
/// # Example
///
/// ```
/// use timesheet_engine::calculation::HolidayCalendar;
/// use chrono::NaiveDate;
///
/// let calendar = HolidayCalendar::default();
/// // Easter Monday 2026
/// assert!(calendar.is_holiday(NaiveDate::from_ymd_opt(2026, 4, 6).unwrap()));
/// // An ordinary Tuesday
/// assert!(!calendar.is_holiday(NaiveDate::from_ymd_opt(2026, 4, 7).unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayCalendar {
    /// Region code the calendar applies to.
    pub region: String,
    /// Holidays on fixed dates.
    #[serde(default)]
    pub fixed: Vec<FixedHoliday>,
    /// Holidays relative to Easter Sunday.
    #[serde(default)]
    pub easter_relative: Vec<EasterHoliday>,
}

impl Default for HolidayCalendar {
    /// Nationwide German public holidays.
    fn default() -> Self {
        let fixed = |month, day, name: &str| FixedHoliday {
            month,
            day,
            name: name.to_string(),
        };
        let easter = |offset_days, name: &str| EasterHoliday {
            offset_days,
            name: name.to_string(),
        };

        Self {
            region: "DE".to_string(),
            fixed: vec![
                fixed(1, 1, "New Year's Day"),
                fixed(5, 1, "Labour Day"),
                fixed(10, 3, "German Unity Day"),
                fixed(12, 25, "Christmas Day"),
                fixed(12, 26, "Second Day of Christmas"),
            ],
            easter_relative: vec![
                easter(-2, "Good Friday"),
                easter(1, "Easter Monday"),
                easter(39, "Ascension Day"),
                easter(50, "Whit Monday"),
            ],
        }
    }
}

impl HolidayCalendar {
    /// Returns true if the date is a public holiday in this region.
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holiday_name(date).is_some()
    }

    /// Returns the name of the holiday on the date, if any.
    pub fn holiday_name(&self, date: NaiveDate) -> Option<&str> {
        if let Some(holiday) = self
            .fixed
            .iter()
            .find(|h| h.month == date.month() && h.day == date.day())
        {
            return Some(holiday.name.as_str());
        }

        let easter = easter_sunday(date.year())?;
        let offset = (date - easter).num_days();
        self.easter_relative
            .iter()
            .find(|h| h.offset_days == offset)
            .map(|h| h.name.as_str())
    }

    /// Lists every holiday of a year, sorted by date.
    pub fn holidays_in_year(&self, year: i32) -> Vec<(NaiveDate, &str)> {
        let mut holidays: Vec<(NaiveDate, &str)> = self
            .fixed
            .iter()
            .filter_map(|h| {
                NaiveDate::from_ymd_opt(year, h.month, h.day).map(|d| (d, h.name.as_str()))
            })
            .collect();

        if let Some(easter) = easter_sunday(year) {
            holidays.extend(
                self.easter_relative
                    .iter()
                    .map(|h| (easter + Duration::days(h.offset_days), h.name.as_str()))
                    .filter(|(d, _)| d.year() == year),
            );
        }

        holidays.sort_by_key(|(d, _)| *d);
        holidays
    }
}

/// Computes Easter Sunday for a Gregorian year.
///
/// Uses the anonymous Gregorian computus (Meeus/Jones/Butcher).
///
/// # Examples
///
/// ```
/// use timesheet_engine::calculation::easter_sunday;
/// use chrono::NaiveDate;
///
/// assert_eq!(easter_sunday(2026), NaiveDate::from_ymd_opt(2026, 4, 5));
/// ```
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_easter_sunday_known_years() {
        assert_eq!(easter_sunday(2019), Some(date(2019, 4, 21)));
        assert_eq!(easter_sunday(2023), Some(date(2023, 4, 9)));
        assert_eq!(easter_sunday(2024), Some(date(2024, 3, 31)));
        assert_eq!(easter_sunday(2025), Some(date(2025, 4, 20)));
        assert_eq!(easter_sunday(2026), Some(date(2026, 4, 5)));
        assert_eq!(easter_sunday(2038), Some(date(2038, 4, 25)));
    }

    #[test]
    fn test_fixed_holidays() {
        let calendar = HolidayCalendar::default();
        assert!(calendar.is_holiday(date(2026, 1, 1)));
        assert!(calendar.is_holiday(date(2026, 5, 1)));
        assert!(calendar.is_holiday(date(2026, 10, 3)));
        assert!(calendar.is_holiday(date(2026, 12, 25)));
        assert!(calendar.is_holiday(date(2026, 12, 26)));
        assert!(!calendar.is_holiday(date(2026, 12, 24)));
    }

    #[test]
    fn test_easter_relative_holidays_2026() {
        let calendar = HolidayCalendar::default();
        assert_eq!(calendar.holiday_name(date(2026, 4, 3)), Some("Good Friday"));
        assert_eq!(calendar.holiday_name(date(2026, 4, 6)), Some("Easter Monday"));
        assert_eq!(calendar.holiday_name(date(2026, 5, 14)), Some("Ascension Day"));
        assert_eq!(calendar.holiday_name(date(2026, 5, 25)), Some("Whit Monday"));
    }

    #[test]
    fn test_easter_sunday_itself_is_not_configured() {
        let calendar = HolidayCalendar::default();
        assert!(!calendar.is_holiday(date(2026, 4, 5)));
    }

    #[test]
    fn test_weekend_is_not_a_holiday() {
        // 2026-01-18 is a Sunday
        let calendar = HolidayCalendar::default();
        assert!(!calendar.is_holiday(date(2026, 1, 18)));
    }

    #[test]
    fn test_holidays_in_year_sorted() {
        let calendar = HolidayCalendar::default();
        let holidays = calendar.holidays_in_year(2026);
        assert_eq!(holidays.len(), 9);
        assert_eq!(holidays[0], (date(2026, 1, 1), "New Year's Day"));
        assert_eq!(holidays[1], (date(2026, 4, 3), "Good Friday"));
        assert!(holidays.windows(2).all(|w| w[0].0 <= w[1].0));
    }

    #[test]
    fn test_custom_region() {
        let calendar: HolidayCalendar = serde_yaml::from_str(
            r#"
region: "DE-BY"
fixed:
  - { month: 1, day: 6, name: "Epiphany" }
easter_relative:
  - { offset_days: 60, name: "Corpus Christi" }
"#,
        )
        .unwrap();
        assert!(calendar.is_holiday(date(2026, 1, 6)));
        // Corpus Christi 2026 is June 4th
        assert!(calendar.is_holiday(date(2026, 6, 4)));
        assert!(!calendar.is_holiday(date(2026, 1, 1)));
    }
}
