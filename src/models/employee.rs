//! Employee model and premium configuration.
//!
//! This module defines the [`Employee`] record the engine reads from the
//! employee directory and the per-employee [`EmployeePremiumConfig`] that
//! decides which surcharges apply to worked hours.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-employee wage and premium settings.
///
/// Each premium has an enable flag and a surcharge percentage
/// (e.g. `25` means +25% of the hourly wage).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EmployeePremiumConfig {
    /// Base hourly wage.
    pub hourly_wage: Decimal,
    /// Whether night hours earn a surcharge.
    #[serde(default)]
    pub night_premium_enabled: bool,
    /// Night surcharge in percent.
    #[serde(default)]
    pub night_premium_percent: Decimal,
    /// Whether Sunday hours earn a surcharge.
    #[serde(default)]
    pub sunday_premium_enabled: bool,
    /// Sunday surcharge in percent.
    #[serde(default)]
    pub sunday_premium_percent: Decimal,
    /// Whether public holiday hours earn a surcharge.
    #[serde(default)]
    pub holiday_premium_enabled: bool,
    /// Holiday surcharge in percent.
    #[serde(default)]
    pub holiday_premium_percent: Decimal,
}

/// An employee as seen by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Contracted hours per week.
    pub weekly_target_hours: Decimal,
    /// Wage and premium settings.
    #[serde(default)]
    pub premium: EmployeePremiumConfig,
}

impl Employee {
    /// Returns true if any premium is enabled for this employee.
    ///
    /// # Examples
    ///
    /// ```
    /// use timesheet_engine::models::{Employee, EmployeePremiumConfig};
    /// use rust_decimal::Decimal;
    ///
    /// let employee = Employee {
    ///     id: "emp_001".to_string(),
    ///     name: "Anna".to_string(),
    ///     weekly_target_hours: Decimal::new(30, 0),
    ///     premium: EmployeePremiumConfig::default(),
    /// };
    /// assert!(!employee.has_premiums());
    /// ```
    pub fn has_premiums(&self) -> bool {
        self.premium.night_premium_enabled
            || self.premium.sunday_premium_enabled
            || self.premium.holiday_premium_enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_employee_with_premiums() {
        let json = r#"{
            "id": "emp_001",
            "name": "Anna Schmidt",
            "weekly_target_hours": "30",
            "premium": {
                "hourly_wage": "15.50",
                "night_premium_enabled": true,
                "night_premium_percent": "25",
                "sunday_premium_enabled": true,
                "sunday_premium_percent": "50"
            }
        }"#;

        let employee: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(employee.weekly_target_hours, Decimal::new(30, 0));
        assert_eq!(employee.premium.hourly_wage, Decimal::new(1550, 2));
        assert!(employee.premium.night_premium_enabled);
        assert!(!employee.premium.holiday_premium_enabled);
        assert_eq!(employee.premium.holiday_premium_percent, Decimal::ZERO);
        assert!(employee.has_premiums());
    }

    #[test]
    fn test_deserialize_employee_without_premium_block() {
        let json = r#"{
            "id": "emp_002",
            "name": "Ben",
            "weekly_target_hours": "20"
        }"#;

        let employee: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(employee.premium, EmployeePremiumConfig::default());
        assert!(!employee.has_premiums());
    }
}
