//! Configuration types for the timesheet engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::calculation::{CalculationRules, HolidayCalendar, NightWindow};

fn default_token_validity_days() -> u32 {
    30
}

fn default_backup_note_marker() -> String {
    "[backup]".to_string()
}

/// Engine settings from `engine.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// The night premium window.
    #[serde(default)]
    pub night_window: NightWindow,
    /// How long a freshly issued signing token stays valid.
    #[serde(default = "default_token_validity_days")]
    pub signing_token_validity_days: u32,
    /// Marker written into the note of backup-covering shifts.
    #[serde(default = "default_backup_note_marker")]
    pub backup_note_marker: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            night_window: NightWindow::default(),
            signing_token_validity_days: default_token_validity_days(),
            backup_note_marker: default_backup_note_marker(),
        }
    }
}

/// The complete engine configuration.
///
/// # Example
///
/// ```
/// use timesheet_engine::config::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert_eq!(config.holidays().region, "DE");
/// assert_eq!(config.settings().signing_token_validity_days, 30);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    settings: EngineSettings,
    holidays: HolidayCalendar,
}

impl EngineConfig {
    /// Creates a configuration from its component parts.
    pub fn new(settings: EngineSettings, holidays: HolidayCalendar) -> Self {
        Self { settings, holidays }
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Returns the holiday calendar.
    pub fn holidays(&self) -> &HolidayCalendar {
        &self.holidays
    }

    /// Returns the rules the calculation functions need.
    pub fn rules(&self) -> CalculationRules<'_> {
        CalculationRules {
            calendar: &self.holidays,
            night_window: self.settings.night_window,
            backup_marker: &self.settings.backup_note_marker,
        }
    }

    /// How long a freshly issued signing token stays valid.
    pub fn token_validity(&self) -> Duration {
        Duration::days(i64::from(self.settings.signing_token_validity_days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults_fill_missing_fields() {
        let settings: EngineSettings = serde_yaml::from_str("signing_token_validity_days: 7").unwrap();
        assert_eq!(settings.signing_token_validity_days, 7);
        assert_eq!(settings.night_window, NightWindow::default());
        assert_eq!(settings.backup_note_marker, "[backup]");
    }

    #[test]
    fn test_token_validity() {
        let config = EngineConfig::default();
        assert_eq!(config.token_validity(), Duration::days(30));
    }

    #[test]
    fn test_rules_borrow_configuration() {
        let config = EngineConfig::default();
        let rules = config.rules();
        assert_eq!(rules.backup_marker, "[backup]");
        assert_eq!(rules.calendar.region, "DE");
    }
}
