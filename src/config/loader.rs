//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the engine
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::calculation::HolidayCalendar;
use crate::error::{EngineError, EngineResult};

use super::types::{EngineConfig, EngineSettings};

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── engine.yaml    # Night window, token validity, backup marker
/// └── holidays.yaml  # Region and its public holidays
/// ```
///
/// # Example
///
/// ```no_run
/// use timesheet_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default")?;
/// println!("Holiday region: {}", loader.config().holidays().region);
/// # Ok::<(), timesheet_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML or an invalid `HH:MM` value
    /// - A setting is out of range
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let engine_path = path.join("engine.yaml");
        let settings = Self::load_yaml::<EngineSettings>(&engine_path)?;
        if settings.signing_token_validity_days == 0 {
            return Err(EngineError::ConfigParseError {
                path: engine_path.display().to_string(),
                message: "signing_token_validity_days must be at least 1".to_string(),
            });
        }
        if settings.backup_note_marker.trim().is_empty() {
            return Err(EngineError::ConfigParseError {
                path: engine_path.display().to_string(),
                message: "backup_note_marker must not be empty".to_string(),
            });
        }

        let holidays_path = path.join("holidays.yaml");
        let holidays = Self::load_yaml::<HolidayCalendar>(&holidays_path)?;
        Self::validate_holidays(&holidays, &holidays_path)?;

        info!(
            config_dir = %path.display(),
            region = %holidays.region,
            fixed_holidays = holidays.fixed.len(),
            easter_holidays = holidays.easter_relative.len(),
            "Engine configuration loaded"
        );

        Ok(Self {
            config: EngineConfig::new(settings, holidays),
        })
    }

    /// Wraps an already built configuration.
    pub fn from_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Rejects fixed holidays that cannot exist in any year.
    fn validate_holidays(calendar: &HolidayCalendar, path: &Path) -> EngineResult<()> {
        for holiday in &calendar.fixed {
            // 2024 is a leap year, so Feb 29 is accepted.
            if chrono::NaiveDate::from_ymd_opt(2024, holiday.month, holiday.day).is_none() {
                return Err(EngineError::ConfigParseError {
                    path: path.display().to_string(),
                    message: format!(
                        "holiday '{}' has invalid date {}-{}",
                        holiday.name, holiday.month, holiday.day
                    ),
                });
            }
        }
        Ok(())
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
