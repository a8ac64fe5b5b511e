//! Configuration loading and management for the timesheet engine.
//!
//! This module provides functionality to load the engine configuration from
//! YAML files: the night premium window, signing-token validity, the backup
//! note marker and the regional public holiday calendar.
//!
//! # Example
//!
//! ```no_run
//! use timesheet_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Holiday region: {}", config.config().holidays().region);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{EngineConfig, EngineSettings};
