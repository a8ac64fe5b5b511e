//! Application state for the timesheet engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::{ConfigLoader, EngineConfig};
use crate::schedule::ShiftService;
use crate::store::TimesheetStore;
use crate::submission::SubmissionService;

/// Shared application state.
///
/// Contains the loaded configuration and the services that run the
/// submission workflow and shift scheduling against the shared store.
#[derive(Clone)]
pub struct AppState {
    config: Arc<EngineConfig>,
    submissions: Arc<SubmissionService>,
    shifts: Arc<ShiftService>,
}

impl AppState {
    /// Creates the state with default collaborators over the given store.
    pub fn new(config: ConfigLoader, store: Arc<dyn TimesheetStore>) -> Self {
        let config = Arc::new(config.config().clone());
        let submissions = SubmissionService::new(store.clone(), config.clone());
        let shifts = ShiftService::new(store, config.clone());
        Self::from_parts(config, submissions, shifts)
    }

    /// Creates the state from already configured services.
    pub fn from_parts(
        config: Arc<EngineConfig>,
        submissions: SubmissionService,
        shifts: ShiftService,
    ) -> Self {
        Self {
            config,
            submissions: Arc::new(submissions),
            shifts: Arc::new(shifts),
        }
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the submission workflow.
    pub fn submissions(&self) -> &SubmissionService {
        &self.submissions
    }

    /// Returns the shift scheduling service.
    pub fn shifts(&self) -> &ShiftService {
        &self.shifts
    }
}
