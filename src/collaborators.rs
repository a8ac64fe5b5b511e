//! Interfaces to the services the engine calls out to.
//!
//! The engine reads the time from a [`Clock`], hands a countersigned batch to
//! a [`DocumentGenerator`] and announces completion through a [`Notifier`].
//! Rendering and delivery live outside the engine.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};

use crate::error::EngineResult;
use crate::models::{EmployeeSignature, TeamSubmission};

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
///
/// # Example
///
/// ```
/// use timesheet_engine::collaborators::{Clock, FixedClock};
/// use chrono::{Duration, TimeZone, Utc};
///
/// let start = Utc.with_ymd_and_hms(2026, 2, 1, 9, 0, 0).unwrap();
/// let clock = FixedClock::new(start);
/// clock.advance(Duration::days(31));
/// assert_eq!(clock.now(), start + Duration::days(31));
/// ```
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    /// Creates a clock stopped at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Renders the final countersigned document of a batch.
pub trait DocumentGenerator: Send + Sync {
    /// Produces the document and returns a reference to it.
    fn generate(
        &self,
        submission: &TeamSubmission,
        signatures: &[EmployeeSignature],
    ) -> EngineResult<String>;
}

/// Document generator that renders nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDocumentGenerator;

impl DocumentGenerator for NoopDocumentGenerator {
    fn generate(
        &self,
        submission: &TeamSubmission,
        _signatures: &[EmployeeSignature],
    ) -> EngineResult<String> {
        Ok(format!("documents/{}-{}.pdf", submission.sheet, submission.month))
    }
}

/// Outbound messages about finished batches.
pub trait Notifier: Send + Sync {
    /// Announces that the recipient countersigned the batch.
    fn submission_completed(&self, submission: &TeamSubmission) -> EngineResult<()>;
}

/// Notifier that sends nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn submission_completed(&self, _submission: &TeamSubmission) -> EngineResult<()> {
        Ok(())
    }
}
