//! Monthly submission signature workflow.
//!
//! A submission moves `pending_employees -> pending_recipient -> completed`.
//! Admins can release early, take a release back before the recipient signs,
//! and reset a batch from any state.
//!
//! Every status change is executed as a conditional store update. When the
//! update reports zero affected rows another actor won the race and the
//! action fails with [`EngineError::Conflict`](crate::error::EngineError::Conflict).
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use timesheet_engine::config::EngineConfig;
//! use timesheet_engine::models::{ReportingMonth, ShiftEntry, ShiftStatus, SubmissionStatus};
//! use timesheet_engine::store::{InMemoryStore, ShiftRepository};
//! use timesheet_engine::submission::SubmissionService;
//! use chrono::NaiveDate;
//!
//! let store = Arc::new(InMemoryStore::new());
//! store.insert_shift(&ShiftEntry {
//!     id: "shift_001".to_string(),
//!     employee_id: "emp_001".to_string(),
//!     date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
//!     planned_start: Some("08:00".to_string()),
//!     planned_end: Some("16:00".to_string()),
//!     actual_start: None,
//!     actual_end: None,
//!     break_minutes: 0,
//!     absence: None,
//!     backup_employee_id: None,
//!     status: ShiftStatus::Confirmed,
//!     note: None,
//!     sheet: "team_north".to_string(),
//! })?;
//!
//! let service = SubmissionService::new(store, Arc::new(EngineConfig::default()));
//! let month = ReportingMonth::new(2026, 1)?;
//! let opened = service.open("team_north", month)?;
//! let token = opened.token.clone().unwrap();
//!
//! let signed = service.sign_as_employee(&token, "emp_001", "signature-data", "10.0.0.1")?;
//! assert_eq!(signed.status, SubmissionStatus::PendingRecipient);
//! # Ok::<(), timesheet_engine::error::EngineError>(())
//! ```

mod outcome;
mod service;

pub use outcome::{EmployeePreview, SubmissionOutcome, SubmissionPreview, SubmissionView};
pub use service::SubmissionService;
