//! Core data models for the timesheet engine.
//!
//! This module contains all the domain records used throughout the engine.

mod employee;
mod period;
mod shift;
mod submission;
mod totals;

pub use employee::{Employee, EmployeePremiumConfig};
pub use period::ReportingMonth;
pub use shift::{AbsenceKind, ShiftEntry, ShiftStatus};
pub use submission::{
    EmployeeSignature, ManualRelease, RecipientSignature, SignatureValue, SubmissionStatus,
    SubmissionTransition, TeamSubmission,
};
pub use totals::{MonthlyAggregate, OvertimeSummary, PayEstimate, PremiumBreakdown};
