//! Request types for the timesheet engine API.
//!
//! This module defines the JSON request bodies accepted by the endpoints.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{AbsenceKind, EmployeePremiumConfig, MonthlyAggregate, ShiftEntry};

/// Request body for `POST /aggregate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateRequest {
    /// The employee to aggregate.
    pub employee_id: String,
    /// Reporting year.
    pub year: i32,
    /// Reporting month, 1-12.
    pub month: u32,
    /// The employee's wage and premium settings.
    #[serde(default)]
    pub premium: EmployeePremiumConfig,
    /// The employee's shifts.
    pub shifts: Vec<ShiftEntry>,
    /// Every shift of the organization in the month, for backup detection.
    /// Defaults to `shifts` when omitted.
    #[serde(default)]
    pub organization_shifts: Vec<ShiftEntry>,
}

/// Request body for `POST /overtime`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OvertimeRequest {
    /// Contracted hours per week.
    pub weekly_target_hours: Decimal,
    /// Reporting year.
    pub year: i32,
    /// Reporting month, 1-12.
    pub month: u32,
    /// Weeks to multiply the target by. Defaults to days in month / 7.
    #[serde(default)]
    pub working_weeks: Option<Decimal>,
    /// The employee's monthly totals.
    pub aggregate: MonthlyAggregate,
}

/// Request body for `POST /submissions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenSubmissionRequest {
    /// The sheet to open.
    pub sheet: String,
    /// Reporting year.
    pub year: i32,
    /// Reporting month, 1-12.
    pub month: u32,
}

/// Request body for the signing endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureRequest {
    /// Encoded signature data.
    pub signature: String,
}

/// Request body for admin actions on a submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminActionRequest {
    /// The admin performing the action.
    pub actor: String,
    /// Justification, required for a manual release.
    #[serde(default)]
    pub note: Option<String>,
}

/// Request body for `POST /admin/shifts/:id/duplicate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateShiftRequest {
    /// The date to copy the shift to.
    pub target_date: NaiveDate,
}

/// Request body for `POST /admin/shifts/:id/absence`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbsenceRequest {
    /// Why the employee could not work.
    pub kind: AbsenceKind,
}
