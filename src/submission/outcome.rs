//! Result records returned by the submission actions.

use serde::{Deserialize, Serialize};

use crate::models::{
    EmployeeSignature, MonthlyAggregate, OvertimeSummary, ReportingMonth, SubmissionStatus,
    TeamSubmission,
};

/// What a submission action left behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionOutcome {
    /// The submission acted on.
    pub submission_id: String,
    /// Status after the action.
    pub status: SubmissionStatus,
    /// Signature slots still empty.
    pub unsigned_remaining: usize,
    /// True if this action moved the submission to a new status.
    pub status_changed: bool,
    /// Public signing token, returned by actions that issue one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Reference of the generated document, once completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_ref: Option<String>,
}

/// A submission as shown to a token holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionView {
    /// The submission row.
    pub submission: TeamSubmission,
    /// Its signature slots.
    pub signatures: Vec<EmployeeSignature>,
}

/// Totals of one contributing employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeePreview {
    /// The employee.
    pub employee_id: String,
    /// Display name.
    pub name: String,
    /// Hours for the month.
    pub aggregate: MonthlyAggregate,
    /// Hours against the contracted target.
    pub overtime: OvertimeSummary,
}

/// Admin preview of a submission's hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionPreview {
    /// The submission.
    pub submission_id: String,
    /// Its sheet.
    pub sheet: String,
    /// Its month.
    pub month: ReportingMonth,
    /// Its status.
    pub status: SubmissionStatus,
    /// One entry per contributing employee, ordered by employee id.
    pub employees: Vec<EmployeePreview>,
    /// Field-by-field sum of every employee's overtime summary.
    pub totals: OvertimeSummary,
}
