//! Submission and signature models.
//!
//! A [`TeamSubmission`] is the signable batch for one sheet and month. It owns
//! one [`EmployeeSignature`] per contributing employee and, once released,
//! collects the recipient's countersignature.
//!
//! [`SubmissionTransition`] describes every status change together with the
//! precondition it must be applied under, so a store can execute it as one
//! conditional update.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ReportingMonth;

/// Lifecycle status of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    /// Waiting for employee signatures.
    PendingEmployees,
    /// Waiting for the recipient's countersignature.
    PendingRecipient,
    /// Countersigned.
    Completed,
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionStatus::PendingEmployees => write!(f, "pending_employees"),
            SubmissionStatus::PendingRecipient => write!(f, "pending_recipient"),
            SubmissionStatus::Completed => write!(f, "completed"),
        }
    }
}

/// What was written into an employee's signature slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SignatureValue {
    /// A real signature image or blob supplied by the employee.
    Signed {
        /// Encoded signature data.
        data: String,
    },
    /// Sentinel written when an admin waived the signature.
    Skipped {
        /// The admin who skipped it.
        actor: String,
    },
}

/// One employee's signature slot on a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeSignature {
    /// The submission the slot belongs to.
    pub submission_id: String,
    /// The employee expected to sign.
    pub employee_id: String,
    /// The signature, or `None` while outstanding.
    pub signature: Option<SignatureValue>,
    /// When the slot was filled.
    pub signed_at: Option<DateTime<Utc>>,
    /// Client address the signature came from.
    pub ip_address: Option<String>,
}

impl EmployeeSignature {
    /// Creates an outstanding slot.
    pub fn pending(submission_id: impl Into<String>, employee_id: impl Into<String>) -> Self {
        Self {
            submission_id: submission_id.into(),
            employee_id: employee_id.into(),
            signature: None,
            signed_at: None,
            ip_address: None,
        }
    }

    /// Returns true once the slot holds a signature or skip sentinel.
    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }
}

/// The recipient's countersignature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientSignature {
    /// Encoded signature data.
    pub data: String,
    /// When the recipient signed.
    pub signed_at: DateTime<Utc>,
    /// Client address the signature came from.
    pub ip_address: String,
}

/// Audit record of an admin forcing the release to the recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualRelease {
    /// When the release happened.
    pub released_at: DateTime<Utc>,
    /// The admin who released.
    pub released_by: String,
    /// Justification entered by the admin.
    pub note: String,
}

/// The signature batch for one sheet and month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSubmission {
    /// Unique identifier.
    pub id: String,
    /// The sheet the batch covers.
    pub sheet: String,
    /// The month the batch covers.
    pub month: ReportingMonth,
    /// Current status.
    pub status: SubmissionStatus,
    /// Public signing token.
    pub token: String,
    /// The token is usable up to and including this instant.
    pub token_expires_at: DateTime<Utc>,
    /// Countersignature, once given.
    pub recipient_signature: Option<RecipientSignature>,
    /// Manual release metadata, when an admin released early.
    pub manual_release: Option<ManualRelease>,
    /// Reference to the generated final document.
    pub document_ref: Option<String>,
    /// When the batch was opened.
    pub created_at: DateTime<Utc>,
}

impl TeamSubmission {
    /// Returns true if the public token may still be used at `now`.
    pub fn token_valid_at(&self, now: DateTime<Utc>) -> bool {
        now <= self.token_expires_at
    }
}

/// A status change and the precondition it is applied under.
///
/// Stores must evaluate [`SubmissionTransition::precondition_holds`] against
/// the stored row and its signature rows, then [`SubmissionTransition::apply_to`],
/// as one atomic step and report whether the row was changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionTransition {
    /// `PENDING_EMPLOYEES -> PENDING_RECIPIENT`, automatic or manual.
    Release {
        /// Present when an admin forced the release.
        manual: Option<ManualRelease>,
    },
    /// `PENDING_RECIPIENT -> COMPLETED` with the recipient's signature.
    RecipientSign(RecipientSignature),
    /// `PENDING_RECIPIENT -> PENDING_EMPLOYEES` before countersignature.
    RevertRelease,
    /// Any state back to a fresh `PENDING_EMPLOYEES` with a new token.
    Reset {
        /// The replacement token.
        token: String,
        /// Expiry of the replacement token.
        token_expires_at: DateTime<Utc>,
    },
}

impl SubmissionTransition {
    /// Short name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            SubmissionTransition::Release { manual: None } => "auto_release",
            SubmissionTransition::Release { manual: Some(_) } => "manual_release",
            SubmissionTransition::RecipientSign(_) => "recipient_sign",
            SubmissionTransition::RevertRelease => "revert_release",
            SubmissionTransition::Reset { .. } => "reset",
        }
    }

    /// Returns true if the transition may be applied to the submission as it is now.
    ///
    /// `signatures` are the submission's signature rows. An automatic release
    /// needs at least one row and every row signed; a submission whose rows
    /// were deleted by a reset is never released automatically.
    pub fn precondition_holds(
        &self,
        submission: &TeamSubmission,
        signatures: &[EmployeeSignature],
    ) -> bool {
        match self {
            SubmissionTransition::Release { manual: None } => {
                submission.status == SubmissionStatus::PendingEmployees
                    && !signatures.is_empty()
                    && signatures.iter().all(EmployeeSignature::is_signed)
            }
            SubmissionTransition::Release { manual: Some(_) } => {
                submission.status == SubmissionStatus::PendingEmployees
            }
            SubmissionTransition::RecipientSign(_) | SubmissionTransition::RevertRelease => {
                submission.status == SubmissionStatus::PendingRecipient
                    && submission.recipient_signature.is_none()
            }
            SubmissionTransition::Reset { .. } => true,
        }
    }

    /// Writes the transition's effects into the submission.
    pub fn apply_to(&self, submission: &mut TeamSubmission) {
        match self {
            SubmissionTransition::Release { manual } => {
                submission.status = SubmissionStatus::PendingRecipient;
                submission.manual_release = manual.clone();
            }
            SubmissionTransition::RecipientSign(signature) => {
                submission.status = SubmissionStatus::Completed;
                submission.recipient_signature = Some(signature.clone());
            }
            SubmissionTransition::RevertRelease => {
                submission.status = SubmissionStatus::PendingEmployees;
                submission.manual_release = None;
            }
            SubmissionTransition::Reset {
                token,
                token_expires_at,
            } => {
                submission.status = SubmissionStatus::PendingEmployees;
                submission.token = token.clone();
                submission.token_expires_at = *token_expires_at;
                submission.recipient_signature = None;
                submission.manual_release = None;
                submission.document_ref = None;
            }
        }
    }
}
