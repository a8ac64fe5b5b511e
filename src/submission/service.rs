//! The submission signature workflow.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::calculation::{aggregate_month, calculate_overtime, working_weeks_in_month};
use crate::collaborators::{
    Clock, DocumentGenerator, NoopDocumentGenerator, NoopNotifier, Notifier, SystemClock,
};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    EmployeeSignature, ManualRelease, RecipientSignature, ReportingMonth, ShiftStatus,
    SignatureValue, SubmissionStatus, SubmissionTransition, TeamSubmission,
};
use crate::store::{TimesheetStore, in_transaction};

use super::outcome::{EmployeePreview, SubmissionOutcome, SubmissionPreview, SubmissionView};

/// Drives one submission from employee signatures to the recipient's
/// countersignature.
///
/// Actions addressed by the public token (`view_by_token`,
/// `sign_as_employee`, `recipient_sign`) check token expiry first. Admin
/// actions address the submission by id and ignore the token.
pub struct SubmissionService {
    store: Arc<dyn TimesheetStore>,
    config: Arc<EngineConfig>,
    clock: Arc<dyn Clock>,
    documents: Arc<dyn DocumentGenerator>,
    notifier: Arc<dyn Notifier>,
}

impl SubmissionService {
    /// Creates a service using the system clock and no-op collaborators.
    pub fn new(store: Arc<dyn TimesheetStore>, config: Arc<EngineConfig>) -> Self {
        Self {
            store,
            config,
            clock: Arc::new(SystemClock),
            documents: Arc::new(NoopDocumentGenerator),
            notifier: Arc::new(NoopNotifier),
        }
    }

    /// Replaces the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the document generator.
    pub fn with_document_generator(mut self, documents: Arc<dyn DocumentGenerator>) -> Self {
        self.documents = documents;
        self
    }

    /// Replaces the notifier.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Opens the signature batch for a sheet and month.
    ///
    /// Creates one signature slot per employee with shifts in the batch and
    /// moves the batch's confirmed shifts to submitted. A batch that was
    /// reset gets fresh slots on its existing submission.
    ///
    /// # Errors
    ///
    /// * `Validation` if the batch has no shifts
    /// * `Conflict` if the batch already has an open submission
    pub fn open(&self, sheet: &str, month: ReportingMonth) -> EngineResult<SubmissionOutcome> {
        if sheet.trim().is_empty() {
            return Err(EngineError::validation("sheet", "must not be empty"));
        }

        let employees: BTreeSet<String> = self
            .store
            .shifts_in_batch(sheet, month)?
            .into_iter()
            .filter(|shift| !shift.is_deleted())
            .map(|shift| shift.employee_id)
            .collect();
        if employees.is_empty() {
            return Err(EngineError::validation(
                "sheet",
                format!("sheet {sheet} has no shifts in {month}"),
            ));
        }

        match self.store.find_for_batch(sheet, month)? {
            Some(existing) => self.reopen(existing, &employees),
            None => self.create(sheet, month, &employees),
        }
    }

    fn create(
        &self,
        sheet: &str,
        month: ReportingMonth,
        employees: &BTreeSet<String>,
    ) -> EngineResult<SubmissionOutcome> {
        let (token, token_expires_at) = self.issue_token();
        let submission = TeamSubmission {
            id: Uuid::new_v4().to_string(),
            sheet: sheet.to_string(),
            month,
            status: SubmissionStatus::PendingEmployees,
            token,
            token_expires_at,
            recipient_signature: None,
            manual_release: None,
            document_ref: None,
            created_at: self.clock.now(),
        };
        let slots: Vec<EmployeeSignature> = employees
            .iter()
            .map(|employee_id| EmployeeSignature::pending(&submission.id, employee_id))
            .collect();

        let submitted = in_transaction(self.store.as_ref(), |tx| {
            tx.insert_submission(&submission)?;
            tx.insert_signatures(&slots)?;
            tx.transition_batch_shifts(sheet, month, ShiftStatus::Confirmed, ShiftStatus::Submitted)
        })?;

        info!(
            submission_id = %submission.id,
            sheet = %sheet,
            month = %month,
            employees = slots.len(),
            shifts_submitted = submitted,
            "Submission opened"
        );
        self.outcome(&submission.id, true, Some(submission.token.clone()))
    }

    fn reopen(
        &self,
        submission: TeamSubmission,
        employees: &BTreeSet<String>,
    ) -> EngineResult<SubmissionOutcome> {
        let slots: Vec<EmployeeSignature> = employees
            .iter()
            .map(|employee_id| EmployeeSignature::pending(&submission.id, employee_id))
            .collect();

        let submitted = in_transaction(self.store.as_ref(), |tx| {
            let current = tx
                .get_submission(&submission.id)?
                .ok_or_else(|| EngineError::not_found("submission", &submission.id))?;
            if current.status != SubmissionStatus::PendingEmployees
                || !tx.signatures(&submission.id)?.is_empty()
            {
                return Err(EngineError::conflict(format!(
                    "sheet {} already has an open submission for {}",
                    submission.sheet, submission.month
                )));
            }
            tx.insert_signatures(&slots)?;
            tx.transition_batch_shifts(
                &submission.sheet,
                submission.month,
                ShiftStatus::Confirmed,
                ShiftStatus::Submitted,
            )
        })?;

        info!(
            submission_id = %submission.id,
            employees = slots.len(),
            shifts_submitted = submitted,
            "Submission reopened after reset"
        );
        self.outcome(&submission.id, false, Some(submission.token))
    }

    /// Returns a submission and its signature slots for a token holder.
    ///
    /// # Errors
    ///
    /// * `NotFound` if no submission carries the token
    /// * `TokenExpired` if the token is past its expiry
    pub fn view_by_token(&self, token: &str) -> EngineResult<SubmissionView> {
        let submission = self.load_by_token(token)?;
        let signatures = self.store.signatures(&submission.id)?;
        Ok(SubmissionView {
            submission,
            signatures,
        })
    }

    /// Records an employee's own signature.
    ///
    /// The first signature wins; a second attempt on the same slot is a
    /// conflict. When the last slot is filled the submission moves on to the
    /// recipient.
    pub fn sign_as_employee(
        &self,
        token: &str,
        employee_id: &str,
        signature_data: &str,
        ip_address: &str,
    ) -> EngineResult<SubmissionOutcome> {
        let submission = self.load_by_token(token)?;
        if signature_data.trim().is_empty() {
            return Err(EngineError::validation("signature", "must not be empty"));
        }
        let value = SignatureValue::Signed {
            data: signature_data.to_string(),
        };
        self.fill_signature(&submission, employee_id, value, ip_address, "sign")
    }

    /// Waives an employee's signature on the admin's authority.
    ///
    /// Behaves exactly like [`SubmissionService::sign_as_employee`] but
    /// stores a skip marker naming the admin.
    pub fn skip_signature(
        &self,
        submission_id: &str,
        employee_id: &str,
        actor: &str,
    ) -> EngineResult<SubmissionOutcome> {
        let actor = require_actor(actor)?;
        let submission = self.load(submission_id)?;
        let value = SignatureValue::Skipped {
            actor: actor.to_string(),
        };
        self.fill_signature(&submission, employee_id, value, "admin", "skip_signature")
    }

    fn fill_signature(
        &self,
        submission: &TeamSubmission,
        employee_id: &str,
        value: SignatureValue,
        ip_address: &str,
        action: &str,
    ) -> EngineResult<SubmissionOutcome> {
        if submission.status != SubmissionStatus::PendingEmployees {
            return Err(invalid_state(action, submission.status));
        }
        let has_slot = self
            .store
            .signatures(&submission.id)?
            .iter()
            .any(|slot| slot.employee_id == employee_id);
        if !has_slot {
            return Err(EngineError::not_found(
                "signature",
                format!("{}/{}", submission.id, employee_id),
            ));
        }

        let affected = self.store.sign_if_unsigned(
            &submission.id,
            employee_id,
            &value,
            self.clock.now(),
            ip_address,
        )?;
        if affected == 0 {
            let current = self.load(&submission.id)?;
            if current.status != SubmissionStatus::PendingEmployees {
                warn!(
                    submission_id = %submission.id,
                    employee_id = %employee_id,
                    action = action,
                    status = %current.status,
                    "Submission left signature collection before the slot was filled"
                );
                return Err(invalid_state(action, current.status));
            }
            warn!(
                submission_id = %submission.id,
                employee_id = %employee_id,
                action = action,
                "Signature slot already filled"
            );
            return Err(EngineError::conflict(format!(
                "employee {employee_id} has already signed submission {}",
                submission.id
            )));
        }
        info!(
            submission_id = %submission.id,
            employee_id = %employee_id,
            action = action,
            "Signature recorded"
        );

        let advanced = self.release_if_fully_signed(&submission.id)?;
        self.outcome(&submission.id, advanced, None)
    }

    // Status and signature rows are checked in the same store call as the write.
    fn release_if_fully_signed(&self, submission_id: &str) -> EngineResult<bool> {
        let transition = SubmissionTransition::Release { manual: None };
        if self.store.apply_transition(submission_id, &transition)? == 1 {
            info!(submission_id = %submission_id, "All employees signed, released to recipient");
            Ok(true)
        } else {
            debug!(
                submission_id = %submission_id,
                "Signatures outstanding or submission moved on, not released"
            );
            Ok(false)
        }
    }

    /// Releases the submission to the recipient with signatures outstanding.
    ///
    /// # Errors
    ///
    /// * `Validation` if the note or actor is empty
    /// * `Conflict` if the submission was already released
    /// * `InvalidState` if the submission is completed
    pub fn manual_release(
        &self,
        submission_id: &str,
        actor: &str,
        note: &str,
    ) -> EngineResult<SubmissionOutcome> {
        let actor = require_actor(actor)?;
        let note = note.trim();
        if note.is_empty() {
            return Err(EngineError::validation(
                "note",
                "a justification is required for a manual release",
            ));
        }

        let submission = self.load(submission_id)?;
        match submission.status {
            SubmissionStatus::PendingEmployees => {}
            SubmissionStatus::PendingRecipient => {
                return Err(EngineError::conflict(format!(
                    "submission {submission_id} was already released to the recipient"
                )));
            }
            SubmissionStatus::Completed => {
                return Err(invalid_state("manual_release", submission.status));
            }
        }

        let transition = SubmissionTransition::Release {
            manual: Some(ManualRelease {
                released_at: self.clock.now(),
                released_by: actor.to_string(),
                note: note.to_string(),
            }),
        };
        if self.store.apply_transition(submission_id, &transition)? == 0 {
            warn!(
                submission_id = %submission_id,
                actor = %actor,
                "Manual release lost the race"
            );
            return Err(EngineError::conflict(format!(
                "submission {submission_id} was released by another actor"
            )));
        }

        let unsigned = self.store.count_unsigned(submission_id)?;
        info!(
            submission_id = %submission_id,
            actor = %actor,
            unsigned_remaining = unsigned,
            "Submission manually released"
        );
        self.outcome(submission_id, true, None)
    }

    /// Records the recipient's countersignature and completes the batch.
    ///
    /// Marks the batch's submitted shifts completed in the same unit of work.
    /// Document generation and notification run afterwards; their failures
    /// are logged and leave the submission completed.
    ///
    /// # Errors
    ///
    /// * `TokenExpired` if the token is past its expiry, whatever the status
    /// * `InvalidState` if employee signatures are still being collected
    /// * `Conflict` if the recipient already signed
    pub fn recipient_sign(
        &self,
        token: &str,
        signature_data: &str,
        ip_address: &str,
    ) -> EngineResult<SubmissionOutcome> {
        let submission = self.load_by_token(token)?;
        if signature_data.trim().is_empty() {
            return Err(EngineError::validation("signature", "must not be empty"));
        }
        match submission.status {
            SubmissionStatus::PendingRecipient => {}
            SubmissionStatus::PendingEmployees => {
                return Err(invalid_state("recipient_sign", submission.status));
            }
            SubmissionStatus::Completed => {
                return Err(EngineError::conflict(format!(
                    "submission {} was already countersigned",
                    submission.id
                )));
            }
        }

        let transition = SubmissionTransition::RecipientSign(RecipientSignature {
            data: signature_data.to_string(),
            signed_at: self.clock.now(),
            ip_address: ip_address.to_string(),
        });
        let completed_shifts = in_transaction(self.store.as_ref(), |tx| {
            if tx.apply_transition(&submission.id, &transition)? == 0 {
                return Err(EngineError::conflict(format!(
                    "submission {} is no longer awaiting the recipient",
                    submission.id
                )));
            }
            tx.transition_batch_shifts(
                &submission.sheet,
                submission.month,
                ShiftStatus::Submitted,
                ShiftStatus::Completed,
            )
        })
        .inspect_err(|e| {
            if e.is_conflict() {
                warn!(submission_id = %submission.id, "Recipient signature lost the race");
            }
        })?;

        info!(
            submission_id = %submission.id,
            shifts_completed = completed_shifts,
            "Submission countersigned"
        );

        self.generate_document(&submission.id)?;
        let completed = self.load(&submission.id)?;
        if let Err(e) = self.notifier.submission_completed(&completed) {
            warn!(
                submission_id = %submission.id,
                error = %e,
                "Completion notification failed"
            );
        }
        self.outcome(&submission.id, true, None)
    }

    fn generate_document(&self, submission_id: &str) -> EngineResult<()> {
        let submission = self.load(submission_id)?;
        let signatures = self.store.signatures(submission_id)?;
        match self.documents.generate(&submission, &signatures) {
            Ok(document_ref) => {
                if let Err(e) = self.store.set_document_ref(submission_id, &document_ref) {
                    error!(
                        submission_id = %submission_id,
                        error = %e,
                        "Failed to store document reference"
                    );
                }
            }
            Err(e) => {
                error!(
                    submission_id = %submission_id,
                    error = %e,
                    "Document generation failed, submission stays completed without a document"
                );
            }
        }
        Ok(())
    }

    /// Takes a released submission back from the recipient.
    ///
    /// Signature slots are left as they are.
    ///
    /// # Errors
    ///
    /// * `Conflict` if the submission is already back with the employees
    /// * `InvalidState` if the recipient already signed
    pub fn revert_release(&self, submission_id: &str, actor: &str) -> EngineResult<SubmissionOutcome> {
        let actor = require_actor(actor)?;
        let submission = self.load(submission_id)?;
        match submission.status {
            SubmissionStatus::PendingRecipient if submission.recipient_signature.is_none() => {}
            SubmissionStatus::PendingEmployees => {
                return Err(EngineError::conflict(format!(
                    "submission {submission_id} is already awaiting employee signatures"
                )));
            }
            status => return Err(invalid_state("revert_release", status)),
        }

        if self
            .store
            .apply_transition(submission_id, &SubmissionTransition::RevertRelease)?
            == 0
        {
            warn!(
                submission_id = %submission_id,
                actor = %actor,
                "Revert lost the race"
            );
            return Err(EngineError::conflict(format!(
                "submission {submission_id} changed while reverting"
            )));
        }
        info!(submission_id = %submission_id, actor = %actor, "Release reverted");
        self.outcome(submission_id, true, None)
    }

    /// Starts the batch over from any state.
    ///
    /// Deletes every signature slot, returns submitted shifts to confirmed,
    /// clears the recipient signature, manual release and document
    /// reference, and issues a new token. All of it commits together.
    pub fn reset(&self, submission_id: &str, actor: &str) -> EngineResult<SubmissionOutcome> {
        let actor = require_actor(actor)?;
        let submission = self.load(submission_id)?;
        let (token, token_expires_at) = self.issue_token();
        let transition = SubmissionTransition::Reset {
            token: token.clone(),
            token_expires_at,
        };

        let (signatures_removed, shifts_reverted) = in_transaction(self.store.as_ref(), |tx| {
            let removed = tx.delete_signatures(submission_id)?;
            let reverted = tx.transition_batch_shifts(
                &submission.sheet,
                submission.month,
                ShiftStatus::Submitted,
                ShiftStatus::Confirmed,
            )?;
            if tx.apply_transition(submission_id, &transition)? == 0 {
                return Err(EngineError::not_found("submission", submission_id));
            }
            Ok((removed, reverted))
        })?;

        info!(
            submission_id = %submission_id,
            actor = %actor,
            previous_status = %submission.status,
            signatures_removed = signatures_removed,
            shifts_reverted = shifts_reverted,
            "Submission reset"
        );
        self.outcome(submission_id, true, Some(token))
    }

    /// Computes every contributing employee's monthly totals and overtime.
    ///
    /// Each employee's target is their weekly hours times the month's
    /// working weeks.
    pub fn preview(&self, submission_id: &str) -> EngineResult<SubmissionPreview> {
        let submission = self.load(submission_id)?;
        let batch = self
            .store
            .shifts_in_batch(&submission.sheet, submission.month)?;
        let organization = self.store.shifts_in_month(submission.month)?;
        let employee_ids: BTreeSet<&str> = batch
            .iter()
            .filter(|shift| !shift.is_deleted())
            .map(|shift| shift.employee_id.as_str())
            .collect();

        let rules = self.config.rules();
        let working_weeks = working_weeks_in_month(submission.month);
        let mut employees = Vec::with_capacity(employee_ids.len());
        for employee_id in employee_ids {
            let employee = self
                .store
                .get_employee(employee_id)?
                .ok_or_else(|| EngineError::not_found("employee", employee_id))?;
            let aggregate = aggregate_month(
                employee_id,
                submission.month,
                &batch,
                &organization,
                &employee.premium,
                &rules,
            )?;
            let overtime =
                calculate_overtime(employee.weekly_target_hours, working_weeks, &aggregate);
            employees.push(EmployeePreview {
                employee_id: employee.id,
                name: employee.name,
                aggregate,
                overtime,
            });
        }

        let totals = employees.iter().map(|entry| entry.overtime).sum();
        Ok(SubmissionPreview {
            submission_id: submission.id,
            sheet: submission.sheet,
            month: submission.month,
            status: submission.status,
            employees,
            totals,
        })
    }

    fn load(&self, submission_id: &str) -> EngineResult<TeamSubmission> {
        self.store
            .get_submission(submission_id)?
            .ok_or_else(|| EngineError::not_found("submission", submission_id))
    }

    fn load_by_token(&self, token: &str) -> EngineResult<TeamSubmission> {
        let submission = self
            .store
            .find_by_token(token)?
            .ok_or_else(|| EngineError::not_found("submission", "token"))?;
        if !submission.token_valid_at(self.clock.now()) {
            return Err(EngineError::TokenExpired {
                expired_at: submission.token_expires_at,
            });
        }
        Ok(submission)
    }

    fn issue_token(&self) -> (String, DateTime<Utc>) {
        (
            Uuid::new_v4().to_string(),
            self.clock.now() + self.config.token_validity(),
        )
    }

    fn outcome(
        &self,
        submission_id: &str,
        status_changed: bool,
        token: Option<String>,
    ) -> EngineResult<SubmissionOutcome> {
        let submission = self.load(submission_id)?;
        let unsigned_remaining = self.store.count_unsigned(submission_id)?;
        Ok(SubmissionOutcome {
            submission_id: submission.id,
            status: submission.status,
            unsigned_remaining,
            status_changed,
            token,
            document_ref: submission.document_ref,
        })
    }
}

fn require_actor(actor: &str) -> EngineResult<&str> {
    let actor = actor.trim();
    if actor.is_empty() {
        return Err(EngineError::validation("actor", "must not be empty"));
    }
    Ok(actor)
}

fn invalid_state(action: &str, status: SubmissionStatus) -> EngineError {
    EngineError::InvalidState {
        action: action.to_string(),
        status: status.to_string(),
    }
}
