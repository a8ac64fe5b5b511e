//! Storage interface for shifts, employees and submissions.
//!
//! The engine never reads-then-writes to decide a race. Every update that
//! must not double-apply is a single conditional call that reports how many
//! rows it changed; `0` means another actor got there first and the caller
//! turns it into [`EngineError::Conflict`](crate::error::EngineError::Conflict).
//!
//! Multi-record changes run inside [`TimesheetStore::transaction`], which
//! commits every write of the unit of work or none of them.

mod memory;

use chrono::{DateTime, Utc};

use crate::error::{EngineError, EngineResult};
use crate::models::{
    Employee, EmployeeSignature, ReportingMonth, ShiftEntry, ShiftStatus, SignatureValue,
    SubmissionTransition, TeamSubmission,
};

pub use memory::InMemoryStore;

/// Shift entry storage.
pub trait ShiftRepository: Send + Sync {
    /// Looks up a shift by id.
    fn get_shift(&self, id: &str) -> EngineResult<Option<ShiftEntry>>;

    /// All shifts of one employee in a month, ordered by date.
    fn shifts_for_employee(
        &self,
        employee_id: &str,
        month: ReportingMonth,
    ) -> EngineResult<Vec<ShiftEntry>>;

    /// Every shift of the organization in a month, ordered by date.
    fn shifts_in_month(&self, month: ReportingMonth) -> EngineResult<Vec<ShiftEntry>>;

    /// The shifts of one signature batch, ordered by date.
    fn shifts_in_batch(&self, sheet: &str, month: ReportingMonth)
    -> EngineResult<Vec<ShiftEntry>>;

    /// Stores a new shift.
    ///
    /// Fails with a conflict when the id is taken or the employee already
    /// has a non-deleted shift on that date.
    fn insert_shift(&self, shift: &ShiftEntry) -> EngineResult<()>;

    /// Replaces a stored shift.
    fn update_shift(&self, shift: &ShiftEntry) -> EngineResult<()>;

    /// Removes a shift. Returns the number of rows removed.
    fn delete_shift(&self, id: &str) -> EngineResult<usize>;
}

/// Employee directory.
pub trait EmployeeRepository: Send + Sync {
    /// Looks up an employee by id.
    fn get_employee(&self, id: &str) -> EngineResult<Option<Employee>>;

    /// Creates or replaces an employee record.
    fn upsert_employee(&self, employee: &Employee) -> EngineResult<()>;
}

/// Submission and signature storage.
pub trait SubmissionRepository: Send + Sync {
    /// Looks up a submission by id.
    fn get_submission(&self, id: &str) -> EngineResult<Option<TeamSubmission>>;

    /// Looks up a submission by its public signing token.
    fn find_by_token(&self, token: &str) -> EngineResult<Option<TeamSubmission>>;

    /// Looks up the submission of a (sheet, month) batch.
    fn find_for_batch(
        &self,
        sheet: &str,
        month: ReportingMonth,
    ) -> EngineResult<Option<TeamSubmission>>;

    /// The signature rows of a submission, ordered by employee id.
    fn signatures(&self, submission_id: &str) -> EngineResult<Vec<EmployeeSignature>>;

    /// Fills one signature slot if it is still empty and the submission is
    /// still collecting signatures (`PENDING_EMPLOYEES`).
    ///
    /// Returns `1` if the slot was filled, `0` if it was already signed,
    /// does not exist, or the submission has moved on.
    fn sign_if_unsigned(
        &self,
        submission_id: &str,
        employee_id: &str,
        signature: &SignatureValue,
        signed_at: DateTime<Utc>,
        ip_address: &str,
    ) -> EngineResult<usize>;

    /// Number of signature slots still empty.
    fn count_unsigned(&self, submission_id: &str) -> EngineResult<usize>;

    /// Applies a transition if its precondition holds on the stored row and
    /// its signature rows.
    ///
    /// Returns `1` if the row changed, `0` otherwise.
    fn apply_transition(
        &self,
        submission_id: &str,
        transition: &SubmissionTransition,
    ) -> EngineResult<usize>;

    /// Records the reference of the generated final document.
    fn set_document_ref(&self, submission_id: &str, document_ref: &str) -> EngineResult<()>;
}

/// The writes available inside a transaction.
///
/// Everything done through a `UnitOfWork` becomes visible together when
/// the transaction commits, or not at all.
pub trait UnitOfWork {
    /// Reads a submission as seen by this transaction.
    fn get_submission(&mut self, id: &str) -> EngineResult<Option<TeamSubmission>>;

    /// Reads signature rows as seen by this transaction.
    fn signatures(&mut self, submission_id: &str) -> EngineResult<Vec<EmployeeSignature>>;

    /// Stores a new shift, see [`ShiftRepository::insert_shift`].
    fn insert_shift(&mut self, shift: &ShiftEntry) -> EngineResult<()>;

    /// Replaces a stored shift, see [`ShiftRepository::update_shift`].
    fn update_shift(&mut self, shift: &ShiftEntry) -> EngineResult<()>;

    /// Stores a new submission. Conflicts if its batch already has one.
    fn insert_submission(&mut self, submission: &TeamSubmission) -> EngineResult<()>;

    /// Stores signature rows. Conflicts if a slot already exists.
    fn insert_signatures(&mut self, signatures: &[EmployeeSignature]) -> EngineResult<usize>;

    /// Deletes every signature row of a submission.
    fn delete_signatures(&mut self, submission_id: &str) -> EngineResult<usize>;

    /// Moves the batch's shifts in status `from` to status `to`.
    fn transition_batch_shifts(
        &mut self,
        sheet: &str,
        month: ReportingMonth,
        from: ShiftStatus,
        to: ShiftStatus,
    ) -> EngineResult<usize>;

    /// Conditional submission update, see [`SubmissionRepository::apply_transition`].
    fn apply_transition(
        &mut self,
        submission_id: &str,
        transition: &SubmissionTransition,
    ) -> EngineResult<usize>;
}

/// A unit of work run by [`TimesheetStore::transaction`].
pub type TransactionWork<'a> = dyn FnMut(&mut dyn UnitOfWork) -> EngineResult<()> + 'a;

/// The complete storage interface the engine runs against.
pub trait TimesheetStore: ShiftRepository + EmployeeRepository + SubmissionRepository {
    /// Runs `work` as one all-or-nothing unit.
    ///
    /// If `work` returns an error nothing it wrote is kept and the error is
    /// returned unchanged.
    fn transaction(&self, work: &mut TransactionWork<'_>) -> EngineResult<()>;
}

/// Runs `work` in a transaction and hands back its result.
///
/// # Example
///
/// ```
/// use timesheet_engine::store::{InMemoryStore, in_transaction};
///
/// let store = InMemoryStore::new();
/// let removed = in_transaction(&store, |tx| tx.delete_signatures("sub_001")).unwrap();
/// assert_eq!(removed, 0);
/// ```
pub fn in_transaction<T, F>(store: &dyn TimesheetStore, mut work: F) -> EngineResult<T>
where
    F: FnMut(&mut dyn UnitOfWork) -> EngineResult<T>,
{
    let mut output = None;
    store.transaction(&mut |tx: &mut dyn UnitOfWork| {
        output = Some(work(tx)?);
        Ok(())
    })?;
    output.ok_or_else(|| EngineError::Storage {
        message: "transaction committed without producing a result".to_string(),
    })
}
