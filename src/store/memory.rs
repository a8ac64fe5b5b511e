//! In-memory store.
//!
//! All tables sit behind one mutex, so every trait call is atomic. A
//! transaction clones the tables, runs the unit of work against the copy
//! and swaps it in only when the work succeeds.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use crate::error::{EngineError, EngineResult};
use crate::models::{
    Employee, EmployeeSignature, ReportingMonth, ShiftEntry, ShiftStatus, SignatureValue,
    SubmissionStatus, SubmissionTransition, TeamSubmission,
};

use super::{
    EmployeeRepository, ShiftRepository, SubmissionRepository, TimesheetStore, TransactionWork,
    UnitOfWork,
};

#[derive(Debug, Clone, Default)]
struct Tables {
    shifts: BTreeMap<String, ShiftEntry>,
    employees: HashMap<String, Employee>,
    submissions: BTreeMap<String, TeamSubmission>,
    // Keyed by (submission id, employee id).
    signatures: BTreeMap<(String, String), EmployeeSignature>,
}

impl Tables {
    fn collect_shifts(&self, filter: impl Fn(&ShiftEntry) -> bool) -> Vec<ShiftEntry> {
        let mut shifts: Vec<ShiftEntry> = self
            .shifts
            .values()
            .filter(|shift| filter(shift))
            .cloned()
            .collect();
        shifts.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.employee_id.cmp(&b.employee_id))
        });
        shifts
    }

    fn occupies_date(&self, shift: &ShiftEntry) -> bool {
        !shift.is_deleted()
            && self.shifts.values().any(|existing| {
                existing.id != shift.id
                    && !existing.is_deleted()
                    && existing.employee_id == shift.employee_id
                    && existing.date == shift.date
            })
    }

    fn insert_shift(&mut self, shift: &ShiftEntry) -> EngineResult<()> {
        if self.shifts.contains_key(&shift.id) {
            return Err(EngineError::conflict(format!(
                "shift {} already exists",
                shift.id
            )));
        }
        if self.occupies_date(shift) {
            return Err(EngineError::conflict(format!(
                "employee {} already has a shift on {}",
                shift.employee_id, shift.date
            )));
        }
        self.shifts.insert(shift.id.clone(), shift.clone());
        Ok(())
    }

    fn update_shift(&mut self, shift: &ShiftEntry) -> EngineResult<()> {
        if !self.shifts.contains_key(&shift.id) {
            return Err(EngineError::not_found("shift", &shift.id));
        }
        if self.occupies_date(shift) {
            return Err(EngineError::conflict(format!(
                "employee {} already has a shift on {}",
                shift.employee_id, shift.date
            )));
        }
        self.shifts.insert(shift.id.clone(), shift.clone());
        Ok(())
    }

    fn find_for_batch(&self, sheet: &str, month: ReportingMonth) -> Option<TeamSubmission> {
        self.submissions
            .values()
            .find(|submission| submission.sheet == sheet && submission.month == month)
            .cloned()
    }

    fn signatures(&self, submission_id: &str) -> Vec<EmployeeSignature> {
        self.signatures
            .values()
            .filter(|signature| signature.submission_id == submission_id)
            .cloned()
            .collect()
    }

    fn apply_transition(&mut self, submission_id: &str, transition: &SubmissionTransition) -> usize {
        let signatures = Tables::signatures(self, submission_id);
        match self.submissions.get_mut(submission_id) {
            Some(submission) if transition.precondition_holds(submission, &signatures) => {
                transition.apply_to(submission);
                1
            }
            _ => 0,
        }
    }

    fn insert_submission(&mut self, submission: &TeamSubmission) -> EngineResult<()> {
        if self.submissions.contains_key(&submission.id) {
            return Err(EngineError::conflict(format!(
                "submission {} already exists",
                submission.id
            )));
        }
        if self
            .find_for_batch(&submission.sheet, submission.month)
            .is_some()
        {
            return Err(EngineError::conflict(format!(
                "sheet {} already has a submission for {}",
                submission.sheet, submission.month
            )));
        }
        self.submissions
            .insert(submission.id.clone(), submission.clone());
        Ok(())
    }

    fn insert_signatures(&mut self, signatures: &[EmployeeSignature]) -> EngineResult<usize> {
        for signature in signatures {
            let key = (
                signature.submission_id.clone(),
                signature.employee_id.clone(),
            );
            if self.signatures.contains_key(&key) {
                return Err(EngineError::conflict(format!(
                    "signature slot for employee {} already exists",
                    signature.employee_id
                )));
            }
        }
        for signature in signatures {
            self.signatures.insert(
                (
                    signature.submission_id.clone(),
                    signature.employee_id.clone(),
                ),
                signature.clone(),
            );
        }
        Ok(signatures.len())
    }

    fn delete_signatures(&mut self, submission_id: &str) -> usize {
        let before = self.signatures.len();
        self.signatures
            .retain(|(owner, _), _| owner.as_str() != submission_id);
        before - self.signatures.len()
    }

    fn transition_batch_shifts(
        &mut self,
        sheet: &str,
        month: ReportingMonth,
        from: ShiftStatus,
        to: ShiftStatus,
    ) -> usize {
        let mut affected = 0;
        for shift in self.shifts.values_mut() {
            if shift.sheet == sheet && shift.in_month(month) && shift.status == from {
                shift.status = to;
                affected += 1;
            }
        }
        affected
    }
}

impl UnitOfWork for Tables {
    fn get_submission(&mut self, id: &str) -> EngineResult<Option<TeamSubmission>> {
        Ok(self.submissions.get(id).cloned())
    }

    fn signatures(&mut self, submission_id: &str) -> EngineResult<Vec<EmployeeSignature>> {
        Ok(Tables::signatures(self, submission_id))
    }

    fn insert_shift(&mut self, shift: &ShiftEntry) -> EngineResult<()> {
        Tables::insert_shift(self, shift)
    }

    fn update_shift(&mut self, shift: &ShiftEntry) -> EngineResult<()> {
        Tables::update_shift(self, shift)
    }

    fn insert_submission(&mut self, submission: &TeamSubmission) -> EngineResult<()> {
        Tables::insert_submission(self, submission)
    }

    fn insert_signatures(&mut self, signatures: &[EmployeeSignature]) -> EngineResult<usize> {
        Tables::insert_signatures(self, signatures)
    }

    fn delete_signatures(&mut self, submission_id: &str) -> EngineResult<usize> {
        Ok(Tables::delete_signatures(self, submission_id))
    }

    fn transition_batch_shifts(
        &mut self,
        sheet: &str,
        month: ReportingMonth,
        from: ShiftStatus,
        to: ShiftStatus,
    ) -> EngineResult<usize> {
        Ok(Tables::transition_batch_shifts(self, sheet, month, from, to))
    }

    fn apply_transition(
        &mut self,
        submission_id: &str,
        transition: &SubmissionTransition,
    ) -> EngineResult<usize> {
        Ok(Tables::apply_transition(self, submission_id, transition))
    }
}

/// Thread-safe [`TimesheetStore`] kept entirely in memory.
///
/// # Example
///
/// ```
/// use timesheet_engine::store::{InMemoryStore, ShiftRepository};
///
/// let store = InMemoryStore::new();
/// assert!(store.get_shift("shift_001").unwrap().is_none());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> EngineResult<MutexGuard<'_, Tables>> {
        self.tables.lock().map_err(|_| EngineError::Storage {
            message: "in-memory store lock poisoned".to_string(),
        })
    }
}

impl ShiftRepository for InMemoryStore {
    fn get_shift(&self, id: &str) -> EngineResult<Option<ShiftEntry>> {
        Ok(self.lock()?.shifts.get(id).cloned())
    }

    fn shifts_for_employee(
        &self,
        employee_id: &str,
        month: ReportingMonth,
    ) -> EngineResult<Vec<ShiftEntry>> {
        Ok(self
            .lock()?
            .collect_shifts(|shift| shift.employee_id == employee_id && shift.in_month(month)))
    }

    fn shifts_in_month(&self, month: ReportingMonth) -> EngineResult<Vec<ShiftEntry>> {
        Ok(self.lock()?.collect_shifts(|shift| shift.in_month(month)))
    }

    fn shifts_in_batch(
        &self,
        sheet: &str,
        month: ReportingMonth,
    ) -> EngineResult<Vec<ShiftEntry>> {
        Ok(self
            .lock()?
            .collect_shifts(|shift| shift.sheet == sheet && shift.in_month(month)))
    }

    fn insert_shift(&self, shift: &ShiftEntry) -> EngineResult<()> {
        self.lock()?.insert_shift(shift)
    }

    fn update_shift(&self, shift: &ShiftEntry) -> EngineResult<()> {
        self.lock()?.update_shift(shift)
    }

    fn delete_shift(&self, id: &str) -> EngineResult<usize> {
        Ok(usize::from(self.lock()?.shifts.remove(id).is_some()))
    }
}

impl EmployeeRepository for InMemoryStore {
    fn get_employee(&self, id: &str) -> EngineResult<Option<Employee>> {
        Ok(self.lock()?.employees.get(id).cloned())
    }

    fn upsert_employee(&self, employee: &Employee) -> EngineResult<()> {
        self.lock()?
            .employees
            .insert(employee.id.clone(), employee.clone());
        Ok(())
    }
}

impl SubmissionRepository for InMemoryStore {
    fn get_submission(&self, id: &str) -> EngineResult<Option<TeamSubmission>> {
        Ok(self.lock()?.submissions.get(id).cloned())
    }

    fn find_by_token(&self, token: &str) -> EngineResult<Option<TeamSubmission>> {
        Ok(self
            .lock()?
            .submissions
            .values()
            .find(|submission| submission.token == token)
            .cloned())
    }

    fn find_for_batch(
        &self,
        sheet: &str,
        month: ReportingMonth,
    ) -> EngineResult<Option<TeamSubmission>> {
        Ok(self.lock()?.find_for_batch(sheet, month))
    }

    fn signatures(&self, submission_id: &str) -> EngineResult<Vec<EmployeeSignature>> {
        Ok(self.lock()?.signatures(submission_id))
    }

    fn sign_if_unsigned(
        &self,
        submission_id: &str,
        employee_id: &str,
        signature: &SignatureValue,
        signed_at: DateTime<Utc>,
        ip_address: &str,
    ) -> EngineResult<usize> {
        let mut tables = self.lock()?;
        let collecting = tables
            .submissions
            .get(submission_id)
            .is_some_and(|submission| submission.status == SubmissionStatus::PendingEmployees);
        if !collecting {
            return Ok(0);
        }
        let key = (submission_id.to_string(), employee_id.to_string());
        match tables.signatures.get_mut(&key) {
            Some(slot) if slot.signature.is_none() => {
                slot.signature = Some(signature.clone());
                slot.signed_at = Some(signed_at);
                slot.ip_address = Some(ip_address.to_string());
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    fn count_unsigned(&self, submission_id: &str) -> EngineResult<usize> {
        Ok(self
            .lock()?
            .signatures
            .values()
            .filter(|slot| slot.submission_id == submission_id && !slot.is_signed())
            .count())
    }

    fn apply_transition(
        &self,
        submission_id: &str,
        transition: &SubmissionTransition,
    ) -> EngineResult<usize> {
        Ok(self.lock()?.apply_transition(submission_id, transition))
    }

    fn set_document_ref(&self, submission_id: &str, document_ref: &str) -> EngineResult<()> {
        let mut tables = self.lock()?;
        let submission = tables
            .submissions
            .get_mut(submission_id)
            .ok_or_else(|| EngineError::not_found("submission", submission_id))?;
        submission.document_ref = Some(document_ref.to_string());
        Ok(())
    }
}

impl TimesheetStore for InMemoryStore {
    fn transaction(&self, work: &mut TransactionWork<'_>) -> EngineResult<()> {
        let mut tables = self.lock()?;
        let mut staged = tables.clone();
        work(&mut staged)?;
        *tables = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ManualRelease;
    use crate::store::in_transaction;
    use chrono::{NaiveDate, TimeZone};
    use std::sync::Arc;
    use std::thread;

    fn month() -> ReportingMonth {
        ReportingMonth::new(2026, 1).unwrap()
    }

    fn make_shift(id: &str, employee: &str, day: u32) -> ShiftEntry {
        ShiftEntry {
            id: id.to_string(),
            employee_id: employee.to_string(),
            date: NaiveDate::from_ymd_opt(2026, 1, day).unwrap(),
            planned_start: Some("08:00".to_string()),
            planned_end: Some("16:00".to_string()),
            actual_start: None,
            actual_end: None,
            break_minutes: 0,
            absence: None,
            backup_employee_id: None,
            status: ShiftStatus::Submitted,
            note: None,
            sheet: "team_north".to_string(),
        }
    }

    fn make_submission() -> TeamSubmission {
        let now = Utc.with_ymd_and_hms(2026, 2, 1, 9, 0, 0).unwrap();
        TeamSubmission {
            id: "sub_001".to_string(),
            sheet: "team_north".to_string(),
            month: month(),
            status: SubmissionStatus::PendingEmployees,
            token: "token_a".to_string(),
            token_expires_at: now + chrono::Duration::days(30),
            recipient_signature: None,
            manual_release: None,
            document_ref: None,
            created_at: now,
        }
    }

    fn seeded_store() -> InMemoryStore {
        let store = InMemoryStore::new();
        store.insert_shift(&make_shift("s1", "emp_a", 5)).unwrap();
        store.insert_shift(&make_shift("s2", "emp_b", 5)).unwrap();
        in_transaction(&store, |tx| {
            tx.insert_submission(&make_submission())?;
            tx.insert_signatures(&[
                EmployeeSignature::pending("sub_001", "emp_a"),
                EmployeeSignature::pending("sub_001", "emp_b"),
            ])
        })
        .unwrap();
        store
    }

    fn skipped() -> SignatureValue {
        SignatureValue::Skipped {
            actor: "admin".to_string(),
        }
    }

    #[test]
    fn test_one_shift_per_employee_and_date() {
        let store = InMemoryStore::new();
        store.insert_shift(&make_shift("s1", "emp_a", 5)).unwrap();
        let result = store.insert_shift(&make_shift("s2", "emp_a", 5));
        assert!(matches!(result, Err(EngineError::Conflict { .. })));
        // A different employee on the same date is fine.
        store.insert_shift(&make_shift("s3", "emp_b", 5)).unwrap();
    }

    #[test]
    fn test_deleted_shift_frees_the_date() {
        let store = InMemoryStore::new();
        let mut shift = make_shift("s1", "emp_a", 5);
        shift.status = ShiftStatus::Deleted;
        store.insert_shift(&shift).unwrap();
        store.insert_shift(&make_shift("s2", "emp_a", 5)).unwrap();
    }

    #[test]
    fn test_update_missing_shift_is_not_found() {
        let store = InMemoryStore::new();
        let result = store.update_shift(&make_shift("s1", "emp_a", 5));
        assert!(matches!(result, Err(EngineError::NotFound { .. })));
    }

    #[test]
    fn test_shifts_are_ordered_by_date() {
        let store = InMemoryStore::new();
        store.insert_shift(&make_shift("z", "emp_a", 20)).unwrap();
        store.insert_shift(&make_shift("a", "emp_a", 3)).unwrap();
        let shifts = store.shifts_for_employee("emp_a", month()).unwrap();
        let days: Vec<u32> = shifts.iter().map(|s| chrono::Datelike::day(&s.date)).collect();
        assert_eq!(days, vec![3, 20]);
    }

    #[test]
    fn test_sign_if_unsigned_first_writer_wins() {
        let store = seeded_store();
        let at = Utc::now();
        assert_eq!(
            store
                .sign_if_unsigned("sub_001", "emp_a", &skipped(), at, "10.0.0.1")
                .unwrap(),
            1
        );
        assert_eq!(
            store
                .sign_if_unsigned("sub_001", "emp_a", &skipped(), at, "10.0.0.2")
                .unwrap(),
            0
        );
        assert_eq!(store.count_unsigned("sub_001").unwrap(), 1);
        let signatures = store.signatures("sub_001").unwrap();
        assert_eq!(signatures[0].ip_address.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_concurrent_signers_only_one_wins() {
        let store = Arc::new(seeded_store());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    store
                        .sign_if_unsigned("sub_001", "emp_b", &skipped(), Utc::now(), &i.to_string())
                        .unwrap()
                })
            })
            .collect();
        let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, 1);
    }

    #[test]
    fn test_apply_transition_is_conditional() {
        let store = seeded_store();
        let release = SubmissionTransition::Release {
            manual: Some(ManualRelease {
                released_at: Utc::now(),
                released_by: "admin".to_string(),
                note: "deadline".to_string(),
            }),
        };
        assert_eq!(store.apply_transition("sub_001", &release).unwrap(), 1);
        assert_eq!(store.apply_transition("sub_001", &release).unwrap(), 0);
        assert_eq!(store.apply_transition("missing", &release).unwrap(), 0);
    }

    #[test]
    fn test_auto_release_waits_for_every_slot() {
        let store = seeded_store();
        let release = SubmissionTransition::Release { manual: None };
        store
            .sign_if_unsigned("sub_001", "emp_a", &skipped(), Utc::now(), "admin")
            .unwrap();
        assert_eq!(store.apply_transition("sub_001", &release).unwrap(), 0);

        store
            .sign_if_unsigned("sub_001", "emp_b", &skipped(), Utc::now(), "admin")
            .unwrap();
        assert_eq!(store.apply_transition("sub_001", &release).unwrap(), 1);
    }

    #[test]
    fn test_auto_release_skips_submission_without_slots() {
        let store = seeded_store();
        in_transaction(&store, |tx| tx.delete_signatures("sub_001")).unwrap();
        let release = SubmissionTransition::Release { manual: None };
        assert_eq!(store.apply_transition("sub_001", &release).unwrap(), 0);
        let submission = store.get_submission("sub_001").unwrap().unwrap();
        assert_eq!(submission.status, SubmissionStatus::PendingEmployees);
    }

    #[test]
    fn test_no_signing_once_released() {
        let store = seeded_store();
        let release = SubmissionTransition::Release {
            manual: Some(ManualRelease {
                released_at: Utc::now(),
                released_by: "admin".to_string(),
                note: "deadline".to_string(),
            }),
        };
        store.apply_transition("sub_001", &release).unwrap();
        let filled = store
            .sign_if_unsigned("sub_001", "emp_a", &skipped(), Utc::now(), "admin")
            .unwrap();
        assert_eq!(filled, 0);
        assert_eq!(store.count_unsigned("sub_001").unwrap(), 2);
    }

    #[test]
    fn test_failed_transaction_rolls_back() {
        let store = seeded_store();
        let result: EngineResult<()> = in_transaction(&store, |tx| {
            tx.delete_signatures("sub_001")?;
            tx.transition_batch_shifts(
                "team_north",
                month(),
                ShiftStatus::Submitted,
                ShiftStatus::Confirmed,
            )?;
            Err(EngineError::conflict("abort"))
        });
        assert!(result.is_err());
        assert_eq!(store.signatures("sub_001").unwrap().len(), 2);
        let shift = store.get_shift("s1").unwrap().unwrap();
        assert_eq!(shift.status, ShiftStatus::Submitted);
    }

    #[test]
    fn test_committed_transaction_is_visible() {
        let store = seeded_store();
        let moved = in_transaction(&store, |tx| {
            tx.delete_signatures("sub_001")?;
            tx.transition_batch_shifts(
                "team_north",
                month(),
                ShiftStatus::Submitted,
                ShiftStatus::Confirmed,
            )
        })
        .unwrap();
        assert_eq!(moved, 2);
        assert!(store.signatures("sub_001").unwrap().is_empty());
    }

    #[test]
    fn test_second_submission_for_batch_conflicts() {
        let store = seeded_store();
        let mut other = make_submission();
        other.id = "sub_002".to_string();
        let result = in_transaction(&store, |tx| tx.insert_submission(&other));
        assert!(matches!(result, Err(EngineError::Conflict { .. })));
    }

    #[test]
    fn test_find_by_token_and_batch() {
        let store = seeded_store();
        assert!(store.find_by_token("token_a").unwrap().is_some());
        assert!(store.find_by_token("token_b").unwrap().is_none());
        assert!(
            store
                .find_for_batch("team_north", month())
                .unwrap()
                .is_some()
        );
    }
}
