//! Shift scheduling and absence handling.
//!
//! [`ShiftService`] creates and duplicates planned shifts and records
//! absences. Recording an absence on a shift with a backup creates a
//! covering entry for the backup, identified by the backup marker in its
//! note. Recording an absence on such a covering entry deletes it instead.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{is_backup_cover, parse_hhmm};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{AbsenceKind, ReportingMonth, ShiftEntry, ShiftStatus};
use crate::store::{TimesheetStore, in_transaction};

/// Input for [`ShiftService::create_shift`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewShift {
    /// The employee working the shift.
    pub employee_id: String,
    /// The date the shift starts on.
    pub date: NaiveDate,
    /// Planned start, `"HH:MM"`.
    #[serde(default)]
    pub planned_start: Option<String>,
    /// Planned end, `"HH:MM"`.
    #[serde(default)]
    pub planned_end: Option<String>,
    /// Unpaid break in minutes.
    #[serde(default)]
    pub break_minutes: u32,
    /// Employee covering the shift if this one is absent.
    #[serde(default)]
    pub backup_employee_id: Option<String>,
    /// Free-text note.
    #[serde(default)]
    pub note: Option<String>,
    /// The sheet the shift is batched under.
    pub sheet: String,
}

/// What recording an absence did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AbsenceOutcome {
    /// The shift was marked absent.
    Recorded {
        /// The updated shift.
        shift: ShiftEntry,
        /// The covering shift created for the backup. `None` when no backup
        /// is assigned or the backup already has a shift that day.
        cover: Option<ShiftEntry>,
    },
    /// The shift was a backup cover and has been deleted instead.
    CoverWithdrawn {
        /// The deleted shift.
        shift_id: String,
    },
}

/// Creates and edits shift entries.
pub struct ShiftService {
    store: Arc<dyn TimesheetStore>,
    config: Arc<EngineConfig>,
}

impl ShiftService {
    /// Creates a new shift service.
    pub fn new(store: Arc<dyn TimesheetStore>, config: Arc<EngineConfig>) -> Self {
        Self { store, config }
    }

    /// Schedules a new planned shift.
    ///
    /// # Errors
    ///
    /// * `InvalidTime` for a malformed `"HH:MM"` value
    /// * `Validation` for a half-filled time pair or a self-backup
    /// * `NotFound` if the employee or backup does not exist
    /// * `Conflict` if the employee already has a shift on that date
    pub fn create_shift(&self, new: NewShift) -> EngineResult<ShiftEntry> {
        validate_time_pair(new.planned_start.as_deref(), new.planned_end.as_deref())?;
        if new.sheet.trim().is_empty() {
            return Err(EngineError::validation("sheet", "must not be empty"));
        }
        self.require_employee(&new.employee_id)?;
        if let Some(backup) = new.backup_employee_id.as_deref() {
            if backup == new.employee_id {
                return Err(EngineError::validation(
                    "backup_employee_id",
                    "an employee cannot be their own backup",
                ));
            }
            self.require_employee(backup)?;
        }

        let shift = ShiftEntry {
            id: Uuid::new_v4().to_string(),
            employee_id: new.employee_id,
            date: new.date,
            planned_start: new.planned_start,
            planned_end: new.planned_end,
            actual_start: None,
            actual_end: None,
            break_minutes: new.break_minutes,
            absence: None,
            backup_employee_id: new.backup_employee_id,
            status: ShiftStatus::Planned,
            note: new.note,
            sheet: new.sheet,
        };
        self.store.insert_shift(&shift)?;
        info!(
            shift_id = %shift.id,
            employee_id = %shift.employee_id,
            date = %shift.date,
            "Shift created"
        );
        Ok(shift)
    }

    /// Copies a shift's plan to another date.
    ///
    /// The copy keeps employee, planned times, break, backup, note and sheet,
    /// and starts out planned.
    ///
    /// # Errors
    ///
    /// * `NotFound` if the source shift does not exist
    /// * `Conflict` if the target is the source date or already occupied
    pub fn duplicate(&self, shift_id: &str, target_date: NaiveDate) -> EngineResult<ShiftEntry> {
        let source = self.load(shift_id)?;
        if source.date == target_date {
            return Err(EngineError::conflict(format!(
                "shift {shift_id} is already on {target_date}"
            )));
        }

        let copy = ShiftEntry {
            id: Uuid::new_v4().to_string(),
            date: target_date,
            actual_start: None,
            actual_end: None,
            absence: None,
            status: ShiftStatus::Planned,
            ..source
        };
        self.store.insert_shift(&copy)?;
        info!(
            source_shift_id = %shift_id,
            shift_id = %copy.id,
            date = %target_date,
            "Shift duplicated"
        );
        Ok(copy)
    }

    /// Records that a shift's employee could not work it.
    ///
    /// For an ordinary shift the absence kind is set and, if a backup is
    /// assigned, a covering shift for the backup is created in the same
    /// unit of work. When the backup already has a shift that day the
    /// absence is still recorded and no cover is created. A shift that is
    /// itself a backup cover is deleted instead, so the backup gets no sick
    /// or vacation record for a shift that was never theirs.
    ///
    /// # Errors
    ///
    /// * `NotFound` if the shift does not exist
    /// * `Conflict` if the absence is already recorded
    /// * `Validation` if the shift is part of a submitted batch
    pub fn record_absence(&self, shift_id: &str, kind: AbsenceKind) -> EngineResult<AbsenceOutcome> {
        let shift = self.load(shift_id)?;
        let marker = self.config.settings().backup_note_marker.as_str();
        let organization = self.store.shifts_in_month(ReportingMonth::of(shift.date))?;

        if is_backup_cover(&shift, &organization, marker) {
            self.withdraw(&shift)?;
            info!(
                shift_id = %shift_id,
                employee_id = %shift.employee_id,
                date = %shift.date,
                "Backup unable to cover, covering shift deleted"
            );
            return Ok(AbsenceOutcome::CoverWithdrawn {
                shift_id: shift.id,
            });
        }

        if shift.is_absence() {
            return Err(EngineError::conflict(format!(
                "shift {shift_id} is already recorded as an absence"
            )));
        }
        ensure_editable(&shift)?;

        let mut absent = shift.clone();
        absent.absence = Some(kind);
        if absent.status == ShiftStatus::Confirmed {
            absent.status = ShiftStatus::Changed;
        }
        let planned_cover = absent
            .backup_employee_id
            .as_deref()
            .map(|backup| self.covering_shift(&absent, backup, marker));

        let cover = in_transaction(self.store.as_ref(), |tx| {
            tx.update_shift(&absent)?;
            let Some(cover) = &planned_cover else {
                return Ok(None);
            };
            match tx.insert_shift(cover) {
                Ok(()) => Ok(Some(cover.clone())),
                // The backup is already on shift that day.
                Err(err) if err.is_conflict() => {
                    warn!(
                        shift_id = %shift_id,
                        backup_employee_id = %cover.employee_id,
                        date = %cover.date,
                        error = %err,
                        "Backup already scheduled, no covering shift created"
                    );
                    Ok(None)
                }
                Err(err) => Err(err),
            }
        })?;

        info!(
            shift_id = %shift_id,
            employee_id = %absent.employee_id,
            kind = ?kind,
            backup_employee_id = ?absent.backup_employee_id,
            covered = cover.is_some(),
            "Absence recorded"
        );
        Ok(AbsenceOutcome::Recorded {
            shift: absent,
            cover,
        })
    }

    /// Deletes a backup's covering shift.
    ///
    /// # Errors
    ///
    /// * `NotFound` if the shift does not exist
    /// * `Validation` if the shift is not a backup cover
    pub fn withdraw_backup(&self, shift_id: &str) -> EngineResult<()> {
        let shift = self.load(shift_id)?;
        let marker = self.config.settings().backup_note_marker.as_str();
        let organization = self.store.shifts_in_month(ReportingMonth::of(shift.date))?;
        if !is_backup_cover(&shift, &organization, marker) {
            return Err(EngineError::validation(
                "shift_id",
                format!("shift {shift_id} is not a backup cover"),
            ));
        }
        self.withdraw(&shift)?;
        info!(shift_id = %shift_id, "Backup cover withdrawn");
        Ok(())
    }

    fn withdraw(&self, shift: &ShiftEntry) -> EngineResult<()> {
        ensure_editable(shift)?;
        if self.store.delete_shift(&shift.id)? == 0 {
            return Err(EngineError::not_found("shift", &shift.id));
        }
        Ok(())
    }

    fn covering_shift(&self, primary: &ShiftEntry, backup: &str, marker: &str) -> ShiftEntry {
        let (start, end) = match primary.effective_times() {
            Some((start, end)) => (Some(start.to_string()), Some(end.to_string())),
            None => (None, None),
        };
        ShiftEntry {
            id: Uuid::new_v4().to_string(),
            employee_id: backup.to_string(),
            date: primary.date,
            planned_start: start,
            planned_end: end,
            actual_start: None,
            actual_end: None,
            break_minutes: primary.break_minutes,
            absence: None,
            backup_employee_id: None,
            status: ShiftStatus::Planned,
            note: Some(format!("{marker} covering {}", primary.employee_id)),
            sheet: primary.sheet.clone(),
        }
    }

    fn load(&self, shift_id: &str) -> EngineResult<ShiftEntry> {
        match self.store.get_shift(shift_id)? {
            Some(shift) if !shift.is_deleted() => Ok(shift),
            _ => Err(EngineError::not_found("shift", shift_id)),
        }
    }

    fn require_employee(&self, employee_id: &str) -> EngineResult<()> {
        match self.store.get_employee(employee_id)? {
            Some(_) => Ok(()),
            None => Err(EngineError::not_found("employee", employee_id)),
        }
    }
}

fn validate_time_pair(start: Option<&str>, end: Option<&str>) -> EngineResult<()> {
    match (start, end) {
        (Some(start), Some(end)) => {
            parse_hhmm(start)?;
            parse_hhmm(end)?;
            Ok(())
        }
        (None, None) => Ok(()),
        _ => Err(EngineError::validation(
            "planned_start",
            "start and end must be given together",
        )),
    }
}

fn ensure_editable(shift: &ShiftEntry) -> EngineResult<()> {
    match shift.status {
        ShiftStatus::Submitted | ShiftStatus::Completed => Err(EngineError::validation(
            "status",
            format!("shift {} is part of a submitted batch", shift.id),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Employee;
    use crate::store::{InMemoryStore, ShiftRepository, EmployeeRepository};
    use rust_decimal::Decimal;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, day).unwrap()
    }

    fn setup() -> (Arc<InMemoryStore>, ShiftService) {
        let store = Arc::new(InMemoryStore::new());
        for id in ["emp_a", "emp_b", "emp_c"] {
            store
                .upsert_employee(&Employee {
                    id: id.to_string(),
                    name: id.to_uppercase(),
                    weekly_target_hours: Decimal::new(30, 0),
                    premium: Default::default(),
                })
                .unwrap();
        }
        let service = ShiftService::new(store.clone(), Arc::new(EngineConfig::default()));
        (store, service)
    }

    fn new_shift(employee: &str, day: u32, backup: Option<&str>) -> NewShift {
        NewShift {
            employee_id: employee.to_string(),
            date: date(day),
            planned_start: Some("08:00".to_string()),
            planned_end: Some("16:00".to_string()),
            break_minutes: 30,
            backup_employee_id: backup.map(str::to_string),
            note: Some("morning round".to_string()),
            sheet: "team_north".to_string(),
        }
    }

    #[test]
    fn test_create_shift_validates_times() {
        let (_, service) = setup();
        let mut input = new_shift("emp_a", 5, None);
        input.planned_end = Some("24:00".to_string());
        assert!(matches!(
            service.create_shift(input),
            Err(EngineError::InvalidTime { .. })
        ));

        let mut input = new_shift("emp_a", 5, None);
        input.planned_end = None;
        assert!(matches!(
            service.create_shift(input),
            Err(EngineError::Validation { .. })
        ));
    }

    #[test]
    fn test_create_shift_rejects_second_shift_same_day() {
        let (_, service) = setup();
        service.create_shift(new_shift("emp_a", 5, None)).unwrap();
        let result = service.create_shift(new_shift("emp_a", 5, None));
        assert!(result.unwrap_err().is_conflict());
    }

    #[test]
    fn test_create_shift_unknown_employee() {
        let (_, service) = setup();
        let result = service.create_shift(new_shift("emp_z", 5, None));
        assert!(matches!(result, Err(EngineError::NotFound { .. })));
    }

    #[test]
    fn test_self_backup_rejected() {
        let (_, service) = setup();
        let result = service.create_shift(new_shift("emp_a", 5, Some("emp_a")));
        assert!(result.unwrap_err().is_validation());
    }

    #[test]
    fn test_duplicate_copies_plan() {
        let (_, service) = setup();
        let source = service
            .create_shift(new_shift("emp_a", 5, Some("emp_b")))
            .unwrap();
        let copy = service.duplicate(&source.id, date(12)).unwrap();
        assert_ne!(copy.id, source.id);
        assert_eq!(copy.date, date(12));
        assert_eq!(copy.employee_id, "emp_a");
        assert_eq!(copy.planned_start.as_deref(), Some("08:00"));
        assert_eq!(copy.planned_end.as_deref(), Some("16:00"));
        assert_eq!(copy.backup_employee_id.as_deref(), Some("emp_b"));
        assert_eq!(copy.note.as_deref(), Some("morning round"));
        assert_eq!(copy.status, ShiftStatus::Planned);
    }

    #[test]
    fn test_duplicate_to_same_or_occupied_date_conflicts() {
        let (_, service) = setup();
        let source = service.create_shift(new_shift("emp_a", 5, None)).unwrap();
        service.create_shift(new_shift("emp_a", 6, None)).unwrap();
        assert!(service.duplicate(&source.id, date(5)).unwrap_err().is_conflict());
        assert!(service.duplicate(&source.id, date(6)).unwrap_err().is_conflict());
    }

    #[test]
    fn test_absence_creates_cover_for_backup() {
        let (store, service) = setup();
        let primary = service
            .create_shift(new_shift("emp_a", 5, Some("emp_b")))
            .unwrap();

        let outcome = service
            .record_absence(&primary.id, AbsenceKind::Sick)
            .unwrap();
        let AbsenceOutcome::Recorded { shift, cover } = outcome else {
            panic!("expected recorded absence");
        };
        assert_eq!(shift.absence, Some(AbsenceKind::Sick));
        let cover = cover.expect("cover shift");
        assert_eq!(cover.employee_id, "emp_b");
        assert_eq!(cover.date, date(5));
        assert_eq!(cover.planned_start.as_deref(), Some("08:00"));
        assert!(cover.has_backup_marker("[backup]"));
        assert!(store.get_shift(&cover.id).unwrap().is_some());
    }

    #[test]
    fn test_absence_without_backup_creates_no_cover() {
        let (_, service) = setup();
        let primary = service.create_shift(new_shift("emp_a", 5, None)).unwrap();
        let outcome = service
            .record_absence(&primary.id, AbsenceKind::Vacation)
            .unwrap();
        assert!(matches!(outcome, AbsenceOutcome::Recorded { cover: None, .. }));
    }

    #[test]
    fn test_absent_backup_cover_is_deleted_not_marked() {
        let (store, service) = setup();
        let primary = service
            .create_shift(new_shift("emp_a", 5, Some("emp_b")))
            .unwrap();
        let AbsenceOutcome::Recorded { cover, .. } = service
            .record_absence(&primary.id, AbsenceKind::Sick)
            .unwrap()
        else {
            panic!("expected recorded absence");
        };
        let cover = cover.unwrap();

        let outcome = service.record_absence(&cover.id, AbsenceKind::Sick).unwrap();
        assert_eq!(
            outcome,
            AbsenceOutcome::CoverWithdrawn {
                shift_id: cover.id.clone()
            }
        );
        assert!(store.get_shift(&cover.id).unwrap().is_none());
        let month = ReportingMonth::new(2026, 1).unwrap();
        assert!(store.shifts_for_employee("emp_b", month).unwrap().is_empty());
    }

    #[test]
    fn test_absence_recorded_when_backup_already_scheduled() {
        let (store, service) = setup();
        let primary = service
            .create_shift(new_shift("emp_a", 5, Some("emp_b")))
            .unwrap();
        let own = service.create_shift(new_shift("emp_b", 5, None)).unwrap();

        let outcome = service
            .record_absence(&primary.id, AbsenceKind::Sick)
            .unwrap();
        let AbsenceOutcome::Recorded { shift, cover } = outcome else {
            panic!("expected recorded absence");
        };
        assert_eq!(shift.absence, Some(AbsenceKind::Sick));
        assert!(cover.is_none());

        let stored = store.get_shift(&primary.id).unwrap().unwrap();
        assert_eq!(stored.absence, Some(AbsenceKind::Sick));
        let month = ReportingMonth::new(2026, 1).unwrap();
        let backup_shifts = store.shifts_for_employee("emp_b", month).unwrap();
        assert_eq!(backup_shifts, vec![own]);
    }

    #[test]
    fn test_unmarked_shift_of_backup_records_absence() {
        let (store, service) = setup();
        let primary = service
            .create_shift(new_shift("emp_a", 5, Some("emp_b")))
            .unwrap();
        let AbsenceOutcome::Recorded { cover, .. } = service
            .record_absence(&primary.id, AbsenceKind::Sick)
            .unwrap()
        else {
            panic!("expected recorded absence");
        };
        service.withdraw_backup(&cover.unwrap().id).unwrap();

        let mut evening = new_shift("emp_b", 5, None);
        evening.planned_start = Some("17:00".to_string());
        evening.planned_end = Some("21:00".to_string());
        let evening = service.create_shift(evening).unwrap();

        let outcome = service
            .record_absence(&evening.id, AbsenceKind::Sick)
            .unwrap();
        assert!(matches!(outcome, AbsenceOutcome::Recorded { cover: None, .. }));
        let stored = store.get_shift(&evening.id).unwrap().unwrap();
        assert_eq!(stored.absence, Some(AbsenceKind::Sick));
    }

    #[test]
    fn test_double_absence_conflicts() {
        let (_, service) = setup();
        let primary = service.create_shift(new_shift("emp_a", 5, None)).unwrap();
        service.record_absence(&primary.id, AbsenceKind::Sick).unwrap();
        let result = service.record_absence(&primary.id, AbsenceKind::Sick);
        assert!(result.unwrap_err().is_conflict());
    }

    #[test]
    fn test_withdraw_requires_cover() {
        let (_, service) = setup();
        let primary = service.create_shift(new_shift("emp_a", 5, None)).unwrap();
        let result = service.withdraw_backup(&primary.id);
        assert!(result.unwrap_err().is_validation());
    }

    #[test]
    fn test_submitted_shift_is_locked() {
        let (store, service) = setup();
        let primary = service.create_shift(new_shift("emp_a", 5, None)).unwrap();
        let mut submitted = primary.clone();
        submitted.status = ShiftStatus::Submitted;
        store.update_shift(&submitted).unwrap();
        let result = service.record_absence(&primary.id, AbsenceKind::Sick);
        assert!(result.unwrap_err().is_validation());
    }
}
