//! Shift scheduling operations.
//!
//! These are the writes that shape what the monthly aggregation later
//! sees: creating and duplicating shifts, recording absences together with
//! the backup's covering shift, and withdrawing a cover that did not happen.

mod service;

pub use service::{AbsenceOutcome, NewShift, ShiftService};
