//! Timesheet engine for care-assistant shift tracking.
//!
//! This crate turns shift records into payroll-relevant hour totals
//! (regular, night, Sunday and holiday premiums, backup coverage, sick and
//! vacation accounting) and drives the monthly signature workflow that
//! turns a sheet's shifts into a countersigned document.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod models;
pub mod schedule;
pub mod store;
pub mod submission;
