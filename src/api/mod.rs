//! HTTP API module for the timesheet engine.
//!
//! This module exposes monthly aggregation, overtime, the submission
//! signature workflow and shift scheduling as JSON endpoints.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::{UNKNOWN_CLIENT, client_ip, create_router};
pub use request::{
    AbsenceRequest, AdminActionRequest, AggregateRequest, DuplicateShiftRequest,
    OpenSubmissionRequest, OvertimeRequest, SignatureRequest,
};
pub use response::{AggregateResponse, ApiError, ApiErrorResponse};
pub use state::AppState;
