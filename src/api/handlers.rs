//! HTTP request handlers for the timesheet engine API.
//!
//! This module contains the handler functions for all API endpoints.
//! Handlers are thin: they read the request, call the engine and map
//! [`EngineError`](crate::error::EngineError) onto HTTP statuses.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{
    aggregate_month, calculate_overtime, estimate_gross_pay, working_weeks_in_month,
};
use crate::error::EngineResult;
use crate::models::{OvertimeSummary, ReportingMonth};

use super::request::{
    AbsenceRequest, AdminActionRequest, AggregateRequest, DuplicateShiftRequest,
    OpenSubmissionRequest, OvertimeRequest, SignatureRequest,
};
use super::response::{AggregateResponse, ApiError, ApiErrorResponse};
use super::state::AppState;

/// Recorded as the client address when the request carries none.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/aggregate", post(aggregate_handler))
        .route("/overtime", post(overtime_handler))
        .route("/submissions", post(open_submission_handler))
        .route("/sign/:token", get(view_submission_handler))
        .route(
            "/sign/:token/employees/:employee_id",
            post(employee_sign_handler),
        )
        .route("/sign/:token/recipient", post(recipient_sign_handler))
        .route(
            "/admin/submissions/:id/signatures/:employee_id/skip",
            post(skip_signature_handler),
        )
        .route("/admin/submissions/:id/release", post(manual_release_handler))
        .route(
            "/admin/submissions/:id/revert-release",
            post(revert_release_handler),
        )
        .route("/admin/submissions/:id/reset", post(reset_handler))
        .route("/admin/submissions/:id/preview", get(preview_handler))
        .route("/admin/shifts/:id/duplicate", post(duplicate_shift_handler))
        .route("/admin/shifts/:id/absence", post(record_absence_handler))
        .with_state(state)
}

/// Handler for POST /aggregate.
///
/// Aggregates the supplied shifts for one employee and month and adds a
/// gross pay estimate.
async fn aggregate_handler(
    State(state): State<AppState>,
    payload: Result<Json<AggregateRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    info!(correlation_id = %correlation_id, "Processing aggregate request");

    let request = match read_json(&correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let result = aggregate(&state, request);
    respond(&correlation_id, "aggregate", started, StatusCode::OK, result)
}

fn aggregate(state: &AppState, request: AggregateRequest) -> EngineResult<AggregateResponse> {
    let month = ReportingMonth::new(request.year, request.month)?;
    let organization = if request.organization_shifts.is_empty() {
        &request.shifts
    } else {
        &request.organization_shifts
    };
    let aggregate = aggregate_month(
        &request.employee_id,
        month,
        &request.shifts,
        organization,
        &request.premium,
        &state.config().rules(),
    )?;
    let pay_estimate = estimate_gross_pay(&aggregate, &request.premium);
    Ok(AggregateResponse {
        employee_id: request.employee_id,
        month,
        aggregate,
        pay_estimate,
    })
}

/// Handler for POST /overtime.
async fn overtime_handler(payload: Result<Json<OvertimeRequest>, JsonRejection>) -> Response {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    info!(correlation_id = %correlation_id, "Processing overtime request");

    let request = match read_json(&correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let result = ReportingMonth::new(request.year, request.month).map(|month| -> OvertimeSummary {
        let weeks = request
            .working_weeks
            .unwrap_or_else(|| working_weeks_in_month(month));
        calculate_overtime(request.weekly_target_hours, weeks, &request.aggregate)
    });
    respond(&correlation_id, "overtime", started, StatusCode::OK, result)
}

/// Handler for POST /submissions.
async fn open_submission_handler(
    State(state): State<AppState>,
    payload: Result<Json<OpenSubmissionRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();

    let request = match read_json(&correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    info!(correlation_id = %correlation_id, sheet = %request.sheet, "Opening submission");
    let result = ReportingMonth::new(request.year, request.month)
        .and_then(|month| state.submissions().open(&request.sheet, month));
    respond(&correlation_id, "open", started, StatusCode::CREATED, result)
}

/// Handler for GET /sign/:token.
async fn view_submission_handler(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let result = state.submissions().view_by_token(&token);
    respond(&correlation_id, "view", started, StatusCode::OK, result)
}

/// Handler for POST /sign/:token/employees/:employee_id.
async fn employee_sign_handler(
    State(state): State<AppState>,
    Path((token, employee_id)): Path<(String, String)>,
    headers: HeaderMap,
    payload: Result<Json<SignatureRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    info!(correlation_id = %correlation_id, employee_id = %employee_id, "Employee signing");

    let request = match read_json(&correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let result = state.submissions().sign_as_employee(
        &token,
        &employee_id,
        &request.signature,
        &client_ip(&headers),
    );
    respond(&correlation_id, "sign", started, StatusCode::OK, result)
}

/// Handler for POST /sign/:token/recipient.
async fn recipient_sign_handler(
    State(state): State<AppState>,
    Path(token): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<SignatureRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    info!(correlation_id = %correlation_id, "Recipient signing");

    let request = match read_json(&correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let result =
        state
            .submissions()
            .recipient_sign(&token, &request.signature, &client_ip(&headers));
    respond(&correlation_id, "recipient_sign", started, StatusCode::OK, result)
}

/// Handler for POST /admin/submissions/:id/signatures/:employee_id/skip.
async fn skip_signature_handler(
    State(state): State<AppState>,
    Path((id, employee_id)): Path<(String, String)>,
    payload: Result<Json<AdminActionRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();

    let request = match read_json(&correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let result = state
        .submissions()
        .skip_signature(&id, &employee_id, &request.actor);
    respond(&correlation_id, "skip_signature", started, StatusCode::OK, result)
}

/// Handler for POST /admin/submissions/:id/release.
async fn manual_release_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<AdminActionRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();

    let request = match read_json(&correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let note = request.note.unwrap_or_default();
    let result = state
        .submissions()
        .manual_release(&id, &request.actor, &note);
    respond(&correlation_id, "manual_release", started, StatusCode::OK, result)
}

/// Handler for POST /admin/submissions/:id/revert-release.
async fn revert_release_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<AdminActionRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();

    let request = match read_json(&correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let result = state.submissions().revert_release(&id, &request.actor);
    respond(&correlation_id, "revert_release", started, StatusCode::OK, result)
}

/// Handler for POST /admin/submissions/:id/reset.
async fn reset_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<AdminActionRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();

    let request = match read_json(&correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let result = state.submissions().reset(&id, &request.actor);
    respond(&correlation_id, "reset", started, StatusCode::OK, result)
}

/// Handler for GET /admin/submissions/:id/preview.
async fn preview_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let result = state.submissions().preview(&id);
    respond(&correlation_id, "preview", started, StatusCode::OK, result)
}

/// Handler for POST /admin/shifts/:id/duplicate.
async fn duplicate_shift_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<DuplicateShiftRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();

    let request = match read_json(&correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let result = state.shifts().duplicate(&id, request.target_date);
    respond(&correlation_id, "duplicate_shift", started, StatusCode::CREATED, result)
}

/// Handler for POST /admin/shifts/:id/absence.
async fn record_absence_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<AbsenceRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();

    let request = match read_json(&correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let result = state.shifts().record_absence(&id, request.kind);
    respond(&correlation_id, "record_absence", started, StatusCode::OK, result)
}

/// Returns the first `X-Forwarded-For` entry, or [`UNKNOWN_CLIENT`].
pub fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

/// Unwraps a JSON body or builds the 400 response for it.
fn read_json<T>(
    correlation_id: &Uuid,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, Response> {
    let rejection = match payload {
        Ok(Json(request)) => return Ok(request),
        Err(rejection) => rejection,
    };

    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's description of the problem
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::new("VALIDATION_ERROR", body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    Err(ApiErrorResponse::bad_request(error).into_response())
}

/// Turns an engine result into a response and logs the outcome.
fn respond<T: Serialize>(
    correlation_id: &Uuid,
    action: &'static str,
    started: Instant,
    status: StatusCode,
    result: EngineResult<T>,
) -> Response {
    match result {
        Ok(body) => {
            info!(
                correlation_id = %correlation_id,
                action = action,
                duration_us = started.elapsed().as_micros(),
                "Request completed successfully"
            );
            (status, Json(body)).into_response()
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                action = action,
                error = %err,
                "Request failed"
            );
            ApiErrorResponse::from(err).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_ip_takes_first_forwarded_entry() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers), "203.0.113.7");
    }

    #[test]
    fn test_client_ip_defaults_to_unknown() {
        assert_eq!(client_ip(&HeaderMap::new()), UNKNOWN_CLIENT);

        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(" "));
        assert_eq!(client_ip(&headers), UNKNOWN_CLIENT);
    }
}
