//! Response types for the timesheet engine API.
//!
//! This module defines the response bodies and the mapping from
//! [`EngineError`] to HTTP errors.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::{MonthlyAggregate, PayEstimate, ReportingMonth};

/// Response body for `POST /aggregate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateResponse {
    /// The aggregated employee.
    pub employee_id: String,
    /// The reporting month.
    pub month: ReportingMonth,
    /// Hour totals.
    pub aggregate: MonthlyAggregate,
    /// Gross pay estimate from the totals.
    pub pay_estimate: PayEstimate,
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 response for a request body that could not be read.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(self.error),
        )
            .into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        let (status, error) = match error {
            EngineError::InvalidTime { value, .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "INVALID_TIME",
                    message,
                    format!("'{value}' is not a valid HH:MM wall-clock time"),
                ),
            ),
            EngineError::Validation { field, .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::with_details("VALIDATION_ERROR", message, field),
            ),
            EngineError::NotFound { .. } => {
                (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", message))
            }
            EngineError::Conflict { .. } => (
                StatusCode::CONFLICT,
                ApiError::with_details(
                    "CONFLICT",
                    message,
                    "Another user already performed this action",
                ),
            ),
            EngineError::InvalidState { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::new("INVALID_STATE", message),
            ),
            EngineError::TokenExpired { .. } => (
                StatusCode::GONE,
                ApiError::with_details(
                    "TOKEN_EXPIRED",
                    message,
                    "Ask an administrator for a new signing link",
                ),
            ),
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            ),
            EngineError::Storage { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("STORAGE_ERROR", "Storage failure", message),
            ),
            EngineError::DocumentGeneration { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("DOCUMENT_ERROR", "Document generation failed", message),
            ),
        };
        ApiErrorResponse { status, error }
    }
}
