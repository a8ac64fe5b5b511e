//! Error types for the timesheet engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure the engine can report: malformed input, lost races on
//! conditional updates, missing records, illegal state transitions and
//! failures of the collaborators the engine calls out to.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// The main error type for the timesheet engine.
///
/// Callers can tell "bad input" ([`EngineError::is_validation`]) apart from
/// "someone else already acted" ([`EngineError::is_conflict`]) without
/// matching on individual variants.
///
/// # Example
///
/// ```
/// use timesheet_engine::error::EngineError;
///
/// let error = EngineError::InvalidTime {
///     value: "25:00".to_string(),
///     message: "hour must be between 00 and 23".to_string(),
/// };
/// assert_eq!(error.to_string(), "Invalid time '25:00': hour must be between 00 and 23");
/// assert!(error.is_validation());
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// A wall-clock value could not be parsed as `HH:MM`.
    #[error("Invalid time '{value}': {message}")]
    InvalidTime {
        /// The rejected input.
        value: String,
        /// Why the input was rejected.
        message: String,
    },

    /// A request field was missing or inconsistent.
    #[error("Invalid field '{field}': {message}")]
    Validation {
        /// The offending field.
        field: String,
        /// A description of the problem.
        message: String,
    },

    /// A conditional update affected zero rows because another actor won the race.
    #[error("Conflict: {message}")]
    Conflict {
        /// What was already done by someone else.
        message: String,
    },

    /// A referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of record ("submission", "shift", ...).
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// The action is not permitted from the record's current state.
    #[error("Action '{action}' is not allowed while submission is {status}")]
    InvalidState {
        /// The attempted action.
        action: String,
        /// The state the submission was in.
        status: String,
    },

    /// The public signing token has expired.
    #[error("Signing token expired at {expired_at}")]
    TokenExpired {
        /// When the token stopped being valid.
        expired_at: DateTime<Utc>,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// The storage collaborator reported a failure.
    #[error("Storage error: {message}")]
    Storage {
        /// A description of the storage failure.
        message: String,
    },

    /// The document collaborator failed to render the final document.
    #[error("Document generation failed: {message}")]
    DocumentGeneration {
        /// A description of the failure.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for a [`EngineError::Validation`] error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a [`EngineError::Conflict`] error.
    pub fn conflict(message: impl Into<String>) -> Self {
        EngineError::Conflict {
            message: message.into(),
        }
    }

    /// Shorthand for a [`EngineError::NotFound`] error.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        EngineError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Returns true for input that was rejected before any state mutation.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidTime { .. } | EngineError::Validation { .. }
        )
    }

    /// Returns true when a concurrent actor already performed the action.
    pub fn is_conflict(&self) -> bool {
        matches!(self, EngineError::Conflict { .. })
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_invalid_time_displays_value_and_message() {
        let error = EngineError::InvalidTime {
            value: "8:5".to_string(),
            message: "expected HH:MM".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid time '8:5': expected HH:MM");
    }

    #[test]
    fn test_not_found_displays_entity_and_id() {
        let error = EngineError::not_found("submission", "sub_001");
        assert_eq!(error.to_string(), "submission not found: sub_001");
    }

    #[test]
    fn test_invalid_state_displays_action_and_status() {
        let error = EngineError::InvalidState {
            action: "recipient_sign".to_string(),
            status: "pending_employees".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Action 'recipient_sign' is not allowed while submission is pending_employees"
        );
    }

    #[test]
    fn test_token_expired_displays_timestamp() {
        let expired_at = Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap();
        let error = EngineError::TokenExpired { expired_at };
        assert_eq!(
            error.to_string(),
            "Signing token expired at 2026-02-01 12:00:00 UTC"
        );
    }

    #[test]
    fn test_classification_helpers() {
        assert!(EngineError::validation("note", "must not be empty").is_validation());
        assert!(!EngineError::validation("note", "must not be empty").is_conflict());
        assert!(EngineError::conflict("already signed").is_conflict());
        assert!(!EngineError::not_found("shift", "s1").is_conflict());
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/bad.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/bad.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_conflict() -> EngineResult<()> {
            Err(EngineError::conflict("release already performed"))
        }

        fn propagates_error() -> EngineResult<()> {
            returns_conflict()?;
            Ok(())
        }

        assert!(propagates_error().unwrap_err().is_conflict());
    }
}
