//! Error handling module
//!
//! Provides the unified error taxonomy for the governance engine. Every
//! variant is a caller-correctable validation failure, never process-fatal.

use serde::Serialize;
use thiserror::Error;

/// Engine-wide error type
#[derive(Error, Debug)]
pub enum EngineError {
    /// Referenced draft/batch/source does not exist or is not visible to the firm
    #[error("Not found: {0}")]
    NotFound(String),

    /// Precondition on the entity's current status was not met
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    /// Actor role is insufficient for the requested operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A required field is missing or malformed
    #[error("Validation error: {0}")]
    Validation(String),
}

impl EngineError {
    /// Stable machine-readable code for each variant, kept constant for
    /// audit-trail and API compatibility.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::NotFound(_) => "NOT_FOUND",
            EngineError::InvalidStateTransition(_) => "INVALID_STATE_TRANSITION",
            EngineError::Forbidden(_) => "FORBIDDEN",
            EngineError::Validation(_) => "VALIDATION_ERROR",
        }
    }
}

impl From<validator::ValidationErrors> for EngineError {
    fn from(errors: validator::ValidationErrors) -> Self {
        EngineError::Validation(errors.to_string())
    }
}

/// Error response structure for embedding layers that serialize failures
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    pub code: String,
}

impl From<&EngineError> for ErrorResponse {
    fn from(err: &EngineError) -> Self {
        Self {
            success: false,
            message: err.to_string(),
            code: err.code().to_string(),
        }
    }
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Helper function to create a validation error
pub fn validation_error(msg: impl Into<String>) -> EngineError {
    EngineError::Validation(msg.into())
}

/// Helper function to create a not found error
pub fn not_found_error(msg: impl Into<String>) -> EngineError {
    EngineError::NotFound(msg.into())
}

/// Helper function to create an invalid transition error
pub fn invalid_transition_error(msg: impl Into<String>) -> EngineError {
    EngineError::InvalidStateTransition(msg.into())
}
