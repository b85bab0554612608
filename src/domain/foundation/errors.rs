//! Error types shared across the domain.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// A value object could not be built from its input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// The offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::EmptyField { field } | ValidationError::InvalidFormat { field, .. } => {
                field
            }
        }
    }
}

/// Stable, machine-readable failure codes. Serialized in API error bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationFailed,
    InputRejected,
    ContextNotFound,
    StepNotFound,
    InvalidStateTransition,
    SessionComplete,
    RoutingNoMatch,
    SignalResolutionOverflow,
    ValidationFallbackUnavailable,
    DatabaseError,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::InputRejected => "INPUT_REJECTED",
            ErrorCode::ContextNotFound => "CONTEXT_NOT_FOUND",
            ErrorCode::StepNotFound => "STEP_NOT_FOUND",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::SessionComplete => "SESSION_COMPLETE",
            ErrorCode::RoutingNoMatch => "ROUTING_NO_MATCH",
            ErrorCode::SignalResolutionOverflow => "SIGNAL_RESOLUTION_OVERFLOW",
            ErrorCode::ValidationFallbackUnavailable => "VALIDATION_FALLBACK_UNAVAILABLE",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Caused by the caller's input rather than by this service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::ValidationFailed
                | ErrorCode::InputRejected
                | ErrorCode::ContextNotFound
                | ErrorCode::SessionComplete
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure with its code, an internal message and optional context.
///
/// `message` is for logs. What a user sees is decided at the edge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[{code}] {message}")]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: BTreeMap<String, String>,
}

impl DomainError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: BTreeMap::new(),
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.details.insert(key.into(), value.to_string());
        self
    }
}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        let field = err.field().to_string();
        DomainError::new(ErrorCode::ValidationFailed, err.to_string()).with_detail("field", field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_names_its_field() {
        let err = ValidationError::invalid_format("user_id", "too long");
        assert_eq!(err.field(), "user_id");
        assert_eq!(err.to_string(), "Field 'user_id' has invalid format: too long");
    }

    #[test]
    fn domain_error_displays_code_and_message() {
        let err = DomainError::new(ErrorCode::ContextNotFound, "no context for abc");
        assert_eq!(err.to_string(), "[CONTEXT_NOT_FOUND] no context for abc");
    }

    #[test]
    fn validation_error_becomes_client_error_with_field_detail() {
        let err: DomainError = ValidationError::empty_field("user_id").into();
        assert!(err.code.is_client_error());
        assert_eq!(err.details.get("field").map(String::as_str), Some("user_id"));
    }

    #[test]
    fn code_serializes_like_its_display() {
        for code in [ErrorCode::SignalResolutionOverflow, ErrorCode::DatabaseError] {
            assert_eq!(
                serde_json::to_value(code).unwrap(),
                serde_json::Value::String(code.to_string())
            );
        }
        assert!(!ErrorCode::DatabaseError.is_client_error());
    }
}
