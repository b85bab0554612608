//! Error types for the treatment engine.

use crate::domain::foundation::{DomainError, ErrorCode, SessionId};

use super::step::{RoutingSignal, StepId};

/// Shown when a session's context cannot be found.
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired, please start again.";

/// Shown for every internal failure. Never includes internal detail.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Something went wrong on our side. Please try again in a moment.";

/// Treatment engine errors.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum TreatmentError {
    #[error("Input rejected at step {step}: {clarification}")]
    InputRejected { step: StepId, clarification: String },

    #[error("No route from step {step}")]
    RoutingNoMatch { step: StepId },

    #[error("Signal {signal:?} unresolved after {iterations} iterations (last step {step})")]
    SignalResolutionOverflow {
        step: StepId,
        signal: RoutingSignal,
        iterations: usize,
    },

    #[error("Context not found for session {0}")]
    ContextNotFound(SessionId),

    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    #[error("Validation fallback unavailable: {0}")]
    ValidationFallbackUnavailable(String),

    #[error("Step not found: {0}")]
    StepNotFound(StepId),
}

impl TreatmentError {
    pub fn code(&self) -> ErrorCode {
        match self {
            TreatmentError::InputRejected { .. } => ErrorCode::InputRejected,
            TreatmentError::RoutingNoMatch { .. } => ErrorCode::RoutingNoMatch,
            TreatmentError::SignalResolutionOverflow { .. } => ErrorCode::SignalResolutionOverflow,
            TreatmentError::ContextNotFound(_) => ErrorCode::ContextNotFound,
            TreatmentError::PersistenceFailure(_) => ErrorCode::DatabaseError,
            TreatmentError::ValidationFallbackUnavailable(_) => {
                ErrorCode::ValidationFallbackUnavailable
            }
            TreatmentError::StepNotFound(_) => ErrorCode::StepNotFound,
        }
    }

    /// Returns true if the engine recovers from this error with a re-prompt.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TreatmentError::InputRejected { .. }
                | TreatmentError::RoutingNoMatch { .. }
                | TreatmentError::ValidationFallbackUnavailable(_)
                | TreatmentError::PersistenceFailure(_)
        )
    }

    /// The only text a user may ever see for this error.
    pub fn user_message(&self) -> &'static str {
        match self {
            TreatmentError::ContextNotFound(_) => SESSION_EXPIRED_MESSAGE,
            _ => GENERIC_FAILURE_MESSAGE,
        }
    }
}

impl From<TreatmentError> for DomainError {
    fn from(err: TreatmentError) -> Self {
        let code = err.code();
        let error = DomainError::new(code, err.to_string());
        match err {
            TreatmentError::InputRejected { step, .. }
            | TreatmentError::RoutingNoMatch { step }
            | TreatmentError::SignalResolutionOverflow { step, .. }
            | TreatmentError::StepNotFound(step) => error.with_detail("step", step.to_string()),
            TreatmentError::ContextNotFound(session_id) => {
                error.with_detail("session_id", session_id.to_string())
            }
            _ => error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_not_found_tells_user_to_restart() {
        let err = TreatmentError::ContextNotFound(SessionId::new());
        assert_eq!(err.user_message(), SESSION_EXPIRED_MESSAGE);
        assert!(!err.is_recoverable());
    }

    #[test]
    fn overflow_is_fatal_and_generic() {
        let err = TreatmentError::SignalResolutionOverflow {
            step: StepId::from_static("modality_entry"),
            signal: RoutingSignal::EnterModality,
            iterations: 5,
        };
        assert!(!err.is_recoverable());
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
        assert!(!err.user_message().contains("SIGNAL"));
        assert_eq!(err.code(), ErrorCode::SignalResolutionOverflow);
    }

    #[test]
    fn routing_errors_are_recoverable() {
        let err = TreatmentError::RoutingNoMatch {
            step: StepId::from_static("method_selection"),
        };
        assert!(err.is_recoverable());
    }

    #[test]
    fn converts_to_domain_error_with_step_detail() {
        let err = TreatmentError::StepNotFound(StepId::from_static("missing"));
        let domain: DomainError = err.into();
        assert_eq!(domain.code, ErrorCode::StepNotFound);
        assert_eq!(domain.details.get("step").map(String::as_str), Some("missing"));
    }
}
