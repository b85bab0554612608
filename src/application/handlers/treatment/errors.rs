//! Errors surfaced by the treatment handlers.

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::treatment::{TreatmentError, GENERIC_FAILURE_MESSAGE};
use crate::ports::StoreError;

/// A turn that could not be answered with dialogue text.
///
/// Re-prompts are not errors; by the time one of these is returned the
/// turn produced nothing the user should see except `user_message()`.
#[derive(Debug, thiserror::Error)]
pub enum ProcessInputError {
    #[error(transparent)]
    Treatment(#[from] TreatmentError),

    #[error("Failed to load session state: {0}")]
    Store(#[from] StoreError),
}

impl ProcessInputError {
    /// True when the session is unknown (expired or never started).
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProcessInputError::Treatment(TreatmentError::ContextNotFound(_)))
    }

    /// The only text a user may see for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            ProcessInputError::Treatment(err) => err.user_message(),
            ProcessInputError::Store(_) => GENERIC_FAILURE_MESSAGE,
        }
    }
}

impl From<ProcessInputError> for DomainError {
    fn from(err: ProcessInputError) -> Self {
        match err {
            ProcessInputError::Treatment(err) => err.into(),
            ProcessInputError::Store(err) => DomainError::new(ErrorCode::DatabaseError, err.to_string()),
        }
    }
}
