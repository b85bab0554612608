//! Validation fallback port - a second opinion on input the scripted
//! rules could not classify.
//!
//! Only `Uncertain` input ever reaches this port. When it is unavailable
//! the orchestrator degrades to the stricter scripted behavior and
//! re-prompts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::treatment::{ExpectedAnswer, StepId};

/// Errors that can occur when asking the fallback
#[derive(Debug, thiserror::Error)]
pub enum ValidationFallbackError {
    #[error("Validation fallback is not configured")]
    NotConfigured,

    #[error("Validation fallback timed out")]
    Timeout,

    #[error("Validation fallback request failed: {0}")]
    RequestFailed(String),

    #[error("Validation fallback returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// What the fallback needs to know about the step being answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepPromptContext {
    pub step_id: StepId,
    pub expected: ExpectedAnswer,
    /// Values the UI offered, if any.
    pub choices: Vec<String>,
    pub problem_statement: Option<String>,
}

/// The fallback's judgment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackVerdict {
    pub accepted: bool,
    /// Canonical form of the input (e.g. "yes" or "2"), routed in place of
    /// the raw text when present.
    #[serde(default)]
    pub interpreted_as: Option<String>,
    #[serde(default)]
    pub clarification: Option<String>,
}

impl FallbackVerdict {
    pub fn accept(interpreted_as: impl Into<String>) -> Self {
        Self {
            accepted: true,
            interpreted_as: Some(interpreted_as.into()),
            clarification: None,
        }
    }

    pub fn reject(clarification: impl Into<String>) -> Self {
        Self {
            accepted: false,
            interpreted_as: None,
            clarification: Some(clarification.into()),
        }
    }
}

/// Port for the optional AI-assisted validation.
#[async_trait]
pub trait ValidationFallback: Send + Sync {
    async fn validate(
        &self,
        text: &str,
        step: &StepPromptContext,
    ) -> Result<FallbackVerdict, ValidationFallbackError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_fallback_is_object_safe() {
        fn _accepts_dyn(_fallback: &dyn ValidationFallback) {}
    }

    #[test]
    fn verdict_tolerates_missing_optional_fields() {
        let verdict: FallbackVerdict = serde_json::from_str(r#"{"accepted":true}"#).unwrap();
        assert!(verdict.accepted);
        assert!(verdict.interpreted_as.is_none());
        assert!(verdict.clarification.is_none());
    }
}
