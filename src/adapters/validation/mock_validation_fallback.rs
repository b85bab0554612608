//! Mock Validation Fallback for testing.
//!
//! Returns queued verdicts or errors in order and records every call.
//! With an empty queue it behaves like an unavailable service.
//!
//! # Example
//!
//! ```ignore
//! let fallback = MockValidationFallback::new()
//!     .with_verdict(FallbackVerdict::accept("2"));
//!
//! let verdict = fallback.validate("the second one", &step).await?;
//! assert_eq!(verdict.interpreted_as.as_deref(), Some("2"));
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::ports::{FallbackVerdict, StepPromptContext, ValidationFallback, ValidationFallbackError};

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockFallbackResponse {
    Verdict(FallbackVerdict),
    Unavailable(String),
}

/// Mock validation fallback.
#[derive(Debug, Clone, Default)]
pub struct MockValidationFallback {
    responses: Arc<Mutex<VecDeque<MockFallbackResponse>>>,
    calls: Arc<Mutex<Vec<(String, StepPromptContext)>>>,
}

impl MockValidationFallback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a verdict.
    pub fn with_verdict(self, verdict: FallbackVerdict) -> Self {
        self.push(MockFallbackResponse::Verdict(verdict))
    }

    /// Queues a failure.
    pub fn with_unavailable(self, message: impl Into<String>) -> Self {
        self.push(MockFallbackResponse::Unavailable(message.into()))
    }

    fn push(self, response: MockFallbackResponse) -> Self {
        if let Ok(mut responses) = self.responses.try_lock() {
            responses.push_back(response);
        }
        self
    }

    /// Texts the fallback was asked about, in order.
    pub async fn asked(&self) -> Vec<String> {
        self.calls
            .lock()
            .await
            .iter()
            .map(|(text, _)| text.clone())
            .collect()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl ValidationFallback for MockValidationFallback {
    async fn validate(
        &self,
        text: &str,
        step: &StepPromptContext,
    ) -> Result<FallbackVerdict, ValidationFallbackError> {
        self.calls.lock().await.push((text.to_string(), step.clone()));

        match self.responses.lock().await.pop_front() {
            Some(MockFallbackResponse::Verdict(verdict)) => Ok(verdict),
            Some(MockFallbackResponse::Unavailable(message)) => {
                Err(ValidationFallbackError::RequestFailed(message))
            }
            None => Err(ValidationFallbackError::NotConfigured),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::treatment::{ExpectedAnswer, StepId};

    fn step() -> StepPromptContext {
        StepPromptContext {
            step_id: StepId::from_static("work_type_confirmation"),
            expected: ExpectedAnswer::YesNo,
            choices: vec!["yes".into(), "no".into()],
            problem_statement: None,
        }
    }

    #[tokio::test]
    async fn returns_queued_responses_in_order() {
        let fallback = MockValidationFallback::new()
            .with_verdict(FallbackVerdict::accept("yes"))
            .with_unavailable("down");

        let first = fallback.validate("sure thing", &step()).await.unwrap();
        assert_eq!(first.interpreted_as.as_deref(), Some("yes"));
        assert!(fallback.validate("hmm", &step()).await.is_err());
        assert!(matches!(
            fallback.validate("hmm", &step()).await,
            Err(ValidationFallbackError::NotConfigured)
        ));

        assert_eq!(fallback.asked().await, vec!["sure thing", "hmm", "hmm"]);
    }
}
