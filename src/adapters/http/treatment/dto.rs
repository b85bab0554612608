//! HTTP DTOs for treatment endpoints.
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.

use serde::{Deserialize, Serialize};

use crate::application::handlers::{TreatmentSessionView, TurnResponse};
use crate::domain::foundation::{DomainError, SessionId, SessionStatus};
use crate::domain::treatment::ChoiceOption;

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Request to start a treatment session.
#[derive(Debug, Clone, Deserialize)]
pub struct StartSessionRequest {
    pub user_id: String,
}

/// One piece of user input. Voice front-ends send their transcript here.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitTurnRequest {
    pub input: String,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceResponse {
    pub value: String,
    pub label: String,
}

impl From<&ChoiceOption> for ChoiceResponse {
    fn from(option: &ChoiceOption) -> Self {
        Self {
            value: option.value.to_string(),
            label: option.label.to_string(),
        }
    }
}

/// What to show after a turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnResponseBody {
    pub session_id: String,
    pub display_text: String,
    pub next_step_id: String,
    pub is_complete: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub available_choices: Vec<ChoiceResponse>,
}

impl TurnResponseBody {
    pub fn new(session_id: SessionId, turn: TurnResponse) -> Self {
        Self {
            session_id: session_id.to_string(),
            display_text: turn.display_text,
            next_step_id: turn.next_step_id.to_string(),
            is_complete: turn.is_complete,
            available_choices: turn.available_choices.iter().map(ChoiceResponse::from).collect(),
        }
    }
}

/// Where a session stands.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatusResponse {
    pub session_id: String,
    pub status: SessionStatus,
    pub turn_count: u32,
    pub current_step: String,
    pub current_phase: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem_statement: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub active_ms: u64,
}

impl From<TreatmentSessionView> for SessionStatusResponse {
    fn from(view: TreatmentSessionView) -> Self {
        Self {
            session_id: view.session_id.to_string(),
            status: view.status,
            turn_count: view.turn_count,
            current_step: view.current_step.to_string(),
            current_phase: view.current_phase.label().to_string(),
            problem_statement: view.problem_statement,
            created_at: view.created_at.to_rfc3339(),
            updated_at: view.updated_at.to_rfc3339(),
            active_ms: view.active_ms,
        }
    }
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
        }
    }

    /// Body for a failed handler call: the stable code of `error`, and
    /// `message` as the only text the client sees.
    pub fn for_error(error: &DomainError, message: &str) -> Self {
        Self {
            code: error.code.as_str().to_string(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::treatment::{StepId, GENERIC_FAILURE_MESSAGE, YES_NO_OPTIONS};

    #[test]
    fn submit_turn_request_deserializes() {
        let req: SubmitTurnRequest = serde_json::from_str(r#"{"input":"I feel anxious"}"#).unwrap();
        assert_eq!(req.input, "I feel anxious");
    }

    #[test]
    fn turn_body_omits_empty_choices() {
        let session_id = SessionId::new();
        let body = TurnResponseBody::new(
            session_id,
            TurnResponse {
                display_text: "What does it feel like?".into(),
                next_step_id: StepId::from_static("problem_shifting_feel_problem"),
                is_complete: false,
                available_choices: vec![],
            },
        );
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["session_id"], session_id.to_string());
        assert_eq!(json["next_step_id"], "problem_shifting_feel_problem");
        assert!(json.get("available_choices").is_none());
    }

    #[test]
    fn turn_body_lists_choices() {
        let body = TurnResponseBody::new(
            SessionId::new(),
            TurnResponse {
                display_text: "Is that right?".into(),
                next_step_id: StepId::from_static("work_type_confirmation"),
                is_complete: false,
                available_choices: YES_NO_OPTIONS.to_vec(),
            },
        );
        assert_eq!(
            body.available_choices,
            vec![
                ChoiceResponse { value: "yes".into(), label: "Yes".into() },
                ChoiceResponse { value: "no".into(), label: "No".into() },
            ]
        );
    }

    #[test]
    fn error_body_keeps_internal_detail_out() {
        let domain = DomainError::new(ErrorCode::DatabaseError, "connection refused on 10.0.0.3");
        let body = ErrorResponse::for_error(&domain, GENERIC_FAILURE_MESSAGE);
        assert_eq!(body.code, "DATABASE_ERROR");
        assert_eq!(body.message, GENERIC_FAILURE_MESSAGE);
    }
}
