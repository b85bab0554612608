//! HTTP handlers for treatment endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::application::handlers::{
    GetTreatmentSessionHandler, GetTreatmentSessionQuery, ProcessInputCommand,
    ProcessInputError, ProcessInputHandler, StartTreatmentCommand, StartTreatmentHandler,
};
use crate::domain::foundation::{DomainError, SessionId, UserId};

use super::dto::{
    ErrorResponse, SessionStatusResponse, StartSessionRequest, SubmitTurnRequest,
    TurnResponseBody,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct TreatmentHandlers {
    start_handler: Arc<StartTreatmentHandler>,
    process_handler: Arc<ProcessInputHandler>,
    get_handler: Arc<GetTreatmentSessionHandler>,
}

impl TreatmentHandlers {
    pub fn new(
        start_handler: Arc<StartTreatmentHandler>,
        process_handler: Arc<ProcessInputHandler>,
        get_handler: Arc<GetTreatmentSessionHandler>,
    ) -> Self {
        Self {
            start_handler,
            process_handler,
            get_handler,
        }
    }

    /// The turn handler, for flushing on shutdown.
    pub fn process_handler(&self) -> &Arc<ProcessInputHandler> {
        &self.process_handler
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/treatment/sessions - Start a session
pub async fn start_session(
    State(handlers): State<TreatmentHandlers>,
    Json(req): Json<StartSessionRequest>,
) -> Response {
    let user_id = match UserId::new(req.user_id) {
        Ok(id) => id,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request(e.to_string())),
            )
                .into_response()
        }
    };

    match handlers
        .start_handler
        .handle(StartTreatmentCommand { user_id })
        .await
    {
        Ok(result) => (
            StatusCode::CREATED,
            Json(TurnResponseBody::new(result.session_id, result.response)),
        )
            .into_response(),
        Err(e) => handle_treatment_error(e),
    }
}

/// POST /api/treatment/sessions/:id/turns - Submit one piece of input
pub async fn submit_turn(
    State(handlers): State<TreatmentHandlers>,
    Path(session_id): Path<String>,
    Json(req): Json<SubmitTurnRequest>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let cmd = ProcessInputCommand {
        session_id,
        raw_input: req.input,
    };

    match handlers.process_handler.handle(cmd).await {
        Ok(turn) => (StatusCode::OK, Json(TurnResponseBody::new(session_id, turn))).into_response(),
        Err(e) => handle_treatment_error(e),
    }
}

/// GET /api/treatment/sessions/:id - Session status
pub async fn get_session(
    State(handlers): State<TreatmentHandlers>,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers
        .get_handler
        .handle(GetTreatmentSessionQuery { session_id })
        .await
    {
        Ok(view) => (StatusCode::OK, Json(SessionStatusResponse::from(view))).into_response(),
        Err(e) => handle_treatment_error(e),
    }
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

fn parse_session_id(raw: &str) -> Result<SessionId, Response> {
    raw.parse::<SessionId>().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Invalid session ID")),
        )
            .into_response()
    })
}

fn handle_treatment_error(error: ProcessInputError) -> Response {
    let message = error.user_message();
    let status = if error.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    let domain = DomainError::from(error);

    if status.is_server_error() {
        error!(
            code = %domain.code,
            details = ?domain.details,
            "Treatment request failed: {}",
            domain.message
        );
    }
    (status, Json(ErrorResponse::for_error(&domain, message))).into_response()
}
