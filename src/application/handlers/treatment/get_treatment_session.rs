//! GetTreatmentSessionHandler - where a session stands right now.

use std::sync::Arc;

use crate::domain::foundation::{SessionId, SessionStatus, Timestamp};
use crate::domain::treatment::{StepId, TreatmentPhase};

use super::{ProcessInputError, SessionCache};

#[derive(Debug, Clone)]
pub struct GetTreatmentSessionQuery {
    pub session_id: SessionId,
}

/// Read-only summary of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreatmentSessionView {
    pub session_id: SessionId,
    pub status: SessionStatus,
    pub turn_count: u32,
    pub current_step: StepId,
    pub current_phase: TreatmentPhase,
    pub problem_statement: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Time from session start to its latest turn.
    pub active_ms: u64,
}

pub struct GetTreatmentSessionHandler {
    sessions: Arc<SessionCache>,
}

impl GetTreatmentSessionHandler {
    pub fn new(sessions: Arc<SessionCache>) -> Self {
        Self { sessions }
    }

    pub async fn handle(
        &self,
        query: GetTreatmentSessionQuery,
    ) -> Result<TreatmentSessionView, ProcessInputError> {
        let ctx = self.sessions.context(&query.session_id).await?;
        let session = self.sessions.session(&ctx).await?;

        Ok(TreatmentSessionView {
            session_id: query.session_id,
            status: session.status(),
            turn_count: session.turn_count(),
            current_step: ctx.current_step().clone(),
            current_phase: ctx.current_phase(),
            problem_statement: ctx.problem_statement().map(str::to_string),
            created_at: *session.created_at(),
            updated_at: *ctx.updated_at(),
            active_ms: ctx.updated_at().millis_since(session.created_at()),
        })
    }
}
