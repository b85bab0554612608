//! StartTreatmentHandler - opens a new treatment session.

use std::sync::Arc;

use tracing::info;

use crate::domain::foundation::{SessionId, UserId};
use crate::domain::session::TreatmentSession;
use crate::domain::treatment::steps::ids;
use crate::domain::treatment::{StepId, TreatmentContext, TreatmentEngine, TreatmentPhase};

use super::{ProcessInputError, SessionCache, TurnPersister, TurnResponse};

/// Command to start a session.
#[derive(Debug, Clone)]
pub struct StartTreatmentCommand {
    pub user_id: UserId,
}

/// Result of starting a session: its id and the first thing to show.
#[derive(Debug, Clone)]
pub struct StartTreatmentResult {
    pub session_id: SessionId,
    pub response: TurnResponse,
}

/// Handler for starting sessions.
pub struct StartTreatmentHandler {
    engine: TreatmentEngine<'static>,
    sessions: Arc<SessionCache>,
    persister: Arc<TurnPersister>,
}

impl StartTreatmentHandler {
    pub fn new(
        engine: TreatmentEngine<'static>,
        sessions: Arc<SessionCache>,
        persister: Arc<TurnPersister>,
    ) -> Self {
        Self {
            engine,
            sessions,
            persister,
        }
    }

    pub async fn handle(
        &self,
        cmd: StartTreatmentCommand,
    ) -> Result<StartTreatmentResult, ProcessInputError> {
        let session_id = SessionId::new();
        let session = TreatmentSession::new(session_id, cmd.user_id.clone());
        let mut ctx = TreatmentContext::new(
            session_id,
            cmd.user_id,
            StepId::from_static(ids::INTRODUCTION),
            TreatmentPhase::Introduction,
        );

        let output = self.engine.begin(&mut ctx)?;

        self.sessions.update(&ctx, &session).await;
        self.persister.spawn(ctx, session, None).await;

        info!(session_id = %session_id, step = %output.step, "Treatment session started");

        Ok(StartTreatmentResult {
            session_id,
            response: output.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryTreatmentStore;
    use crate::application::handlers::treatment::RetryPolicy;
    use crate::ports::TreatmentStore;

    #[tokio::test]
    async fn opens_at_work_type_selection_and_persists() {
        let store = Arc::new(InMemoryTreatmentStore::new());
        let persister = Arc::new(TurnPersister::new(store.clone(), RetryPolicy::default()));
        let handler = StartTreatmentHandler::new(
            TreatmentEngine::default(),
            Arc::new(SessionCache::new(store.clone())),
            persister.clone(),
        );

        let result = handler
            .handle(StartTreatmentCommand {
                user_id: UserId::new("user-1").unwrap(),
            })
            .await
            .unwrap();

        assert_eq!(result.response.next_step_id, ids::WORK_TYPE_SELECTION);
        assert!(result.response.display_text.starts_with("Welcome."));
        assert_eq!(result.response.available_choices.len(), 3);

        persister.flush().await;
        let ctx = store.load_context(&result.session_id).await.unwrap().unwrap();
        assert_eq!(ctx.current_step(), &ids::WORK_TYPE_SELECTION);
        let session = store.load_session(&result.session_id).await.unwrap().unwrap();
        assert_eq!(session.user_id().as_str(), "user-1");
        assert!(store.interactions(&result.session_id).await.unwrap().is_empty());
    }
}
