//! ProcessInputHandler - one user turn, end to end.
//!
//! 1. Serialize on the session's turn gate
//! 2. Load the context (cache, then store)
//! 3. Record and validate the input at the current step
//! 4. Route, resolve signals, render
//! 5. Update the cache and persist in the background; a finished session
//!    leaves the cache once its writes land

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::domain::foundation::SessionId;
use crate::domain::treatment::{
    Choice, ChoiceOption, EngineOutput, PreparedTurn, StepId, TreatmentContext, TreatmentEngine,
    TreatmentError, ValidationOutcome, REPROMPT_PREFIX,
};
use crate::ports::{InteractionRecord, StepPromptContext, ValidationFallback};

use super::{ProcessInputError, SessionCache, TurnPersister};

/// Command to submit one piece of user input.
#[derive(Debug, Clone)]
pub struct ProcessInputCommand {
    pub session_id: SessionId,
    pub raw_input: String,
}

/// What the UI shows after a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnResponse {
    pub display_text: String,
    pub next_step_id: StepId,
    pub is_complete: bool,
    pub available_choices: Vec<ChoiceOption>,
}

impl From<EngineOutput> for TurnResponse {
    fn from(output: EngineOutput) -> Self {
        Self {
            display_text: output.display_text,
            next_step_id: output.step,
            is_complete: output.is_complete,
            available_choices: output.available_choices.to_vec(),
        }
    }
}

/// Handler for user turns.
pub struct ProcessInputHandler {
    engine: TreatmentEngine<'static>,
    sessions: Arc<SessionCache>,
    persister: Arc<TurnPersister>,
    fallback: Option<Arc<dyn ValidationFallback>>,
}

impl ProcessInputHandler {
    pub fn new(
        engine: TreatmentEngine<'static>,
        sessions: Arc<SessionCache>,
        persister: Arc<TurnPersister>,
    ) -> Self {
        Self {
            engine,
            sessions,
            persister,
            fallback: None,
        }
    }

    /// Consult `fallback` for input the scripted rules are unsure about.
    pub fn with_fallback(mut self, fallback: Arc<dyn ValidationFallback>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub async fn handle(&self, cmd: ProcessInputCommand) -> Result<TurnResponse, ProcessInputError> {
        let started = Instant::now();
        let gate = self.sessions.gate(&cmd.session_id).await;
        let _turn = gate.lock().await;

        let mut ctx = self.sessions.context(&cmd.session_id).await?;
        let mut session = self.sessions.session(&ctx).await?;
        let answered_at = ctx.current_step().clone();

        let output = match self.run_turn(&mut ctx, &cmd.raw_input).await {
            Ok(Some(output)) => output,
            Ok(None) => {
                debug!(session_id = %cmd.session_id, "Turn on a finished session");
                return Ok(self.engine.render_current(&mut ctx)?.into());
            }
            Err(e) => {
                error!(
                    session_id = %cmd.session_id,
                    step = %answered_at,
                    error = %e,
                    "Turn failed"
                );
                return Err(e.into());
            }
        };

        if let Err(e) = session.record_turn() {
            warn!(session_id = %cmd.session_id, error = %e, "Turn on a closed session record");
        }
        if output.is_complete && !session.is_complete() {
            if let Err(e) = session.complete() {
                warn!(session_id = %cmd.session_id, error = %e, "Could not complete session record");
            }
        }

        self.sessions.update(&ctx, &session).await;

        let timing_ms = started.elapsed().as_millis() as u64;
        let record = InteractionRecord::new(
            cmd.session_id,
            answered_at.clone(),
            cmd.raw_input.as_str(),
            output.display_text.as_str(),
            timing_ms,
        );
        if output.is_complete {
            self.persister
                .spawn_final(ctx, session, Some(record), Arc::clone(&self.sessions))
                .await;
        } else {
            self.persister.spawn(ctx, session, Some(record)).await;
        }

        info!(
            session_id = %cmd.session_id,
            from = %answered_at,
            to = %output.step,
            reprompted = output.reprompted,
            timing_ms,
            "Turn processed"
        );

        Ok(output.into())
    }

    /// Waits for background persistence. For shutdown and tests.
    pub async fn flush(&self) {
        self.persister.flush().await;
    }

    /// Runs the engine over one input. `None` means the session already ended.
    async fn run_turn(
        &self,
        ctx: &mut TreatmentContext,
        raw: &str,
    ) -> Result<Option<EngineOutput>, TreatmentError> {
        let (choice, outcome) = match self.engine.prepare_turn(ctx, raw)? {
            PreparedTurn::SessionFinished => return Ok(None),
            PreparedTurn::Ready { choice, outcome } => (choice, outcome),
        };

        let output = match outcome {
            ValidationOutcome::Accepted => self.engine.advance(ctx, raw, choice)?,
            ValidationOutcome::Rejected { clarification } => {
                self.engine.reject(ctx, &clarification)?
            }
            ValidationOutcome::Uncertain => self.consult_fallback(ctx, raw).await?,
        };
        Ok(Some(output))
    }

    async fn consult_fallback(
        &self,
        ctx: &mut TreatmentContext,
        raw: &str,
    ) -> Result<EngineOutput, TreatmentError> {
        let Some(fallback) = &self.fallback else {
            return self.engine.reject(ctx, REPROMPT_PREFIX);
        };

        let step = self.engine.registry().get_step(ctx.current_step())?;
        let prompt = StepPromptContext {
            step_id: step.id.clone(),
            expected: step.expected,
            choices: step.choices.iter().map(|c| c.value.to_string()).collect(),
            problem_statement: ctx.problem_statement().map(str::to_string),
        };

        match fallback.validate(raw, &prompt).await {
            Ok(verdict) if verdict.accepted => {
                let effective = verdict.interpreted_as.unwrap_or_else(|| raw.to_string());
                debug!(
                    session_id = %ctx.session_id(),
                    step = %prompt.step_id,
                    interpreted_as = %effective,
                    "Fallback accepted input"
                );
                let choice = Choice::normalize(&effective);
                self.engine.advance(ctx, &effective, choice)
            }
            Ok(verdict) => {
                let clarification = verdict
                    .clarification
                    .unwrap_or_else(|| REPROMPT_PREFIX.to_string());
                self.engine.reject(ctx, &clarification)
            }
            Err(e) => {
                let err = TreatmentError::ValidationFallbackUnavailable(e.to_string());
                warn!(session_id = %ctx.session_id(), error = %err, "Degrading to scripted rules");
                self.engine.reject(ctx, REPROMPT_PREFIX)
            }
        }
    }
}
