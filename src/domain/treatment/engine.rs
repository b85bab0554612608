//! Treatment engine - one synchronous dialogue turn.
//!
//! The engine ties the router, signal processor and input fallback resolver
//! together over a caller-owned [`TreatmentContext`]. It performs no I/O;
//! loading, locking and persisting contexts is the orchestrator's job.

use tracing::{info, warn};

use super::choice::Choice;
use super::context::TreatmentContext;
use super::errors::TreatmentError;
use super::phase::TreatmentPhase;
use super::registry::StepRegistry;
use super::router::{RouteDecision, RouteInput, Router};
use super::signal::{RenderedStep, SignalProcessor, DEFAULT_MAX_SIGNAL_ITERATIONS};
use super::step::{ChoiceOption, StepId, ValidationOutcome};
use super::steps::ids;

/// Lead-in for a re-prompt after input the step could not use.
pub const REPROMPT_PREFIX: &str = "Sorry, I didn't quite catch that.";

/// Result of one engine turn. Always displayable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOutput {
    pub display_text: String,
    pub step: StepId,
    pub phase: TreatmentPhase,
    pub is_complete: bool,
    pub available_choices: &'static [ChoiceOption],
    /// True if the session stayed on its step and asked again.
    pub reprompted: bool,
}

/// Input checked against the current step, before routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreparedTurn {
    /// The session already ended; nothing was recorded.
    SessionFinished,
    Ready {
        choice: Choice,
        outcome: ValidationOutcome,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct TreatmentEngine<'r> {
    registry: &'r StepRegistry,
    max_signal_iterations: usize,
}

impl TreatmentEngine<'static> {
    /// Engine over the standard step catalog.
    pub fn standard(max_signal_iterations: usize) -> Self {
        Self::new(StepRegistry::standard(), max_signal_iterations)
    }
}

impl Default for TreatmentEngine<'static> {
    fn default() -> Self {
        Self::standard(DEFAULT_MAX_SIGNAL_ITERATIONS)
    }
}

impl<'r> TreatmentEngine<'r> {
    pub fn new(registry: &'r StepRegistry, max_signal_iterations: usize) -> Self {
        Self {
            registry,
            max_signal_iterations,
        }
    }

    pub fn registry(&self) -> &'r StepRegistry {
        self.registry
    }

    fn processor(&self) -> SignalProcessor<'r> {
        SignalProcessor::new(self.registry, self.max_signal_iterations)
    }

    /// Returns true once the session reached its terminal step.
    pub fn is_finished(ctx: &TreatmentContext) -> bool {
        ctx.current_step() == &ids::SESSION_COMPLETE
    }

    /// Renders the session's opening step, resolving its signals.
    pub fn begin(&self, ctx: &mut TreatmentContext) -> Result<EngineOutput, TreatmentError> {
        let rendered = self.processor().resolve(ctx.current_step().clone(), None, ctx)?;
        Ok(self.settle(ctx, rendered, false))
    }

    /// Records raw input against the current step and validates it.
    pub fn prepare_turn(
        &self,
        ctx: &mut TreatmentContext,
        raw: &str,
    ) -> Result<PreparedTurn, TreatmentError> {
        if Self::is_finished(ctx) {
            return Ok(PreparedTurn::SessionFinished);
        }

        let step = self.registry.get_step(ctx.current_step())?;
        let step_id = step.id.clone();
        let choice = Choice::normalize(raw);
        let outcome = match choice {
            Choice::Exit => ValidationOutcome::Accepted,
            _ => step.validate(raw, &choice),
        };

        ctx.record_response(&step_id, raw);
        Ok(PreparedTurn::Ready { choice, outcome })
    }

    /// Routes accepted input and renders the destination.
    pub fn advance(
        &self,
        ctx: &mut TreatmentContext,
        raw: &str,
        choice: Choice,
    ) -> Result<EngineOutput, TreatmentError> {
        let from = ctx.current_step().clone();
        let router = Router::new(self.registry);
        let decision =
            router.determine_next_step(&from, &RouteInput::User { raw, choice }, ctx)?;

        match decision {
            RouteDecision::Goto(destination) => {
                let rendered = self.processor().resolve(destination, Some(raw), ctx)?;
                Ok(self.settle(ctx, rendered, false))
            }
            RouteDecision::Stay => {
                let err = TreatmentError::RoutingNoMatch { step: from };
                warn!(session_id = %ctx.session_id(), error = %err, "Re-prompting");
                self.reprompt(ctx, REPROMPT_PREFIX)
            }
        }
    }

    /// Stays on the current step and asks again, led by `lead`.
    pub fn reprompt(
        &self,
        ctx: &mut TreatmentContext,
        lead: &str,
    ) -> Result<EngineOutput, TreatmentError> {
        let rendered = self.processor().resolve(ctx.current_step().clone(), None, ctx)?;
        let rendered = RenderedStep {
            text: format!("{lead} {}", rendered.text),
            ..rendered
        };
        Ok(self.settle(ctx, rendered, true))
    }

    /// Renders the current step without advancing. Used for finished sessions.
    pub fn render_current(
        &self,
        ctx: &mut TreatmentContext,
    ) -> Result<EngineOutput, TreatmentError> {
        let rendered = self.processor().resolve(ctx.current_step().clone(), None, ctx)?;
        Ok(self.output(rendered, false))
    }

    /// Runs a whole turn using only the scripted rules.
    ///
    /// Input the rules are unsure about is rejected.
    pub fn process_turn(
        &self,
        ctx: &mut TreatmentContext,
        raw: &str,
    ) -> Result<EngineOutput, TreatmentError> {
        match self.prepare_turn(ctx, raw)? {
            PreparedTurn::SessionFinished => self.render_current(ctx),
            PreparedTurn::Ready { choice, outcome } => match outcome {
                ValidationOutcome::Accepted => self.advance(ctx, raw, choice),
                ValidationOutcome::Rejected { clarification } => {
                    self.reject(ctx, &clarification)
                }
                ValidationOutcome::Uncertain => self.reject(ctx, REPROMPT_PREFIX),
            },
        }
    }

    /// Re-prompts after the validator turned input down.
    pub fn reject(
        &self,
        ctx: &mut TreatmentContext,
        clarification: &str,
    ) -> Result<EngineOutput, TreatmentError> {
        let err = TreatmentError::InputRejected {
            step: ctx.current_step().clone(),
            clarification: clarification.to_string(),
        };
        warn!(session_id = %ctx.session_id(), error = %err, "Re-prompting");
        self.reprompt(ctx, clarification)
    }

    fn settle(
        &self,
        ctx: &mut TreatmentContext,
        rendered: RenderedStep,
        reprompted: bool,
    ) -> EngineOutput {
        ctx.move_to(rendered.step.clone(), rendered.phase);
        ctx.bump_version();

        let output = self.output(rendered, reprompted);
        if output.is_complete {
            info!(session_id = %ctx.session_id(), "Treatment session reached completion");
        }
        output
    }

    fn output(&self, rendered: RenderedStep, reprompted: bool) -> EngineOutput {
        let available_choices = self
            .registry
            .get_step(&rendered.step)
            .map(|step| step.choices)
            .unwrap_or(&[]);
        EngineOutput {
            is_complete: rendered.step == ids::SESSION_COMPLETE,
            display_text: rendered.text,
            step: rendered.step,
            phase: rendered.phase,
            available_choices,
            reprompted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{SessionId, UserId};
    use crate::domain::treatment::step::RoutingSignal;
    use crate::domain::treatment::steps::problem_shifting;

    fn start() -> (TreatmentEngine<'static>, TreatmentContext, EngineOutput) {
        let engine = TreatmentEngine::default();
        let mut ctx = TreatmentContext::new(
            SessionId::new(),
            UserId::new("user-1").unwrap(),
            StepId::from_static(ids::INTRODUCTION),
            TreatmentPhase::Introduction,
        );
        let first = engine.begin(&mut ctx).unwrap();
        (engine, ctx, first)
    }

    fn drive(
        engine: &TreatmentEngine<'_>,
        ctx: &mut TreatmentContext,
        inputs: &[&str],
    ) -> EngineOutput {
        let mut last = None;
        for input in inputs {
            last = Some(engine.process_turn(ctx, input).unwrap());
        }
        last.expect("at least one input")
    }

    mod opening {
        use super::*;

        #[test]
        fn begin_resolves_introduction_to_work_type_menu() {
            let (_, ctx, first) = start();
            assert_eq!(first.step, ids::WORK_TYPE_SELECTION);
            assert!(first.display_text.starts_with("Welcome."));
            assert_eq!(first.available_choices.len(), 3);
            assert_eq!(ctx.current_step(), &ids::WORK_TYPE_SELECTION);
            assert_eq!(ctx.version(), 1);
        }

        #[test]
        fn problem_flow_reaches_first_modality_step() {
            let (engine, mut ctx, _) = start();
            let out = drive(&engine, &mut ctx, &["1", "1", "I feel anxious", "yes"]);

            assert!(out.display_text.starts_with("Feel 'I feel anxious'..."));
            assert_eq!(out.step, problem_shifting::FEEL_PROBLEM);
            assert_eq!(ctx.problem_statement(), Some("I feel anxious"));
        }

        #[test]
        fn confirmation_echoes_what_was_just_typed() {
            let (engine, mut ctx, _) = start();
            let out = drive(&engine, &mut ctx, &["2", "run a marathon"]);
            assert_eq!(
                out.display_text,
                "So the goal you want to work on is 'run a marathon'. Is that right?"
            );
        }

        #[test]
        fn rejected_confirmation_asks_for_description_again() {
            let (engine, mut ctx, _) = start();
            let out = drive(&engine, &mut ctx, &["3", "the accident", "no"]);
            assert_eq!(out.step, ids::WORK_TYPE_DESCRIPTION);
            assert!(out.display_text.contains("negative experience"));
        }
    }

    mod reprompts {
        use super::*;

        #[test]
        fn unclear_answer_at_numeric_step_stays_put() {
            let (engine, mut ctx, _) = start();
            drive(&engine, &mut ctx, &["1"]);
            let version = ctx.version();

            let out = engine.process_turn(&mut ctx, "maybe").unwrap();

            assert!(out.reprompted);
            assert_eq!(out.step, ids::METHOD_SELECTION);
            assert!(out.display_text.starts_with(REPROMPT_PREFIX));
            assert!(out.display_text.contains("Which method would you like to use?"));
            assert_eq!(ctx.current_step(), &ids::METHOD_SELECTION);
            assert_eq!(ctx.version(), version + 1);
        }

        #[test]
        fn out_of_range_number_gets_clarification() {
            let (engine, mut ctx, _) = start();
            let out = engine.process_turn(&mut ctx, "9").unwrap();
            assert!(out.reprompted);
            assert!(out.display_text.starts_with("Please choose a number from 1 to 3."));
            assert_eq!(out.step, ids::WORK_TYPE_SELECTION);
        }

        #[test]
        fn input_is_recorded_even_when_rejected() {
            let (engine, mut ctx, _) = start();
            engine.process_turn(&mut ctx, "maybe").unwrap();
            assert_eq!(
                ctx.response_for(&StepId::from_static(ids::WORK_TYPE_SELECTION)),
                Some("maybe")
            );
        }
    }

    mod completion {
        use super::*;

        #[test]
        fn exit_completes_from_anywhere() {
            let (engine, mut ctx, _) = start();
            drive(&engine, &mut ctx, &["1", "2"]);
            let out = engine.process_turn(&mut ctx, "exit").unwrap();
            assert!(out.is_complete);
            assert_eq!(out.step, ids::SESSION_COMPLETE);
            assert!(out.display_text.starts_with("Thank you"));
        }

        #[test]
        fn finished_session_does_not_advance() {
            let (engine, mut ctx, _) = start();
            engine.process_turn(&mut ctx, "quit").unwrap();
            let version = ctx.version();

            let out = engine.process_turn(&mut ctx, "1").unwrap();

            assert!(out.is_complete);
            assert_eq!(ctx.version(), version);
            assert_eq!(ctx.response_count(), 0);
        }
    }

    #[test]
    fn display_text_never_carries_a_signal() {
        let (engine, mut ctx, first) = start();
        let mut outputs = vec![first];
        for input in ["1", "1", "I feel anxious", "yes", "tight", "heavy", "relax", "calm", "still", "no"] {
            outputs.push(engine.process_turn(&mut ctx, input).unwrap());
        }
        for out in outputs {
            for signal in RoutingSignal::ALL {
                assert!(!out.display_text.contains(signal.token()));
                assert!(!out.display_text.contains(&format!("{signal:?}")));
            }
        }
    }
}
