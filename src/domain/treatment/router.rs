//! Next-step routing.
//!
//! The router decides where a session goes from (current step, input,
//! context) by dispatching to the current step's route handler. Handlers
//! mutate metadata as a side effect; they never render text.

use tracing::debug;

use super::choice::Choice;
use super::context::TreatmentContext;
use super::errors::TreatmentError;
use super::registry::StepRegistry;
use super::step::{RoutingSignal, StepId};
use super::steps::ids;

/// What the router is routing on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteInput<'a> {
    /// A user turn: the raw text and its normalized form.
    User { raw: &'a str, choice: Choice },
    /// A signal emitted by the step being routed from.
    Signal(RoutingSignal),
}

impl<'a> RouteInput<'a> {
    pub fn user(raw: &'a str) -> Self {
        RouteInput::User {
            raw,
            choice: Choice::normalize(raw),
        }
    }

    pub fn choice(&self) -> Option<Choice> {
        match self {
            RouteInput::User { choice, .. } => Some(*choice),
            RouteInput::Signal(_) => None,
        }
    }

    pub fn raw(&self) -> Option<&'a str> {
        match self {
            RouteInput::User { raw, .. } => Some(raw),
            RouteInput::Signal(_) => None,
        }
    }

    pub fn signal(&self) -> Option<RoutingSignal> {
        match self {
            RouteInput::Signal(signal) => Some(*signal),
            RouteInput::User { .. } => None,
        }
    }
}

/// Where the router sends the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Goto(StepId),
    /// No match: stay on the current step and re-prompt.
    Stay,
}

impl RouteDecision {
    pub const fn goto(id: &'static str) -> Self {
        RouteDecision::Goto(StepId::from_static(id))
    }
}

/// Dispatches routing to per-step handlers.
#[derive(Debug, Clone, Copy)]
pub struct Router<'r> {
    registry: &'r StepRegistry,
}

impl<'r> Router<'r> {
    pub fn new(registry: &'r StepRegistry) -> Self {
        Self { registry }
    }

    /// Decides the destination for `input` arriving at step `from`.
    ///
    /// Exit requests and missing problem statements are handled for every
    /// step; everything else is the step's own route handler. A `Goto`
    /// target is guaranteed to exist in the registry.
    pub fn determine_next_step(
        &self,
        from: &StepId,
        input: &RouteInput<'_>,
        ctx: &mut TreatmentContext,
    ) -> Result<RouteDecision, TreatmentError> {
        let step = self.registry.get_step(from)?;

        let decision = match input {
            RouteInput::User {
                choice: Choice::Exit,
                ..
            } => RouteDecision::goto(ids::SESSION_COMPLETE),
            RouteInput::Signal(RoutingSignal::ProblemStatementMissing) => {
                if ctx.metadata().is_nested() {
                    RouteDecision::goto(ids::DIGGING_DEEPER_NEW_PROBLEM)
                } else {
                    RouteDecision::goto(ids::WORK_TYPE_DESCRIPTION)
                }
            }
            _ => (step.route)(input, ctx),
        };

        if let RouteDecision::Goto(target) = &decision {
            if !self.registry.contains(target) {
                return Err(TreatmentError::StepNotFound(target.clone()));
            }
        }

        debug!(
            session_id = %ctx.session_id(),
            from = %from,
            signal = ?input.signal(),
            decision = ?decision,
            "Route decided"
        );

        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{SessionId, UserId};
    use crate::domain::treatment::phase::TreatmentPhase;
    use crate::domain::treatment::step::{StepDefinition, StepResponse};

    fn text(_: &TreatmentContext, _: Option<&str>) -> StepResponse {
        StepResponse::display("text")
    }

    fn numbers_only(input: &RouteInput<'_>, _: &mut TreatmentContext) -> RouteDecision {
        match input.choice() {
            Some(Choice::Number(1)) => RouteDecision::goto("second"),
            Some(Choice::Number(9)) => RouteDecision::goto("nowhere"),
            _ => RouteDecision::Stay,
        }
    }

    fn stay(_: &RouteInput<'_>, _: &mut TreatmentContext) -> RouteDecision {
        RouteDecision::Stay
    }

    fn registry() -> StepRegistry {
        StepRegistry::empty()
            .with_step(StepDefinition::new(
                "first",
                TreatmentPhase::WorkTypeSelection,
                text,
                numbers_only,
            ))
            .with_step(StepDefinition::new(
                "second",
                TreatmentPhase::WorkTypeSelection,
                text,
                stay,
            ))
            .with_step(StepDefinition::new(
                ids::SESSION_COMPLETE,
                TreatmentPhase::Integration,
                text,
                stay,
            ))
            .with_step(StepDefinition::new(
                ids::WORK_TYPE_DESCRIPTION,
                TreatmentPhase::WorkTypeSelection,
                text,
                stay,
            ))
    }

    fn context() -> TreatmentContext {
        TreatmentContext::new(
            SessionId::new(),
            UserId::new("user-1").unwrap(),
            StepId::from_static("first"),
            TreatmentPhase::WorkTypeSelection,
        )
    }

    #[test]
    fn dispatches_to_step_handler() {
        let registry = registry();
        let router = Router::new(&registry);
        let mut ctx = context();
        let decision = router
            .determine_next_step(&StepId::from_static("first"), &RouteInput::user("1"), &mut ctx)
            .unwrap();
        assert_eq!(decision, RouteDecision::goto("second"));
    }

    #[test]
    fn unmatched_input_stays() {
        let registry = registry();
        let router = Router::new(&registry);
        let mut ctx = context();
        let decision = router
            .determine_next_step(&StepId::from_static("first"), &RouteInput::user("maybe"), &mut ctx)
            .unwrap();
        assert_eq!(decision, RouteDecision::Stay);
    }

    #[test]
    fn exit_goes_to_session_complete_from_any_step() {
        let registry = registry();
        let router = Router::new(&registry);
        let mut ctx = context();
        for from in ["first", "second"] {
            let decision = router
                .determine_next_step(&StepId::from(from.to_string()), &RouteInput::user("quit"), &mut ctx)
                .unwrap();
            assert_eq!(decision, RouteDecision::goto(ids::SESSION_COMPLETE));
        }
    }

    #[test]
    fn missing_problem_statement_routes_to_description() {
        let registry = registry();
        let router = Router::new(&registry);
        let mut ctx = context();
        let decision = router
            .determine_next_step(
                &StepId::from_static("second"),
                &RouteInput::Signal(RoutingSignal::ProblemStatementMissing),
                &mut ctx,
            )
            .unwrap();
        assert_eq!(decision, RouteDecision::goto(ids::WORK_TYPE_DESCRIPTION));
    }

    #[test]
    fn unknown_source_step_is_an_error() {
        let registry = registry();
        let router = Router::new(&registry);
        let mut ctx = context();
        let err = router
            .determine_next_step(&StepId::from_static("ghost"), &RouteInput::user("1"), &mut ctx)
            .unwrap_err();
        assert_eq!(err, TreatmentError::StepNotFound(StepId::from_static("ghost")));
    }

    #[test]
    fn unknown_target_step_is_an_error() {
        let registry = registry();
        let router = Router::new(&registry);
        let mut ctx = context();
        let err = router
            .determine_next_step(&StepId::from_static("first"), &RouteInput::user("9"), &mut ctx)
            .unwrap_err();
        assert_eq!(err, TreatmentError::StepNotFound(StepId::from_static("nowhere")));
    }
}
