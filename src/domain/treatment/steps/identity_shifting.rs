//! Identity Shifting script.
//!
//! Finds the identity the user is being while the problem is present, feels
//! into it until it dissolves, and checks it cannot come back before checking
//! the problem itself.

use crate::domain::treatment::choice::Choice;
use crate::domain::treatment::context::TreatmentContext;
use crate::domain::treatment::phase::{Modality, TreatmentPhase};
use crate::domain::treatment::router::{RouteDecision, RouteInput};
use crate::domain::treatment::step::{
    ExpectedAnswer, StepDefinition, StepId, StepResponse, YES_NO_OPTIONS,
};

use super::{echo, feel_deeper, ids, loop_back, on_answer, still_a_problem, with_problem};

pub const IDENTIFY: &str = "identity_shifting_identify";
pub const FEEL_IDENTITY: &str = "identity_shifting_feel_identity";
pub const FEEL_DEEPER: &str = "identity_shifting_feel_deeper";
pub const DISSOLVE: &str = "identity_shifting_dissolve";
pub const FUTURE_CHECK: &str = "identity_shifting_future_check";
pub const PROBLEM_CHECK: &str = "identity_shifting_problem_check";

const PHASE: TreatmentPhase = TreatmentPhase::Modality(Modality::IdentityShifting);

pub(super) fn steps() -> Vec<StepDefinition> {
    vec![
        StepDefinition::new(IDENTIFY, PHASE, identify, |input, _| {
            on_answer(input, FEEL_IDENTITY)
        }),
        StepDefinition::new(FEEL_IDENTITY, PHASE, feel_identity, |input, _| {
            on_answer(input, FEEL_DEEPER)
        })
        .after(IDENTIFY)
        .with_bridge(),
        StepDefinition::new(FEEL_DEEPER, PHASE, |_, input| feel_deeper(input), |input, _| {
            on_answer(input, DISSOLVE)
        })
        .after(FEEL_IDENTITY),
        StepDefinition::new(DISSOLVE, PHASE, dissolve, |input, _| {
            on_answer(input, FUTURE_CHECK)
        }),
        StepDefinition::new(FUTURE_CHECK, PHASE, future_check, route_future_check)
            .expecting(ExpectedAnswer::YesNo)
            .with_choices(YES_NO_OPTIONS),
        StepDefinition::new(PROBLEM_CHECK, PHASE, problem_check, |input, ctx| {
            still_a_problem(input, ctx, IDENTIFY, ids::PASS_COMPLETE)
        })
        .expecting(ExpectedAnswer::YesNo)
        .with_choices(YES_NO_OPTIONS),
    ]
}

/// The identity named at the first step of this pass.
fn identity(ctx: &TreatmentContext) -> &str {
    echo(ctx.response_for(&StepId::from_static(IDENTIFY)))
}

fn identify(ctx: &TreatmentContext, _: Option<&str>) -> StepResponse {
    with_problem(ctx, |problem| {
        format!(
            "Feel the problem '{problem}'... what kind of person are you being \
             when you're experiencing this problem?"
        )
    })
}

fn feel_identity(_: &TreatmentContext, input: Option<&str>) -> StepResponse {
    StepResponse::Display(format!(
        "Feel yourself being '{}'... what does it feel like?",
        echo(input)
    ))
}

fn dissolve(ctx: &TreatmentContext, _: Option<&str>) -> StepResponse {
    let identity = identity(ctx);
    StepResponse::Display(format!(
        "Feel yourself being '{identity}' now... what are you when you're no longer \
         being '{identity}'?"
    ))
}

fn future_check(ctx: &TreatmentContext, _: Option<&str>) -> StepResponse {
    StepResponse::Display(format!(
        "Put yourself in the future. Could you ever be '{}' again?",
        identity(ctx)
    ))
}

fn problem_check(ctx: &TreatmentContext, _: Option<&str>) -> StepResponse {
    with_problem(ctx, |problem| {
        format!("Feel the problem '{problem}'... does it still feel like a problem?")
    })
}

fn route_future_check(input: &RouteInput<'_>, ctx: &mut TreatmentContext) -> RouteDecision {
    match input.choice() {
        Some(Choice::Yes) => loop_back(ctx, FEEL_IDENTITY),
        Some(Choice::No) => RouteDecision::goto(PROBLEM_CHECK),
        _ => RouteDecision::Stay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::treatment::steps::testing::{context_for, route, text};

    const PROBLEM: &str = "I procrastinate";

    fn with_identity() -> TreatmentContext {
        let mut ctx = context_for(Modality::IdentityShifting, PROBLEM);
        ctx.record_response(&StepId::from_static(IDENTIFY), "a failure");
        ctx
    }

    #[test]
    fn identify_asks_about_the_problem() {
        let ctx = with_identity();
        assert!(text(&ctx, IDENTIFY, None).starts_with("Feel the problem 'I procrastinate'"));
    }

    #[test]
    fn later_steps_use_the_named_identity() {
        let ctx = with_identity();
        assert_eq!(
            text(&ctx, FEEL_IDENTITY, Some("a failure")),
            "Feel yourself being 'a failure'... what does it feel like?"
        );
        assert!(text(&ctx, DISSOLVE, None).contains("no longer being 'a failure'"));
        assert!(text(&ctx, FUTURE_CHECK, None).contains("'a failure' again"));
    }

    #[test]
    fn future_check_loops_back_to_identity() {
        let mut ctx = with_identity();
        assert_eq!(route(&mut ctx, FUTURE_CHECK, "yes"), RouteDecision::goto(FEEL_IDENTITY));
        assert_eq!(ctx.metadata().cycle_count, 1);
        assert_eq!(route(&mut ctx, FUTURE_CHECK, "no"), RouteDecision::goto(PROBLEM_CHECK));
    }

    #[test]
    fn problem_check_completes_or_restarts() {
        let mut ctx = with_identity();
        assert_eq!(route(&mut ctx, PROBLEM_CHECK, "yes"), RouteDecision::goto(IDENTIFY));
        assert_eq!(ctx.metadata().cycle_count, 1);
        assert_eq!(
            route(&mut ctx, PROBLEM_CHECK, "no"),
            RouteDecision::goto(ids::PASS_COMPLETE)
        );
    }
}
