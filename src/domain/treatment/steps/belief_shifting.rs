//! Belief Shifting script.

use crate::domain::treatment::choice::Choice;
use crate::domain::treatment::context::TreatmentContext;
use crate::domain::treatment::phase::{Modality, TreatmentPhase};
use crate::domain::treatment::router::{RouteDecision, RouteInput};
use crate::domain::treatment::step::{
    ExpectedAnswer, StepDefinition, StepId, StepResponse, YES_NO_OPTIONS,
};

use super::{echo, feel_deeper, ids, loop_back, on_answer, still_a_problem, with_problem};

pub const IDENTIFY: &str = "belief_shifting_identify";
pub const FEEL_BELIEF: &str = "belief_shifting_feel_belief";
pub const FEEL_DEEPER: &str = "belief_shifting_feel_deeper";
pub const ALTERNATIVE: &str = "belief_shifting_alternative";
pub const BELIEF_CHECK: &str = "belief_shifting_belief_check";
pub const PROBLEM_CHECK: &str = "belief_shifting_problem_check";

const PHASE: TreatmentPhase = TreatmentPhase::Modality(Modality::BeliefShifting);

pub(super) fn steps() -> Vec<StepDefinition> {
    vec![
        StepDefinition::new(IDENTIFY, PHASE, identify, |input, _| {
            on_answer(input, FEEL_BELIEF)
        }),
        StepDefinition::new(FEEL_BELIEF, PHASE, feel_belief, |input, _| {
            on_answer(input, FEEL_DEEPER)
        })
        .after(IDENTIFY)
        .with_bridge(),
        StepDefinition::new(FEEL_DEEPER, PHASE, |_, input| feel_deeper(input), |input, _| {
            on_answer(input, ALTERNATIVE)
        })
        .after(FEEL_BELIEF),
        StepDefinition::new(ALTERNATIVE, PHASE, alternative, |input, _| {
            on_answer(input, BELIEF_CHECK)
        }),
        StepDefinition::new(BELIEF_CHECK, PHASE, belief_check, route_belief_check)
            .expecting(ExpectedAnswer::YesNo)
            .with_choices(YES_NO_OPTIONS),
        StepDefinition::new(PROBLEM_CHECK, PHASE, problem_check, |input, ctx| {
            still_a_problem(input, ctx, IDENTIFY, ids::PASS_COMPLETE)
        })
        .expecting(ExpectedAnswer::YesNo)
        .with_choices(YES_NO_OPTIONS),
    ]
}

fn belief(ctx: &TreatmentContext) -> &str {
    echo(ctx.response_for(&StepId::from_static(IDENTIFY)))
}

fn identify(ctx: &TreatmentContext, _: Option<&str>) -> StepResponse {
    with_problem(ctx, |problem| {
        format!(
            "Feel the problem '{problem}'... what do you believe about yourself \
             that's causing you to experience this problem?"
        )
    })
}

fn feel_belief(_: &TreatmentContext, input: Option<&str>) -> StepResponse {
    StepResponse::Display(format!(
        "Feel yourself believing '{}'... what does it feel like?",
        echo(input)
    ))
}

fn alternative(ctx: &TreatmentContext, _: Option<&str>) -> StepResponse {
    StepResponse::Display(format!(
        "What would you rather believe instead of '{}'?",
        belief(ctx)
    ))
}

fn belief_check(ctx: &TreatmentContext, _: Option<&str>) -> StepResponse {
    StepResponse::Display(format!("Do you still believe '{}'?", belief(ctx)))
}

fn problem_check(ctx: &TreatmentContext, _: Option<&str>) -> StepResponse {
    with_problem(ctx, |problem| {
        format!("Feel the problem '{problem}'... does it still feel like a problem?")
    })
}

fn route_belief_check(input: &RouteInput<'_>, ctx: &mut TreatmentContext) -> RouteDecision {
    match input.choice() {
        Some(Choice::Yes) => loop_back(ctx, FEEL_BELIEF),
        Some(Choice::No) => RouteDecision::goto(PROBLEM_CHECK),
        _ => RouteDecision::Stay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::treatment::steps::testing::{context_for, route, text};

    fn with_belief() -> TreatmentContext {
        let mut ctx = context_for(Modality::BeliefShifting, "I fear judgment");
        ctx.record_response(&StepId::from_static(IDENTIFY), "I'm not good enough");
        ctx
    }

    #[test]
    fn belief_is_echoed_verbatim() {
        let ctx = with_belief();
        assert_eq!(
            text(&ctx, BELIEF_CHECK, None),
            "Do you still believe 'I'm not good enough'?"
        );
        assert!(text(&ctx, ALTERNATIVE, None).contains("'I'm not good enough'"));
    }

    #[test]
    fn identify_names_the_problem() {
        let ctx = with_belief();
        assert!(text(&ctx, IDENTIFY, None).contains("'I fear judgment'"));
    }

    #[test]
    fn belief_check_loops_until_belief_is_gone() {
        let mut ctx = with_belief();
        assert_eq!(route(&mut ctx, BELIEF_CHECK, "I do"), RouteDecision::goto(FEEL_BELIEF));
        assert_eq!(route(&mut ctx, BELIEF_CHECK, "not anymore"), RouteDecision::goto(PROBLEM_CHECK));
        assert_eq!(ctx.metadata().cycle_count, 1);
    }

    #[test]
    fn problem_check_finishes_the_pass() {
        let mut ctx = with_belief();
        assert_eq!(
            route(&mut ctx, PROBLEM_CHECK, "nope"),
            RouteDecision::goto(ids::PASS_COMPLETE)
        );
    }
}
