//! Problem Shifting script.

use crate::domain::treatment::context::TreatmentContext;
use crate::domain::treatment::phase::{Modality, TreatmentPhase};
use crate::domain::treatment::router::{RouteDecision, RouteInput};
use crate::domain::treatment::step::{
    ExpectedAnswer, StepDefinition, StepResponse, YES_NO_OPTIONS,
};

use super::{echo, feel_deeper, ids, on_answer, still_a_problem, with_problem};

pub const FEEL_PROBLEM: &str = "problem_shifting_feel_problem";
pub const FEEL_SENSATION: &str = "problem_shifting_feel_sensation";
pub const WHAT_NEEDS_TO_HAPPEN: &str = "problem_shifting_what_needs_to_happen";
pub const FEEL_SOLUTION: &str = "problem_shifting_feel_solution";
pub const FEEL_SOLUTION_STATE: &str = "problem_shifting_feel_solution_state";
pub const CHECK: &str = "problem_shifting_check";

const PHASE: TreatmentPhase = TreatmentPhase::Modality(Modality::ProblemShifting);

pub(super) fn steps() -> Vec<StepDefinition> {
    vec![
        StepDefinition::new(FEEL_PROBLEM, PHASE, feel_problem, |input, _| {
            on_answer(input, FEEL_SENSATION)
        })
        .with_bridge(),
        StepDefinition::new(FEEL_SENSATION, PHASE, feel_sensation, |input, _| {
            on_answer(input, WHAT_NEEDS_TO_HAPPEN)
        })
        .after(FEEL_PROBLEM),
        StepDefinition::new(WHAT_NEEDS_TO_HAPPEN, PHASE, what_needs_to_happen, |input, _| {
            on_answer(input, FEEL_SOLUTION)
        }),
        StepDefinition::new(FEEL_SOLUTION, PHASE, feel_solution, |input, _| {
            on_answer(input, FEEL_SOLUTION_STATE)
        })
        .after(WHAT_NEEDS_TO_HAPPEN),
        StepDefinition::new(FEEL_SOLUTION_STATE, PHASE, feel_solution_state, |input, _| {
            on_answer(input, CHECK)
        })
        .after(FEEL_SOLUTION),
        StepDefinition::new(CHECK, PHASE, check, route_check)
            .expecting(ExpectedAnswer::YesNo)
            .with_choices(YES_NO_OPTIONS),
    ]
}

fn feel_problem(ctx: &TreatmentContext, _: Option<&str>) -> StepResponse {
    with_problem(ctx, |problem| {
        format!("Feel '{problem}'... what does it feel like?")
    })
}

fn feel_sensation(_: &TreatmentContext, input: Option<&str>) -> StepResponse {
    feel_deeper(input)
}

fn what_needs_to_happen(ctx: &TreatmentContext, _: Option<&str>) -> StepResponse {
    with_problem(ctx, |problem| {
        format!("What needs to happen for '{problem}' to not be a problem?")
    })
}

fn feel_solution(_: &TreatmentContext, input: Option<&str>) -> StepResponse {
    StepResponse::Display(format!(
        "What would you feel like if '{}' had already happened?",
        echo(input)
    ))
}

fn feel_solution_state(_: &TreatmentContext, input: Option<&str>) -> StepResponse {
    let state = echo(input);
    StepResponse::Display(format!("Feel '{state}'... what does '{state}' feel like?"))
}

fn check(ctx: &TreatmentContext, _: Option<&str>) -> StepResponse {
    with_problem(ctx, |problem| {
        format!("Feel the problem '{problem}'... does it still feel like a problem?")
    })
}

fn route_check(input: &RouteInput<'_>, ctx: &mut TreatmentContext) -> RouteDecision {
    still_a_problem(input, ctx, FEEL_PROBLEM, ids::PASS_COMPLETE)
}
