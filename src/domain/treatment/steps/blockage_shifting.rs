//! Blockage Shifting script.
//!
//! Feels into the problem and each answer in turn until nothing is left. The
//! check is free text: an answer that is only "no", "nothing" or "gone"
//! resolves the pass, anything else (even "no change") is felt into next.

use crate::domain::treatment::choice::Choice;
use crate::domain::treatment::context::TreatmentContext;
use crate::domain::treatment::phase::{Modality, TreatmentPhase};
use crate::domain::treatment::router::{RouteDecision, RouteInput};
use crate::domain::treatment::step::{StepDefinition, StepResponse};

use super::{echo, ids, loop_back, on_answer, with_problem};

pub const FEEL_PROBLEM: &str = "blockage_shifting_feel_problem";
pub const FEEL_ANSWER: &str = "blockage_shifting_feel_answer";
pub const CHECK: &str = "blockage_shifting_check";
pub const FEEL_NEW: &str = "blockage_shifting_feel_new";

const PHASE: TreatmentPhase = TreatmentPhase::Modality(Modality::BlockageShifting);

pub(super) fn steps() -> Vec<StepDefinition> {
    vec![
        StepDefinition::new(FEEL_PROBLEM, PHASE, feel_problem, |input, _| {
            on_answer(input, FEEL_ANSWER)
        })
        .with_bridge(),
        StepDefinition::new(FEEL_ANSWER, PHASE, feel_answer, |input, _| {
            on_answer(input, CHECK)
        })
        .after(FEEL_PROBLEM),
        StepDefinition::new(CHECK, PHASE, check, route_check),
        StepDefinition::new(FEEL_NEW, PHASE, feel_answer, |input, _| on_answer(input, CHECK))
            .after(CHECK),
    ]
}

fn feel_problem(ctx: &TreatmentContext, _: Option<&str>) -> StepResponse {
    with_problem(ctx, |problem| {
        format!("Feel the problem '{problem}'... what does it feel like?")
    })
}

fn feel_answer(_: &TreatmentContext, input: Option<&str>) -> StepResponse {
    let answer = echo(input);
    StepResponse::Display(format!("Feel '{answer}'... what does '{answer}' feel like?"))
}

fn check(ctx: &TreatmentContext, _: Option<&str>) -> StepResponse {
    with_problem(ctx, |problem| {
        format!("Feel the problem '{problem}' again... what does it feel like now?")
    })
}

fn route_check(input: &RouteInput<'_>, ctx: &mut TreatmentContext) -> RouteDecision {
    match input.choice() {
        Some(Choice::Empty) | None => RouteDecision::Stay,
        Some(Choice::No) if input.raw().and_then(Choice::bare_yes_no) == Some(Choice::No) => {
            RouteDecision::goto(ids::PASS_COMPLETE)
        }
        Some(_) => loop_back(ctx, FEEL_NEW),
    }
}
