//! Trauma Shifting script, used for negative experiences.

use crate::domain::treatment::choice::Choice;
use crate::domain::treatment::context::TreatmentContext;
use crate::domain::treatment::phase::{Modality, TreatmentPhase};
use crate::domain::treatment::router::{RouteDecision, RouteInput};
use crate::domain::treatment::step::{
    ExpectedAnswer, StepDefinition, StepId, StepResponse, YES_NO_OPTIONS,
};

use super::{echo, feel_deeper, ids, loop_back, on_answer, still_a_problem, with_problem};

pub const IDENTIFY: &str = "trauma_shifting_identify";
pub const FEEL_IDENTITY: &str = "trauma_shifting_feel_identity";
pub const FEEL_DEEPER: &str = "trauma_shifting_feel_deeper";
pub const IDENTITY_CHECK: &str = "trauma_shifting_identity_check";
pub const EXPERIENCE_CHECK: &str = "trauma_shifting_experience_check";

const PHASE: TreatmentPhase = TreatmentPhase::Modality(Modality::TraumaShifting);

pub(super) fn steps() -> Vec<StepDefinition> {
    vec![
        StepDefinition::new(IDENTIFY, PHASE, identify, |input, _| {
            on_answer(input, FEEL_IDENTITY)
        }),
        StepDefinition::new(FEEL_IDENTITY, PHASE, feel_identity, |input, _| {
            on_answer(input, FEEL_DEEPER)
        })
        .after(IDENTIFY),
        StepDefinition::new(FEEL_DEEPER, PHASE, |_, input| feel_deeper(input), |input, _| {
            on_answer(input, IDENTITY_CHECK)
        })
        .after(FEEL_IDENTITY),
        StepDefinition::new(IDENTITY_CHECK, PHASE, identity_check, route_identity_check)
            .expecting(ExpectedAnswer::YesNo)
            .with_choices(YES_NO_OPTIONS),
        StepDefinition::new(EXPERIENCE_CHECK, PHASE, experience_check, |input, ctx| {
            still_a_problem(input, ctx, IDENTIFY, ids::PASS_COMPLETE)
        })
        .expecting(ExpectedAnswer::YesNo)
        .with_choices(YES_NO_OPTIONS),
    ]
}

fn identify(ctx: &TreatmentContext, _: Option<&str>) -> StepResponse {
    with_problem(ctx, |experience| {
        format!(
            "Think about '{experience}' only for as long as you need to find the worst \
             moment. In that moment, what kind of person are you being?"
        )
    })
}

fn feel_identity(_: &TreatmentContext, input: Option<&str>) -> StepResponse {
    StepResponse::Display(format!(
        "Feel yourself being '{}'... what does it feel like?",
        echo(input)
    ))
}

fn identity_check(ctx: &TreatmentContext, _: Option<&str>) -> StepResponse {
    let identity = echo(ctx.response_for(&StepId::from_static(IDENTIFY)));
    StepResponse::Display(format!("Can you still feel yourself being '{identity}'?"))
}

fn experience_check(ctx: &TreatmentContext, _: Option<&str>) -> StepResponse {
    with_problem(ctx, |experience| {
        format!("Think about '{experience}' now... is it still a problem for you?")
    })
}

fn route_identity_check(input: &RouteInput<'_>, ctx: &mut TreatmentContext) -> RouteDecision {
    match input.choice() {
        Some(Choice::Yes) => loop_back(ctx, FEEL_IDENTITY),
        Some(Choice::No) => RouteDecision::goto(EXPERIENCE_CHECK),
        _ => RouteDecision::Stay,
    }
}
