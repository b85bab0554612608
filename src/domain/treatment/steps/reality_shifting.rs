//! Reality Shifting script, used for goals.
//!
//! The user feels the goal as already achieved, then clears each doubt until
//! their certainty of reaching it is high enough.

use crate::domain::treatment::choice::Choice;
use crate::domain::treatment::context::TreatmentContext;
use crate::domain::treatment::phase::{Modality, TreatmentPhase};
use crate::domain::treatment::router::{RouteDecision, RouteInput};
use crate::domain::treatment::step::{
    ChoiceOption, ExpectedAnswer, StepDefinition, StepResponse, YES_NO_OPTIONS,
};

use super::{echo, feel_deeper, ids, loop_back, on_answer, with_problem};

pub const FEEL_GOAL: &str = "reality_shifting_feel_goal";
pub const DOUBT_CHECK: &str = "reality_shifting_doubt_check";
pub const DESCRIBE_DOUBT: &str = "reality_shifting_describe_doubt";
pub const FEEL_DOUBT: &str = "reality_shifting_feel_doubt";
pub const FEEL_DEEPER: &str = "reality_shifting_feel_deeper";
pub const CERTAINTY: &str = "reality_shifting_certainty";

/// Certainty at or above this completes the pass.
pub const CERTAINTY_THRESHOLD: u32 = 8;

/// Note key holding the certainty that completed the last goal pass.
pub const CERTAINTY_NOTE: &str = "reality_certainty";

const PHASE: TreatmentPhase = TreatmentPhase::Modality(Modality::RealityShifting);

const SCALE_OPTIONS: &[ChoiceOption] = &[
    ChoiceOption::new("0", "0"),
    ChoiceOption::new("1", "1"),
    ChoiceOption::new("2", "2"),
    ChoiceOption::new("3", "3"),
    ChoiceOption::new("4", "4"),
    ChoiceOption::new("5", "5"),
    ChoiceOption::new("6", "6"),
    ChoiceOption::new("7", "7"),
    ChoiceOption::new("8", "8"),
    ChoiceOption::new("9", "9"),
    ChoiceOption::new("10", "10"),
];

pub(super) fn steps() -> Vec<StepDefinition> {
    vec![
        StepDefinition::new(FEEL_GOAL, PHASE, feel_goal, |input, _| {
            on_answer(input, DOUBT_CHECK)
        }),
        StepDefinition::new(DOUBT_CHECK, PHASE, doubt_check, route_doubt_check)
            .expecting(ExpectedAnswer::YesNo)
            .with_choices(YES_NO_OPTIONS),
        StepDefinition::new(DESCRIBE_DOUBT, PHASE, describe_doubt, |input, _| {
            on_answer(input, FEEL_DOUBT)
        }),
        StepDefinition::new(FEEL_DOUBT, PHASE, feel_doubt, |input, _| {
            on_answer(input, FEEL_DEEPER)
        })
        .after(DESCRIBE_DOUBT),
        StepDefinition::new(FEEL_DEEPER, PHASE, |_, input| feel_deeper(input), |input, _| {
            on_answer(input, DOUBT_CHECK)
        })
        .after(FEEL_DOUBT),
        StepDefinition::new(CERTAINTY, PHASE, certainty, route_certainty)
            .expecting(ExpectedAnswer::Scale { min: 0, max: 10 })
            .with_choices(SCALE_OPTIONS),
    ]
}

fn feel_goal(ctx: &TreatmentContext, _: Option<&str>) -> StepResponse {
    with_problem(ctx, |goal| {
        format!("Feel yourself having already achieved '{goal}'... what does it feel like?")
    })
}

fn doubt_check(ctx: &TreatmentContext, _: Option<&str>) -> StepResponse {
    with_problem(ctx, |goal| {
        format!("Is there any doubt in you that you will achieve '{goal}'?")
    })
}

fn describe_doubt(_: &TreatmentContext, _: Option<&str>) -> StepResponse {
    StepResponse::display("What is the doubt? Describe it in a few words.")
}

fn feel_doubt(_: &TreatmentContext, input: Option<&str>) -> StepResponse {
    StepResponse::Display(format!(
        "Feel the doubt '{}'... what does it feel like?",
        echo(input)
    ))
}

fn certainty(ctx: &TreatmentContext, _: Option<&str>) -> StepResponse {
    with_problem(ctx, |goal| {
        format!(
            "On a scale of 0 to 10, how certain are you now that you will \
             achieve '{goal}'?"
        )
    })
}

fn route_doubt_check(input: &RouteInput<'_>, ctx: &mut TreatmentContext) -> RouteDecision {
    match input.choice() {
        Some(Choice::Yes) => loop_back(ctx, DESCRIBE_DOUBT),
        Some(Choice::No) => RouteDecision::goto(CERTAINTY),
        _ => RouteDecision::Stay,
    }
}

fn route_certainty(input: &RouteInput<'_>, ctx: &mut TreatmentContext) -> RouteDecision {
    match input.choice() {
        Some(Choice::Number(n)) if n > 10 => RouteDecision::Stay,
        Some(Choice::Number(n)) if n >= CERTAINTY_THRESHOLD => {
            ctx.metadata_mut()
                .notes
                .insert(CERTAINTY_NOTE.to_string(), n.to_string());
            RouteDecision::goto(ids::PASS_COMPLETE)
        }
        Some(Choice::Number(_)) => loop_back(ctx, DESCRIBE_DOUBT),
        _ => RouteDecision::Stay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::treatment::steps::testing::{context_for, route, text};

    const GOAL: &str = "run a marathon";

    #[test]
    fn goal_is_named_verbatim() {
        let ctx = context_for(Modality::RealityShifting, GOAL);
        assert_eq!(
            text(&ctx, FEEL_GOAL, None),
            "Feel yourself having already achieved 'run a marathon'... what does it feel like?"
        );
        assert!(text(&ctx, CERTAINTY, None).contains("'run a marathon'"));
    }

    #[test]
    fn doubt_leads_into_doubt_loop() {
        let mut ctx = context_for(Modality::RealityShifting, GOAL);
        assert_eq!(route(&mut ctx, DOUBT_CHECK, "yes"), RouteDecision::goto(DESCRIBE_DOUBT));
        assert_eq!(route(&mut ctx, DESCRIBE_DOUBT, "I'm too old"), RouteDecision::goto(FEEL_DOUBT));
        assert_eq!(route(&mut ctx, FEEL_DOUBT, "sinking"), RouteDecision::goto(FEEL_DEEPER));
        assert_eq!(route(&mut ctx, FEEL_DEEPER, "calm"), RouteDecision::goto(DOUBT_CHECK));
        assert_eq!(route(&mut ctx, DOUBT_CHECK, "no"), RouteDecision::goto(CERTAINTY));
    }

    #[test]
    fn high_certainty_completes() {
        let mut ctx = context_for(Modality::RealityShifting, GOAL);
        assert_eq!(route(&mut ctx, CERTAINTY, "8"), RouteDecision::goto(ids::PASS_COMPLETE));
        assert_eq!(ctx.metadata().notes.get(CERTAINTY_NOTE).map(String::as_str), Some("8"));
    }

    #[test]
    fn low_certainty_goes_back_to_doubts() {
        let mut ctx = context_for(Modality::RealityShifting, GOAL);
        assert_eq!(route(&mut ctx, CERTAINTY, "7"), RouteDecision::goto(DESCRIBE_DOUBT));
        assert_eq!(ctx.metadata().cycle_count, 1);
    }

    #[test]
    fn off_scale_answers_stay() {
        let mut ctx = context_for(Modality::RealityShifting, GOAL);
        assert_eq!(route(&mut ctx, CERTAINTY, "11"), RouteDecision::Stay);
        assert_eq!(route(&mut ctx, CERTAINTY, "pretty sure"), RouteDecision::Stay);
    }
}
