//! Integration steps and the end of the session.

use crate::domain::treatment::choice::Choice;
use crate::domain::treatment::context::TreatmentContext;
use crate::domain::treatment::phase::TreatmentPhase;
use crate::domain::treatment::router::{RouteDecision, RouteInput};
use crate::domain::treatment::step::{
    ExpectedAnswer, InputSource, StepDefinition, StepResponse, YES_NO_OPTIONS,
};

use super::ids;

/// Note key holding the reflection on the original problem.
pub const REFLECTION_NOTE: &str = "integration_reflection";

/// Note key holding the action the user committed to.
pub const ACTION_NOTE: &str = "integration_action";

const PHASE: TreatmentPhase = TreatmentPhase::Integration;

pub(super) fn steps() -> Vec<StepDefinition> {
    vec![
        StepDefinition::new(ids::INTEGRATION_REFLECTION, PHASE, reflection, |input, ctx| {
            note_and_go(input, ctx, REFLECTION_NOTE, ids::INTEGRATION_ACTION)
        })
        .input_from(InputSource::Fresh),
        StepDefinition::new(ids::INTEGRATION_ACTION, PHASE, action, |input, ctx| {
            note_and_go(input, ctx, ACTION_NOTE, ids::INTEGRATION_NEXT_STEPS)
        })
        .input_from(InputSource::Fresh),
        StepDefinition::new(ids::INTEGRATION_NEXT_STEPS, PHASE, next_steps, route_next_steps)
            .expecting(ExpectedAnswer::YesNo)
            .input_from(InputSource::Fresh)
            .with_choices(YES_NO_OPTIONS),
        StepDefinition::new(
            ids::SESSION_COMPLETE,
            PHASE,
            session_complete,
            |_, _| RouteDecision::Stay,
        )
        .expecting(ExpectedAnswer::Nothing)
        .input_from(InputSource::Fresh),
    ]
}

fn reflection(ctx: &TreatmentContext, _: Option<&str>) -> StepResponse {
    let text = match ctx.original_problem_statement() {
        Some(problem) => format!("Think about '{problem}' now. What do you notice has changed?"),
        None => "Think about what you worked on today. What do you notice has changed?".into(),
    };
    StepResponse::Display(text)
}

fn action(_: &TreatmentContext, _: Option<&str>) -> StepResponse {
    StepResponse::display("What's one thing you'll do differently from now on?")
}

fn next_steps(_: &TreatmentContext, _: Option<&str>) -> StepResponse {
    StepResponse::display("Would you like to work on something else?")
}

fn session_complete(ctx: &TreatmentContext, _: Option<&str>) -> StepResponse {
    let mut text = String::from("Thank you for working with me today.");
    if let Some(action) = ctx.metadata().notes.get(ACTION_NOTE) {
        text.push_str(&format!(" Remember what you decided to do: '{action}'."));
    }
    text.push_str(" Take good care of yourself.");
    StepResponse::Display(text)
}

fn note_and_go(
    input: &RouteInput<'_>,
    ctx: &mut TreatmentContext,
    key: &str,
    next: &'static str,
) -> RouteDecision {
    let Some(raw) = input.raw().filter(|raw| !raw.trim().is_empty()) else {
        return RouteDecision::Stay;
    };
    ctx.metadata_mut()
        .notes
        .insert(key.to_string(), raw.trim().to_string());
    RouteDecision::goto(next)
}

fn route_next_steps(input: &RouteInput<'_>, ctx: &mut TreatmentContext) -> RouteDecision {
    match input.choice() {
        Some(Choice::Yes) => {
            ctx.reset_for_new_problem();
            RouteDecision::goto(ids::WORK_TYPE_SELECTION)
        }
        Some(Choice::No) => RouteDecision::goto(ids::SESSION_COMPLETE),
        _ => RouteDecision::Stay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::treatment::phase::Modality;
    use crate::domain::treatment::steps::testing::{context_for, route, text};

    fn integrating() -> TreatmentContext {
        let mut ctx = context_for(Modality::ProblemShifting, "I feel anxious");
        ctx.metadata_mut().original_problem_statement = Some("I feel anxious".into());
        ctx.metadata_mut().dig_deeper_consent = true;
        ctx.metadata_mut().cycle_count = 3;
        ctx
    }

    #[test]
    fn reflection_names_original_problem() {
        let ctx = integrating();
        assert_eq!(
            text(&ctx, ids::INTEGRATION_REFLECTION, None),
            "Think about 'I feel anxious' now. What do you notice has changed?"
        );
    }

    #[test]
    fn answers_are_kept_as_notes() {
        let mut ctx = integrating();
        route(&mut ctx, ids::INTEGRATION_REFLECTION, "I feel lighter");
        route(&mut ctx, ids::INTEGRATION_ACTION, "Speak up in meetings");
        assert_eq!(
            ctx.metadata().notes.get(ACTION_NOTE).map(String::as_str),
            Some("Speak up in meetings")
        );
        assert!(text(&ctx, ids::SESSION_COMPLETE, None).contains("'Speak up in meetings'"));
    }

    #[test]
    fn working_on_something_else_resets_everything() {
        let mut ctx = integrating();
        assert_eq!(
            route(&mut ctx, ids::INTEGRATION_NEXT_STEPS, "yes please"),
            RouteDecision::goto(ids::WORK_TYPE_SELECTION)
        );
        assert!(!ctx.metadata().dig_deeper_consent);
        assert_eq!(ctx.metadata().cycle_count, 0);
        assert!(ctx.problem_statement().is_none());
    }

    #[test]
    fn finishing_goes_to_session_complete() {
        let mut ctx = integrating();
        assert_eq!(
            route(&mut ctx, ids::INTEGRATION_NEXT_STEPS, "no"),
            RouteDecision::goto(ids::SESSION_COMPLETE)
        );
    }
}
