//! Digging-deeper steps: consent, the check chain, and nested problem capture.

use crate::domain::treatment::choice::Choice;
use crate::domain::treatment::context::{DiggingCheck, TreatmentContext};
use crate::domain::treatment::digging_deeper::{
    grant_consent, next_check, start_nested_pass,
};
use crate::domain::treatment::phase::{TreatmentPhase, WorkType};
use crate::domain::treatment::router::{RouteDecision, RouteInput};
use crate::domain::treatment::step::{
    ExpectedAnswer, Generator, InputSource, RouteHandler, StepDefinition, StepResponse,
    YES_NO_OPTIONS,
};
use crate::domain::treatment::validation;

use super::ids;
use super::selection::{chosen_method, method_menu, METHOD_OPTIONS};

const PHASE: TreatmentPhase = TreatmentPhase::DiggingDeeper;

pub(super) fn steps() -> Vec<StepDefinition> {
    vec![
        check(ids::DIGGING_DEEPER_START, consent, route_consent),
        check(ids::FUTURE_PROBLEM_CHECK, future_problem_check, |input, ctx| {
            route_check(input, ctx, DiggingCheck::FutureProblem)
        }),
        check(ids::SCENARIO_CHECK_1, scenario_check, |input, ctx| {
            route_check(input, ctx, DiggingCheck::Scenario(1))
        }),
        check(ids::SCENARIO_CHECK_2, another_scenario_check, |input, ctx| {
            route_check(input, ctx, DiggingCheck::Scenario(2))
        }),
        check(ids::SCENARIO_CHECK_3, another_scenario_check, |input, ctx| {
            route_check(input, ctx, DiggingCheck::Scenario(3))
        }),
        check(ids::ANYTHING_ELSE_CHECK_1, anything_else_check, |input, ctx| {
            route_check(input, ctx, DiggingCheck::AnythingElse(1))
        }),
        check(ids::ANYTHING_ELSE_CHECK_2, anything_else_at_all_check, |input, ctx| {
            route_check(input, ctx, DiggingCheck::AnythingElse(2))
        }),
        StepDefinition::new(
            ids::DIGGING_DEEPER_NEW_PROBLEM,
            PHASE,
            new_problem,
            route_new_problem,
        )
        .validated_by(validation::problem_description)
        .input_from(InputSource::Fresh),
        StepDefinition::new(
            ids::DIGGING_DEEPER_METHOD_SELECTION,
            PHASE,
            method_selection,
            route_method_selection,
        )
        .expecting(ExpectedAnswer::NumericChoice { min: 1, max: 4 })
        .input_from(InputSource::Fresh)
        .with_choices(METHOD_OPTIONS),
    ]
}

/// A yes/no step of the digging-deeper chain.
fn check(id: &'static str, generator: Generator, route: RouteHandler) -> StepDefinition {
    StepDefinition::new(id, PHASE, generator, route)
        .expecting(ExpectedAnswer::YesNo)
        .input_from(InputSource::Fresh)
        .with_choices(YES_NO_OPTIONS)
}

fn original(ctx: &TreatmentContext) -> &str {
    ctx.original_problem_statement().unwrap_or("the problem")
}

// ════════════════════════════════════════════════════════════════════════════
// Generators
// ════════════════════════════════════════════════════════════════════════════

fn consent(ctx: &TreatmentContext, _: Option<&str>) -> StepResponse {
    StepResponse::Display(format!(
        "Well done. Would you like to dig a little deeper, to make sure '{}' \
         is fully cleared?",
        original(ctx)
    ))
}

fn future_problem_check(ctx: &TreatmentContext, _: Option<&str>) -> StepResponse {
    StepResponse::Display(format!(
        "Put yourself in the future. Do you feel '{}' could come back as a problem?",
        original(ctx)
    ))
}

fn scenario_check(ctx: &TreatmentContext, _: Option<&str>) -> StepResponse {
    StepResponse::Display(format!(
        "Is there any scenario in which '{}' would still be a problem for you?",
        original(ctx)
    ))
}

fn another_scenario_check(ctx: &TreatmentContext, _: Option<&str>) -> StepResponse {
    StepResponse::Display(format!(
        "Is there any other scenario in which '{}' would still be a problem for you?",
        original(ctx)
    ))
}

fn anything_else_check(ctx: &TreatmentContext, _: Option<&str>) -> StepResponse {
    StepResponse::Display(format!(
        "Is there anything else about '{}' that's still a problem for you?",
        original(ctx)
    ))
}

fn anything_else_at_all_check(ctx: &TreatmentContext, _: Option<&str>) -> StepResponse {
    StepResponse::Display(format!(
        "Is there anything else at all about '{}' that's still a problem for you?",
        original(ctx)
    ))
}

fn new_problem(_: &TreatmentContext, _: Option<&str>) -> StepResponse {
    StepResponse::display("What's the problem now? Describe it in a few words.")
}

fn method_selection(ctx: &TreatmentContext, _: Option<&str>) -> StepResponse {
    let subject = match ctx.problem_statement() {
        Some(problem) => format!("'{problem}'"),
        None => "this problem".to_string(),
    };
    StepResponse::Display(format!(
        "Which method would you like to use for {subject}?\n{}",
        method_menu()
    ))
}

// ════════════════════════════════════════════════════════════════════════════
// Routing
// ════════════════════════════════════════════════════════════════════════════

fn route_consent(input: &RouteInput<'_>, ctx: &mut TreatmentContext) -> RouteDecision {
    match input.choice() {
        Some(Choice::Yes) => {
            grant_consent(ctx);
            RouteDecision::goto(ids::FUTURE_PROBLEM_CHECK)
        }
        Some(Choice::No) => RouteDecision::goto(ids::INTEGRATION_REFLECTION),
        _ => RouteDecision::Stay,
    }
}

fn route_check(
    input: &RouteInput<'_>,
    ctx: &mut TreatmentContext,
    check: DiggingCheck,
) -> RouteDecision {
    match input.choice() {
        Some(Choice::Yes) => RouteDecision::goto(start_nested_pass(ctx, check)),
        Some(Choice::No) => RouteDecision::goto(next_check(ctx, check)),
        _ => RouteDecision::Stay,
    }
}

fn route_new_problem(input: &RouteInput<'_>, ctx: &mut TreatmentContext) -> RouteDecision {
    let Some(raw) = input.raw().filter(|raw| !raw.trim().is_empty()) else {
        return RouteDecision::Stay;
    };
    ctx.set_problem_statement(raw);
    ctx.metadata_mut().work_type = Some(WorkType::Problem);
    RouteDecision::goto(ids::DIGGING_DEEPER_METHOD_SELECTION)
}

fn route_method_selection(input: &RouteInput<'_>, ctx: &mut TreatmentContext) -> RouteDecision {
    match chosen_method(input) {
        Some(method) => {
            ctx.metadata_mut().selected_method = Some(method);
            RouteDecision::goto(ids::MODALITY_ENTRY)
        }
        None => RouteDecision::Stay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::treatment::phase::Modality;
    use crate::domain::treatment::steps::testing::{context_for, route, text};

    fn after_pass() -> TreatmentContext {
        let mut ctx = context_for(Modality::ProblemShifting, "I feel anxious");
        ctx.metadata_mut().original_problem_statement = Some("I feel anxious".into());
        ctx
    }

    #[test]
    fn checks_name_the_original_problem() {
        let ctx = after_pass();
        for id in [
            ids::DIGGING_DEEPER_START,
            ids::FUTURE_PROBLEM_CHECK,
            ids::SCENARIO_CHECK_1,
            ids::SCENARIO_CHECK_2,
            ids::ANYTHING_ELSE_CHECK_2,
        ] {
            assert!(text(&ctx, id, None).contains("'I feel anxious'"), "{id}");
        }
    }

    #[test]
    fn consent_yes_starts_chain() {
        let mut ctx = after_pass();
        assert_eq!(
            route(&mut ctx, ids::DIGGING_DEEPER_START, "yes"),
            RouteDecision::goto(ids::FUTURE_PROBLEM_CHECK)
        );
        assert!(ctx.metadata().dig_deeper_consent);
    }

    #[test]
    fn consent_no_goes_to_integration() {
        let mut ctx = after_pass();
        assert_eq!(
            route(&mut ctx, ids::DIGGING_DEEPER_START, "no thanks"),
            RouteDecision::goto(ids::INTEGRATION_REFLECTION)
        );
        assert!(!ctx.metadata().dig_deeper_consent);
    }

    #[test]
    fn check_yes_opens_nested_pass() {
        let mut ctx = after_pass();
        assert_eq!(
            route(&mut ctx, ids::FUTURE_PROBLEM_CHECK, "yes"),
            RouteDecision::goto(ids::DIGGING_DEEPER_NEW_PROBLEM)
        );
        assert_eq!(ctx.metadata().depth(), 1);

        assert_eq!(
            route(&mut ctx, ids::DIGGING_DEEPER_NEW_PROBLEM, "I fear judgment"),
            RouteDecision::goto(ids::DIGGING_DEEPER_METHOD_SELECTION)
        );
        assert_eq!(ctx.problem_statement(), Some("I fear judgment"));
        assert_eq!(
            ctx.metadata().original_problem_statement.as_deref(),
            Some("I feel anxious")
        );

        assert_eq!(
            route(&mut ctx, ids::DIGGING_DEEPER_METHOD_SELECTION, "3"),
            RouteDecision::goto(ids::MODALITY_ENTRY)
        );
        assert_eq!(ctx.metadata().selected_method, Some(Modality::BeliefShifting));
    }

    #[test]
    fn check_no_moves_along_chain() {
        let mut ctx = after_pass();
        assert_eq!(
            route(&mut ctx, ids::FUTURE_PROBLEM_CHECK, "no"),
            RouteDecision::goto(ids::SCENARIO_CHECK_1)
        );
        assert_eq!(
            route(&mut ctx, ids::SCENARIO_CHECK_1, "no"),
            RouteDecision::goto(ids::SCENARIO_CHECK_2)
        );
    }

    #[test]
    fn nested_method_menu_names_new_problem() {
        let mut ctx = after_pass();
        ctx.set_problem_statement("I fear judgment");
        let text = text(&ctx, ids::DIGGING_DEEPER_METHOD_SELECTION, None);
        assert!(text.starts_with("Which method would you like to use for 'I fear judgment'?"));
        assert!(text.contains("4. Blockage Shifting"));
    }
}
