//! Opening of the dialogue: choosing what to work on and how.

use crate::domain::treatment::choice::Choice;
use crate::domain::treatment::context::TreatmentContext;
use crate::domain::treatment::digging_deeper;
use crate::domain::treatment::phase::{Modality, TreatmentPhase, WorkType};
use crate::domain::treatment::router::{RouteDecision, RouteInput};
use crate::domain::treatment::step::{
    ChoiceOption, ExpectedAnswer, InputSource, RoutingSignal, StepDefinition, StepResponse,
    YES_NO_OPTIONS,
};
use crate::domain::treatment::validation;

use super::ids::{self, entry_step};
use super::on_yes_no;

const WELCOME: &str = "Welcome. This session will guide you, one question at a time, \
through clearing something that is holding you back. There are no wrong answers: \
just say whatever comes up first.";

const WORK_TYPE_OPTIONS: &[ChoiceOption] = &[
    ChoiceOption::new("1", "A problem"),
    ChoiceOption::new("2", "A goal"),
    ChoiceOption::new("3", "A negative experience"),
];

pub(super) const METHOD_OPTIONS: &[ChoiceOption] = &[
    ChoiceOption::new("1", "Problem Shifting"),
    ChoiceOption::new("2", "Identity Shifting"),
    ChoiceOption::new("3", "Belief Shifting"),
    ChoiceOption::new("4", "Blockage Shifting"),
];

pub(super) fn steps() -> Vec<StepDefinition> {
    vec![
        StepDefinition::new(
            ids::INTRODUCTION,
            TreatmentPhase::Introduction,
            introduction,
            route_introduction,
        )
        .expecting(ExpectedAnswer::Nothing)
        .input_from(InputSource::Fresh),
        StepDefinition::new(
            ids::WORK_TYPE_SELECTION,
            TreatmentPhase::WorkTypeSelection,
            work_type_selection,
            route_work_type_selection,
        )
        .expecting(ExpectedAnswer::NumericChoice { min: 1, max: 3 })
        .input_from(InputSource::Fresh)
        .with_choices(WORK_TYPE_OPTIONS),
        StepDefinition::new(
            ids::WORK_TYPE_DESCRIPTION,
            TreatmentPhase::WorkTypeSelection,
            work_type_description,
            route_work_type_description,
        )
        .validated_by(validation::problem_description)
        .input_from(InputSource::Fresh),
        StepDefinition::new(
            ids::WORK_TYPE_CONFIRMATION,
            TreatmentPhase::WorkTypeSelection,
            work_type_confirmation,
            route_work_type_confirmation,
        )
        .expecting(ExpectedAnswer::YesNo)
        .after(ids::WORK_TYPE_DESCRIPTION)
        .input_from(InputSource::TransitionValue)
        .with_choices(YES_NO_OPTIONS),
        StepDefinition::new(
            ids::METHOD_SELECTION,
            TreatmentPhase::MethodSelection,
            method_selection,
            route_method_selection,
        )
        .expecting(ExpectedAnswer::NumericChoice { min: 1, max: 4 })
        .input_from(InputSource::Fresh)
        .with_choices(METHOD_OPTIONS),
        StepDefinition::new(
            ids::MODALITY_ENTRY,
            TreatmentPhase::MethodSelection,
            modality_entry,
            route_modality_entry,
        )
        .expecting(ExpectedAnswer::Nothing)
        .input_from(InputSource::Fresh),
        StepDefinition::new(
            ids::PASS_COMPLETE,
            TreatmentPhase::DiggingDeeper,
            pass_complete,
            route_pass_complete,
        )
        .expecting(ExpectedAnswer::Nothing)
        .input_from(InputSource::Fresh),
    ]
}

// ════════════════════════════════════════════════════════════════════════════
// Generators
// ════════════════════════════════════════════════════════════════════════════

fn introduction(_: &TreatmentContext, _: Option<&str>) -> StepResponse {
    StepResponse::Transition(RoutingSignal::BeginSession)
}

fn work_type_selection(ctx: &TreatmentContext, _: Option<&str>) -> StepResponse {
    let question = if ctx.version() == 0 {
        format!("{WELCOME}\n\nWhat would you like to work on today?")
    } else {
        "What would you like to work on next?".to_string()
    };
    let menu = WorkType::MENU
        .iter()
        .enumerate()
        .map(|(i, work_type)| format!("{}. {}", i + 1, work_type.label()))
        .collect::<Vec<_>>()
        .join("\n");
    StepResponse::Display(format!("{question}\n{menu}"))
}

fn work_type_description(ctx: &TreatmentContext, _: Option<&str>) -> StepResponse {
    let text = match ctx.metadata().work_type.unwrap_or(WorkType::Problem) {
        WorkType::Problem => "In a few words, what is the problem you'd like to work on?",
        WorkType::Goal => "In a few words, what is the goal you'd like to achieve?",
        WorkType::NegativeExperience => {
            "In a few words, what is the negative experience you'd like to work on? \
             You don't need to go into detail."
        }
    };
    StepResponse::display(text)
}

fn work_type_confirmation(ctx: &TreatmentContext, input: Option<&str>) -> StepResponse {
    let noun = ctx.metadata().work_type.unwrap_or(WorkType::Problem).noun();
    match input.or(ctx.problem_statement()) {
        Some(statement) => StepResponse::Display(format!(
            "So the {noun} you want to work on is '{}'. Is that right?",
            statement.trim()
        )),
        None => StepResponse::Transition(RoutingSignal::ProblemStatementMissing),
    }
}

fn method_selection(_: &TreatmentContext, _: Option<&str>) -> StepResponse {
    StepResponse::Display(format!(
        "Which method would you like to use?\n{}",
        method_menu()
    ))
}

pub(super) fn method_menu() -> String {
    Modality::PROBLEM_METHODS
        .iter()
        .enumerate()
        .map(|(i, method)| format!("{}. {}", i + 1, method.label()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn modality_entry(_: &TreatmentContext, _: Option<&str>) -> StepResponse {
    StepResponse::Transition(RoutingSignal::EnterModality)
}

fn pass_complete(_: &TreatmentContext, _: Option<&str>) -> StepResponse {
    StepResponse::Transition(RoutingSignal::PassComplete)
}

// ════════════════════════════════════════════════════════════════════════════
// Routing
// ════════════════════════════════════════════════════════════════════════════

fn route_introduction(input: &RouteInput<'_>, _: &mut TreatmentContext) -> RouteDecision {
    match input.signal() {
        Some(RoutingSignal::BeginSession) => RouteDecision::goto(ids::WORK_TYPE_SELECTION),
        _ => RouteDecision::Stay,
    }
}

fn route_work_type_selection(input: &RouteInput<'_>, ctx: &mut TreatmentContext) -> RouteDecision {
    let (work_type, method) = match input.choice() {
        Some(Choice::Number(n)) => match WorkType::from_menu_number(n) {
            Some(work_type) => (work_type, work_type.implied_modality()),
            None => return RouteDecision::Stay,
        },
        Some(Choice::Keyword(keyword)) => {
            let work_type = keyword.work_type();
            (work_type, keyword.modality().or(work_type.implied_modality()))
        }
        _ => return RouteDecision::Stay,
    };

    let metadata = ctx.metadata_mut();
    metadata.work_type = Some(work_type);
    metadata.selected_method = method;

    match method {
        Some(_) => RouteDecision::goto(ids::WORK_TYPE_DESCRIPTION),
        None => RouteDecision::goto(ids::METHOD_SELECTION),
    }
}

fn route_work_type_description(input: &RouteInput<'_>, ctx: &mut TreatmentContext) -> RouteDecision {
    let Some(raw) = input.raw().filter(|raw| !raw.trim().is_empty()) else {
        return RouteDecision::Stay;
    };
    ctx.set_problem_statement(raw);
    if !ctx.metadata().is_nested() {
        ctx.metadata_mut().original_problem_statement = Some(raw.trim().to_string());
    }
    RouteDecision::goto(ids::WORK_TYPE_CONFIRMATION)
}

fn route_work_type_confirmation(input: &RouteInput<'_>, _: &mut TreatmentContext) -> RouteDecision {
    on_yes_no(
        input,
        RouteDecision::goto(ids::MODALITY_ENTRY),
        RouteDecision::goto(ids::WORK_TYPE_DESCRIPTION),
    )
}

/// Resolves a method answer from a number or a method keyword.
pub(super) fn chosen_method(input: &RouteInput<'_>) -> Option<Modality> {
    match input.choice()? {
        Choice::Number(n) => Modality::from_problem_menu(n),
        Choice::Keyword(keyword) => keyword.modality().filter(Modality::works_on_problems),
        _ => None,
    }
}

fn route_method_selection(input: &RouteInput<'_>, ctx: &mut TreatmentContext) -> RouteDecision {
    let Some(method) = chosen_method(input) else {
        return RouteDecision::Stay;
    };
    ctx.metadata_mut().selected_method = Some(method);
    match ctx.problem_statement() {
        Some(_) => RouteDecision::goto(ids::MODALITY_ENTRY),
        None => RouteDecision::goto(ids::WORK_TYPE_DESCRIPTION),
    }
}

fn route_modality_entry(input: &RouteInput<'_>, ctx: &mut TreatmentContext) -> RouteDecision {
    if input.signal() != Some(RoutingSignal::EnterModality) {
        return RouteDecision::Stay;
    }
    match ctx.metadata().selected_method {
        Some(method) => RouteDecision::goto(entry_step(method)),
        None if ctx.metadata().is_nested() => {
            RouteDecision::goto(ids::DIGGING_DEEPER_METHOD_SELECTION)
        }
        None => RouteDecision::goto(ids::METHOD_SELECTION),
    }
}

fn route_pass_complete(input: &RouteInput<'_>, ctx: &mut TreatmentContext) -> RouteDecision {
    match input.signal() {
        Some(RoutingSignal::PassComplete) => {
            RouteDecision::Goto(digging_deeper::complete_pass(ctx))
        }
        _ => RouteDecision::Stay,
    }
}
