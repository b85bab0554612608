//! The standard step catalog.
//!
//! Each module contributes the steps of one part of the dialogue. Generators
//! are pure functions of the context and their resolved input; route
//! handlers are the only code that changes metadata.

pub mod belief_shifting;
pub mod blockage_shifting;
mod digging_deeper;
pub mod identity_shifting;
pub mod ids;
mod integration;
pub mod problem_shifting;
pub mod reality_shifting;
mod selection;
pub mod trauma_shifting;

use super::choice::Choice;
use super::context::TreatmentContext;
use super::router::{RouteDecision, RouteInput};
use super::step::{RoutingSignal, StepDefinition, StepResponse};

/// Every step of the standard dialogue.
pub fn standard_steps() -> Vec<StepDefinition> {
    [
        selection::steps(),
        problem_shifting::steps(),
        identity_shifting::steps(),
        belief_shifting::steps(),
        blockage_shifting::steps(),
        reality_shifting::steps(),
        trauma_shifting::steps(),
        digging_deeper::steps(),
        integration::steps(),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Renders text about the current problem, or asks for it if there is none.
fn with_problem(ctx: &TreatmentContext, render: impl FnOnce(&str) -> String) -> StepResponse {
    match ctx.problem_statement() {
        Some(problem) => StepResponse::Display(render(problem)),
        None => StepResponse::Transition(RoutingSignal::ProblemStatementMissing),
    }
}

/// The answer a step echoes back, or a neutral stand-in if it has none.
fn echo(input: Option<&str>) -> &str {
    match input {
        Some(text) if !text.trim().is_empty() => text.trim(),
        _ => "that feeling",
    }
}

/// "Feel X... what happens in yourself when you feel X?"
fn feel_deeper(input: Option<&str>) -> StepResponse {
    let feeling = echo(input);
    StepResponse::Display(format!(
        "Feel '{feeling}'... what happens in yourself when you feel '{feeling}'?"
    ))
}

/// Routes any non-empty user answer to `next`.
fn on_answer(input: &RouteInput<'_>, next: &'static str) -> RouteDecision {
    match input.choice() {
        Some(Choice::Empty) | None => RouteDecision::Stay,
        Some(_) => RouteDecision::goto(next),
    }
}

/// Routes a yes/no answer; anything else stays.
fn on_yes_no(input: &RouteInput<'_>, yes: RouteDecision, no: RouteDecision) -> RouteDecision {
    match input.choice() {
        Some(Choice::Yes) => yes,
        Some(Choice::No) => no,
        _ => RouteDecision::Stay,
    }
}

/// Goes round a modality loop once more.
fn loop_back(ctx: &mut TreatmentContext, to: &'static str) -> RouteDecision {
    ctx.metadata_mut().cycle_count += 1;
    RouteDecision::goto(to)
}

/// Routes a "still a problem?" check: yes loops, no completes the pass.
fn still_a_problem(
    input: &RouteInput<'_>,
    ctx: &mut TreatmentContext,
    loop_to: &'static str,
    done: &'static str,
) -> RouteDecision {
    match input.choice() {
        Some(Choice::Yes) => loop_back(ctx, loop_to),
        Some(Choice::No) => RouteDecision::goto(done),
        _ => RouteDecision::Stay,
    }
}
