//! Decides which input a freshly entered step is rendered with.

use super::context::TreatmentContext;
use super::registry::StepRegistry;
use super::step::{InputSource, StepDefinition};

/// Returns the input for `step`'s generator.
///
/// `transition_value` is the raw input that caused the transition into the
/// step. It is only ever passed through to steps that declare
/// [`InputSource::TransitionValue`]; every other step sees its logical
/// predecessor's recorded answer, or nothing.
pub fn resolve_input(
    registry: &StepRegistry,
    step: &StepDefinition,
    transition_value: Option<&str>,
    ctx: &TreatmentContext,
) -> Option<String> {
    match step.input_source {
        InputSource::Fresh => None,
        InputSource::PredecessorOrFresh => predecessor_answer(registry, step, ctx),
        InputSource::TransitionValue => transition_value
            .map(str::to_owned)
            .or_else(|| predecessor_answer(registry, step, ctx)),
    }
}

fn predecessor_answer(
    registry: &StepRegistry,
    step: &StepDefinition,
    ctx: &TreatmentContext,
) -> Option<String> {
    let previous = registry.get_previous_step(&step.id, step.phase)?;
    ctx.response_for(&previous).map(str::to_owned)
}
