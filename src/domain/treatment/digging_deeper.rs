//! Digging-deeper sub-flow.
//!
//! After a pass completes the user may dig deeper:
//!
//! ```text
//! digging_deeper_start -> future_problem_check -> scenario_check_1..3
//!     -> anything_else_check_1..2 -> integration
//! ```
//!
//! A "yes" at any check pushes a [`ReturnPoint`], clears the modality state
//! and runs a full nested pass on the new problem. When that pass completes
//! the return point is popped, the parent's state restored, and the chain
//! continues with the next check.

use tracing::{debug, info};

use super::context::{BridgeState, DiggingCheck, ReturnPoint, TreatmentContext};
use super::step::StepId;
use super::steps::ids;

/// Scenario checks asked per chain, at most.
pub const MAX_SCENARIO_CHECKS: u8 = 3;

/// Anything-else checks asked per chain, at most.
pub const MAX_ANYTHING_ELSE_CHECKS: u8 = 2;

impl DiggingCheck {
    /// The step that asks this check.
    pub fn step_id(&self) -> &'static str {
        match self {
            DiggingCheck::FutureProblem => ids::FUTURE_PROBLEM_CHECK,
            DiggingCheck::Scenario(n) => ids::scenario_check(*n),
            DiggingCheck::AnythingElse(n) => ids::anything_else_check(*n),
        }
    }

    /// Lead-in prefixed to the first step of a nested pass this check spawned.
    pub fn bridge_phrase(&self) -> &'static str {
        match self {
            DiggingCheck::FutureProblem => "Put yourself in the future and ",
            DiggingCheck::Scenario(_) => "Imagine yourself in that scenario and ",
            DiggingCheck::AnythingElse(_) => "Thinking about what else there is, ",
        }
    }
}

/// Records consent to dig deeper. Consent lasts for the rest of the chain.
pub fn grant_consent(ctx: &mut TreatmentContext) {
    ctx.metadata_mut().dig_deeper_consent = true;
}

/// Picks the check that follows `after` and counts it as asked.
///
/// Returns the integration step once both counters are exhausted, so no
/// number of "yes" answers can push the chain past its bounds.
pub fn next_check(ctx: &mut TreatmentContext, after: DiggingCheck) -> &'static str {
    let metadata = ctx.metadata_mut();
    let wants_scenario = matches!(
        after,
        DiggingCheck::FutureProblem | DiggingCheck::Scenario(_)
    );

    if wants_scenario && metadata.scenario_checks_asked < MAX_SCENARIO_CHECKS {
        metadata.scenario_checks_asked += 1;
        return ids::scenario_check(metadata.scenario_checks_asked);
    }

    if metadata.anything_else_checks_asked < MAX_ANYTHING_ELSE_CHECKS {
        metadata.anything_else_checks_asked += 1;
        return ids::anything_else_check(metadata.anything_else_checks_asked);
    }

    ids::INTEGRATION_REFLECTION
}

/// Starts a nested pass for a "yes" at `check`.
///
/// Returns the step that captures the new problem statement.
pub fn start_nested_pass(ctx: &mut TreatmentContext, check: DiggingCheck) -> &'static str {
    let resume_step = StepId::from_static(next_check(ctx, check));
    let snapshot = ctx.snapshot_modality();
    let depth = ctx.metadata().depth();

    ctx.metadata_mut().return_stack.push(ReturnPoint {
        depth,
        resume_step,
        spawned_by: check,
        snapshot,
    });
    ctx.clear_modality();
    ctx.metadata_mut().bridge = Some(BridgeState {
        spawned_by: check,
        used: false,
    });

    info!(
        session_id = %ctx.session_id(),
        check = ?check,
        depth = depth + 1,
        "Nested pass started"
    );

    ids::DIGGING_DEEPER_NEW_PROBLEM
}

/// Where a completed pass goes next.
///
/// A pending return point is resumed first. Otherwise the chain either
/// starts (no consent yet) or is already done and moves to integration.
pub fn complete_pass(ctx: &mut TreatmentContext) -> StepId {
    if let Some(point) = ctx.metadata_mut().return_stack.pop() {
        debug!(
            session_id = %ctx.session_id(),
            resume = %point.resume_step,
            depth = point.depth,
            "Nested pass complete, resuming parent"
        );
        ctx.restore_modality(point.snapshot);
        return point.resume_step;
    }

    if ctx.metadata().dig_deeper_consent {
        StepId::from_static(ids::INTEGRATION_REFLECTION)
    } else {
        StepId::from_static(ids::DIGGING_DEEPER_START)
    }
}

/// Prefixes `text` with the pending bridge phrase, once per nested entry.
pub fn apply_bridge(ctx: &mut TreatmentContext, text: String) -> String {
    let Some(bridge) = ctx.metadata().bridge.filter(|b| !b.used) else {
        return text;
    };
    if let Some(pending) = ctx.metadata_mut().bridge.as_mut() {
        pending.used = true;
    }
    format!("{}{}", bridge.spawned_by.bridge_phrase(), lowercase_first(&text))
}

fn lowercase_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
