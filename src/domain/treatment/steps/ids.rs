//! Stable ids of the flow-control steps.
//!
//! Modality script ids live with their scripts.

use crate::domain::treatment::phase::Modality;

use super::{
    belief_shifting, blockage_shifting, identity_shifting, problem_shifting, reality_shifting,
    trauma_shifting,
};

pub const INTRODUCTION: &str = "introduction";
pub const WORK_TYPE_SELECTION: &str = "work_type_selection";
pub const WORK_TYPE_DESCRIPTION: &str = "work_type_description";
pub const WORK_TYPE_CONFIRMATION: &str = "work_type_confirmation";
pub const METHOD_SELECTION: &str = "method_selection";
pub const MODALITY_ENTRY: &str = "modality_entry";
pub const PASS_COMPLETE: &str = "pass_complete";

pub const DIGGING_DEEPER_START: &str = "digging_deeper_start";
pub const FUTURE_PROBLEM_CHECK: &str = "future_problem_check";
pub const SCENARIO_CHECK_1: &str = "scenario_check_1";
pub const SCENARIO_CHECK_2: &str = "scenario_check_2";
pub const SCENARIO_CHECK_3: &str = "scenario_check_3";
pub const ANYTHING_ELSE_CHECK_1: &str = "anything_else_check_1";
pub const ANYTHING_ELSE_CHECK_2: &str = "anything_else_check_2";
pub const DIGGING_DEEPER_NEW_PROBLEM: &str = "digging_deeper_new_problem";
pub const DIGGING_DEEPER_METHOD_SELECTION: &str = "digging_deeper_method_selection";

pub const INTEGRATION_REFLECTION: &str = "integration_reflection";
pub const INTEGRATION_ACTION: &str = "integration_action";
pub const INTEGRATION_NEXT_STEPS: &str = "integration_next_steps";
pub const SESSION_COMPLETE: &str = "session_complete";

/// Scenario check `n` (1-based, clamped to the last check).
pub fn scenario_check(n: u8) -> &'static str {
    match n {
        0 | 1 => SCENARIO_CHECK_1,
        2 => SCENARIO_CHECK_2,
        _ => SCENARIO_CHECK_3,
    }
}

/// Anything-else check `n` (1-based, clamped to the last check).
pub fn anything_else_check(n: u8) -> &'static str {
    match n {
        0 | 1 => ANYTHING_ELSE_CHECK_1,
        _ => ANYTHING_ELSE_CHECK_2,
    }
}

/// First step of a modality's script.
pub fn entry_step(modality: Modality) -> &'static str {
    match modality {
        Modality::ProblemShifting => problem_shifting::FEEL_PROBLEM,
        Modality::IdentityShifting => identity_shifting::IDENTIFY,
        Modality::BeliefShifting => belief_shifting::IDENTIFY,
        Modality::BlockageShifting => blockage_shifting::FEEL_PROBLEM,
        Modality::RealityShifting => reality_shifting::FEEL_GOAL,
        Modality::TraumaShifting => trauma_shifting::IDENTIFY,
    }
}
