//! Work types, modalities, and the coarse phases of a treatment dialogue.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What the user chose to work on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkType {
    Problem,
    Goal,
    NegativeExperience,
}

impl WorkType {
    /// Menu order shown at work-type selection.
    pub const MENU: [WorkType; 3] = [
        WorkType::Problem,
        WorkType::Goal,
        WorkType::NegativeExperience,
    ];

    /// Resolves a 1-based menu number.
    pub fn from_menu_number(n: u32) -> Option<Self> {
        match n {
            1 => Some(WorkType::Problem),
            2 => Some(WorkType::Goal),
            3 => Some(WorkType::NegativeExperience),
            _ => None,
        }
    }

    /// The noun used in scripts ("the problem", "the goal", ...).
    pub fn noun(&self) -> &'static str {
        match self {
            WorkType::Problem => "problem",
            WorkType::Goal => "goal",
            WorkType::NegativeExperience => "experience",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WorkType::Problem => "A problem",
            WorkType::Goal => "A goal",
            WorkType::NegativeExperience => "A negative experience",
        }
    }

    /// The modality implied by the work type, when there is no choice to make.
    ///
    /// Goals are always worked with Reality Shifting and negative experiences
    /// with Trauma Shifting. Problems need an explicit method selection.
    pub fn implied_modality(&self) -> Option<Modality> {
        match self {
            WorkType::Problem => None,
            WorkType::Goal => Some(Modality::RealityShifting),
            WorkType::NegativeExperience => Some(Modality::TraumaShifting),
        }
    }
}

/// The six therapeutic techniques the engine can execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    ProblemShifting,
    IdentityShifting,
    BeliefShifting,
    BlockageShifting,
    RealityShifting,
    TraumaShifting,
}

impl Modality {
    pub const ALL: [Modality; 6] = [
        Modality::ProblemShifting,
        Modality::IdentityShifting,
        Modality::BeliefShifting,
        Modality::BlockageShifting,
        Modality::RealityShifting,
        Modality::TraumaShifting,
    ];

    /// Methods offered when the work type is a problem, in menu order.
    pub const PROBLEM_METHODS: [Modality; 4] = [
        Modality::ProblemShifting,
        Modality::IdentityShifting,
        Modality::BeliefShifting,
        Modality::BlockageShifting,
    ];

    /// Resolves a 1-based number from the problem method menu.
    pub fn from_problem_menu(n: u32) -> Option<Self> {
        let index = usize::try_from(n).ok()?.checked_sub(1)?;
        Self::PROBLEM_METHODS.get(index).copied()
    }

    /// Returns true if the method can be chosen for a problem.
    pub fn works_on_problems(&self) -> bool {
        Self::PROBLEM_METHODS.contains(self)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Modality::ProblemShifting => "Problem Shifting",
            Modality::IdentityShifting => "Identity Shifting",
            Modality::BeliefShifting => "Belief Shifting",
            Modality::BlockageShifting => "Blockage Shifting",
            Modality::RealityShifting => "Reality Shifting",
            Modality::TraumaShifting => "Trauma Shifting",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse grouping of steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreatmentPhase {
    Introduction,
    WorkTypeSelection,
    MethodSelection,
    Modality(Modality),
    DiggingDeeper,
    Integration,
}

impl TreatmentPhase {
    /// Returns a short label, suitable for UI display.
    pub fn label(&self) -> &'static str {
        match self {
            TreatmentPhase::Introduction => "Introduction",
            TreatmentPhase::WorkTypeSelection => "Choosing what to work on",
            TreatmentPhase::MethodSelection => "Choosing a method",
            TreatmentPhase::Modality(m) => m.label(),
            TreatmentPhase::DiggingDeeper => "Digging deeper",
            TreatmentPhase::Integration => "Integration",
        }
    }

    /// The modality running in this phase, if any.
    pub fn modality(&self) -> Option<Modality> {
        match self {
            TreatmentPhase::Modality(m) => Some(*m),
            _ => None,
        }
    }
}

impl Default for TreatmentPhase {
    fn default() -> Self {
        Self::Introduction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod work_type {
        use super::*;

        #[test]
        fn menu_numbers_map_in_order() {
            for (i, wt) in WorkType::MENU.iter().enumerate() {
                assert_eq!(WorkType::from_menu_number(i as u32 + 1), Some(*wt));
            }
            assert_eq!(WorkType::from_menu_number(0), None);
            assert_eq!(WorkType::from_menu_number(4), None);
        }

        #[test]
        fn only_problems_need_a_method_choice() {
            assert_eq!(WorkType::Problem.implied_modality(), None);
            assert_eq!(
                WorkType::Goal.implied_modality(),
                Some(Modality::RealityShifting)
            );
            assert_eq!(
                WorkType::NegativeExperience.implied_modality(),
                Some(Modality::TraumaShifting)
            );
        }
    }

    mod modality {
        use super::*;

        #[test]
        fn problem_menu_is_one_based() {
            assert_eq!(Modality::from_problem_menu(1), Some(Modality::ProblemShifting));
            assert_eq!(Modality::from_problem_menu(4), Some(Modality::BlockageShifting));
            assert_eq!(Modality::from_problem_menu(0), None);
            assert_eq!(Modality::from_problem_menu(5), None);
        }

        #[test]
        fn goal_and_trauma_methods_are_not_offered_for_problems() {
            assert!(!Modality::RealityShifting.works_on_problems());
            assert!(!Modality::TraumaShifting.works_on_problems());
            assert!(Modality::BeliefShifting.works_on_problems());
        }

        #[test]
        fn serializes_to_snake_case() {
            let json = serde_json::to_string(&Modality::IdentityShifting).unwrap();
            assert_eq!(json, "\"identity_shifting\"");
        }
    }

    mod phase {
        use super::*;

        #[test]
        fn default_phase_is_introduction() {
            assert_eq!(TreatmentPhase::default(), TreatmentPhase::Introduction);
        }

        #[test]
        fn modality_phase_round_trips_through_json() {
            let phase = TreatmentPhase::Modality(Modality::TraumaShifting);
            let json = serde_json::to_string(&phase).unwrap();
            let back: TreatmentPhase = serde_json::from_str(&json).unwrap();
            assert_eq!(back, phase);
            assert_eq!(back.modality(), Some(Modality::TraumaShifting));
        }

        #[test]
        fn all_phases_have_labels() {
            let mut phases = vec![
                TreatmentPhase::Introduction,
                TreatmentPhase::WorkTypeSelection,
                TreatmentPhase::MethodSelection,
                TreatmentPhase::DiggingDeeper,
                TreatmentPhase::Integration,
            ];
            phases.extend(Modality::ALL.iter().map(|m| TreatmentPhase::Modality(*m)));
            for phase in phases {
                assert!(!phase.label().is_empty());
            }
        }
    }
}
