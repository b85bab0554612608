//! Step registry - the static catalog of step definitions.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::errors::TreatmentError;
use super::phase::TreatmentPhase;
use super::step::{StepDefinition, StepId};
use super::steps;

static STANDARD: Lazy<StepRegistry> =
    Lazy::new(|| StepRegistry::from_steps(steps::standard_steps()));

/// Lookup table from step id to definition.
///
/// The standard registry is built once and shared by every session.
#[derive(Debug, Clone, Default)]
pub struct StepRegistry {
    steps: HashMap<StepId, StepDefinition>,
}

impl StepRegistry {
    /// The full catalog used in production.
    pub fn standard() -> &'static StepRegistry {
        &STANDARD
    }

    /// An empty registry, for tests that build their own catalog.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a registry from definitions. Later duplicates replace earlier ones.
    pub fn from_steps(steps: impl IntoIterator<Item = StepDefinition>) -> Self {
        steps.into_iter().fold(Self::empty(), Self::with_step)
    }

    pub fn with_step(mut self, step: StepDefinition) -> Self {
        self.steps.insert(step.id.clone(), step);
        self
    }

    pub fn get_step(&self, id: &StepId) -> Result<&StepDefinition, TreatmentError> {
        self.steps
            .get(id)
            .ok_or_else(|| TreatmentError::StepNotFound(id.clone()))
    }

    /// The declared logical predecessor of `id`, if it belongs to `phase`.
    pub fn get_previous_step(&self, id: &StepId, phase: TreatmentPhase) -> Option<StepId> {
        let previous = self.steps.get(id)?.previous.as_ref()?;
        let previous_step = self.steps.get(previous)?;
        (previous_step.phase == phase).then(|| previous.clone())
    }

    pub fn contains(&self, id: &StepId) -> bool {
        self.steps.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> impl Iterator<Item = &StepDefinition> {
        self.steps.values()
    }
}
