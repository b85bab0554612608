//! Step definitions and the values they produce.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

use super::choice::Choice;
use super::context::TreatmentContext;
use super::phase::TreatmentPhase;
use super::router::{RouteDecision, RouteInput};
use super::validation;

/// Stable identifier of a step, e.g. `"work_type_selection"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(Cow<'static, str>);

impl StepId {
    /// Wraps one of the compile-time step ids.
    pub const fn from_static(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for StepId {
    fn from(id: &'static str) -> Self {
        Self::from_static(id)
    }
}

impl From<String> for StepId {
    fn from(id: String) -> Self {
        Self(Cow::Owned(id))
    }
}

impl PartialEq<&str> for StepId {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Internal routing instruction emitted by a generator.
///
/// Signals are consumed by the signal processor and can never be displayed:
/// a generator either displays text or transitions, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingSignal {
    /// The welcome step hands over to work-type selection.
    BeginSession,
    /// Work type, method and problem are known; start the modality.
    EnterModality,
    /// A modality pass finished; resume a parent flow or dig deeper.
    PassComplete,
    /// A step needs the problem statement and none has been captured.
    ProblemStatementMissing,
}

impl RoutingSignal {
    pub const ALL: [RoutingSignal; 4] = [
        RoutingSignal::BeginSession,
        RoutingSignal::EnterModality,
        RoutingSignal::PassComplete,
        RoutingSignal::ProblemStatementMissing,
    ];

    /// Internal token used in logs.
    pub fn token(&self) -> &'static str {
        match self {
            RoutingSignal::BeginSession => "SIGNAL_BEGIN_SESSION",
            RoutingSignal::EnterModality => "SIGNAL_ENTER_MODALITY",
            RoutingSignal::PassComplete => "SIGNAL_PASS_COMPLETE",
            RoutingSignal::ProblemStatementMissing => "SIGNAL_PROBLEM_STATEMENT_MISSING",
        }
    }
}

/// What a step generator produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepResponse {
    Display(String),
    Transition(RoutingSignal),
}

impl StepResponse {
    pub fn display(text: impl Into<String>) -> Self {
        StepResponse::Display(text.into())
    }
}

/// Shape of the answer a step expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ExpectedAnswer {
    FreeText,
    NumericChoice { min: u32, max: u32 },
    YesNo,
    Scale { min: u32, max: u32 },
    /// Steps that only emit signals or end the session.
    Nothing,
}

/// Where a freshly entered step's generator gets its input from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    /// The recorded answer of the logical predecessor, or nothing.
    PredecessorOrFresh,
    /// Always ask fresh.
    Fresh,
    /// The raw input that caused the transition. Only for steps that echo
    /// what the user just said, such as confirmations.
    TransitionValue,
}

/// Result of running a step's validator over raw input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Accepted,
    Rejected { clarification: String },
    /// The scripted rules cannot classify the input with confidence.
    Uncertain,
}

/// A selectable answer offered to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChoiceOption {
    pub value: &'static str,
    pub label: &'static str,
}

impl ChoiceOption {
    pub const fn new(value: &'static str, label: &'static str) -> Self {
        Self { value, label }
    }
}

pub const YES_NO_OPTIONS: &[ChoiceOption] = &[
    ChoiceOption::new("yes", "Yes"),
    ChoiceOption::new("no", "No"),
];

pub type Generator = fn(&TreatmentContext, Option<&str>) -> StepResponse;
pub type Validator = fn(&str, &Choice) -> ValidationOutcome;
pub type RouteHandler = fn(&RouteInput<'_>, &mut TreatmentContext) -> RouteDecision;

/// One turn-level unit of the dialogue.
#[derive(Clone)]
pub struct StepDefinition {
    pub id: StepId,
    pub phase: TreatmentPhase,
    pub expected: ExpectedAnswer,
    pub generator: Generator,
    pub validator: Option<Validator>,
    pub input_source: InputSource,
    /// Logical predecessor whose answer this step is rendered with.
    pub previous: Option<StepId>,
    pub route: RouteHandler,
    /// Whether a digging-deeper bridge phrase may prefix this step.
    pub bridge_eligible: bool,
    pub choices: &'static [ChoiceOption],
}

impl StepDefinition {
    pub fn new(
        id: &'static str,
        phase: TreatmentPhase,
        generator: Generator,
        route: RouteHandler,
    ) -> Self {
        Self {
            id: StepId::from_static(id),
            phase,
            expected: ExpectedAnswer::FreeText,
            generator,
            validator: None,
            input_source: InputSource::PredecessorOrFresh,
            previous: None,
            route,
            bridge_eligible: false,
            choices: &[],
        }
    }

    pub fn expecting(mut self, expected: ExpectedAnswer) -> Self {
        self.expected = expected;
        self
    }

    pub fn validated_by(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn after(mut self, previous: &'static str) -> Self {
        self.previous = Some(StepId::from_static(previous));
        self
    }

    pub fn input_from(mut self, source: InputSource) -> Self {
        self.input_source = source;
        self
    }

    pub fn with_bridge(mut self) -> Self {
        self.bridge_eligible = true;
        self
    }

    pub fn with_choices(mut self, choices: &'static [ChoiceOption]) -> Self {
        self.choices = choices;
        self
    }

    /// Runs the step's own validator, or checks the expected answer shape.
    pub fn validate(&self, raw: &str, choice: &Choice) -> ValidationOutcome {
        match self.validator {
            Some(validator) => validator(raw, choice),
            None => validation::validate_shape(self.expected, choice),
        }
    }
}

impl fmt::Debug for StepDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDefinition")
            .field("id", &self.id)
            .field("phase", &self.phase)
            .field("expected", &self.expected)
            .field("input_source", &self.input_source)
            .field("previous", &self.previous)
            .field("bridge_eligible", &self.bridge_eligible)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn static_and_owned_ids_are_equal_and_hash_alike() {
        let a = StepId::from_static("work_type_selection");
        let b = StepId::from(String::from("work_type_selection"));
        assert_eq!(a, b);

        let mut map = HashMap::new();
        map.insert(a, 1);
        assert_eq!(map.get(&b), Some(&1));
    }

    #[test]
    fn step_id_serializes_as_plain_string() {
        let id = StepId::from_static("scenario_check_1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"scenario_check_1\"");
        let back: StepId = serde_json::from_str("\"scenario_check_1\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn signal_tokens_are_distinct() {
        let mut tokens: Vec<_> = RoutingSignal::ALL.iter().map(|s| s.token()).collect();
        tokens.sort();
        tokens.dedup();
        assert_eq!(tokens.len(), RoutingSignal::ALL.len());
    }
}
