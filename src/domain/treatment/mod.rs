//! Treatment dialogue domain.
//!
//! A scripted, signal-driven state machine that walks a user through one of
//! six modalities, one step per turn.
//!
//! # Module Organization
//!
//! - `phase` - Work types, modalities and coarse phases
//! - `choice` - Single normalization of raw input
//! - `step` - Step definitions, signals and responses
//! - `context` - Per-session state and metadata
//! - `registry` - The step catalog
//! - `router` - Next-step decisions
//! - `signal` - Resolution of internal signals into displayable text
//! - `input_fallback` - Which input a freshly entered step sees
//! - `digging_deeper` - Nested passes and the check chain
//! - `engine` - One synchronous turn over a context
//! - `steps` - The standard step catalog

mod choice;
mod context;
pub mod digging_deeper;
mod engine;
mod errors;
mod input_fallback;
mod phase;
mod registry;
mod router;
mod signal;
mod step;
pub mod steps;
pub mod validation;

pub use choice::{Choice, MenuKeyword};
pub use context::{
    BridgeState, DiggingCheck, ModalitySnapshot, ReturnPoint, TreatmentContext, TreatmentMetadata,
};
pub use engine::{EngineOutput, PreparedTurn, TreatmentEngine, REPROMPT_PREFIX};
pub use errors::{TreatmentError, GENERIC_FAILURE_MESSAGE, SESSION_EXPIRED_MESSAGE};
pub use input_fallback::resolve_input;
pub use phase::{Modality, TreatmentPhase, WorkType};
pub use registry::StepRegistry;
pub use router::{RouteDecision, RouteInput, Router};
pub use signal::{RenderedStep, SignalProcessor, DEFAULT_MAX_SIGNAL_ITERATIONS};
pub use step::{
    ChoiceOption, ExpectedAnswer, Generator, InputSource, RouteHandler, RoutingSignal,
    StepDefinition, StepId, StepResponse, ValidationOutcome, Validator, YES_NO_OPTIONS,
};
