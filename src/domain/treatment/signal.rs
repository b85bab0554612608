//! Signal processor.
//!
//! Renders the step the router picked. When that step's generator emits a
//! [`RoutingSignal`] instead of text, the signal is routed from that step and
//! the next destination is rendered, until some step displays text.

use tracing::error;

use super::context::TreatmentContext;
use super::digging_deeper;
use super::errors::TreatmentError;
use super::input_fallback::resolve_input;
use super::phase::TreatmentPhase;
use super::registry::StepRegistry;
use super::router::{RouteDecision, RouteInput, Router};
use super::step::{RoutingSignal, StepId, StepResponse};

/// Default bound on signal hops per turn.
pub const DEFAULT_MAX_SIGNAL_ITERATIONS: usize = 5;

/// A step that has been rendered to text.
///
/// There is no way to build one from a signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedStep {
    pub step: StepId,
    pub phase: TreatmentPhase,
    pub text: String,
}

#[derive(Debug, Clone, Copy)]
pub struct SignalProcessor<'r> {
    registry: &'r StepRegistry,
    router: Router<'r>,
    max_iterations: usize,
}

impl<'r> SignalProcessor<'r> {
    pub fn new(registry: &'r StepRegistry, max_iterations: usize) -> Self {
        Self {
            registry,
            router: Router::new(registry),
            max_iterations: max_iterations.max(1),
        }
    }

    /// Renders `destination`, following signals until text is produced.
    ///
    /// `transition_value` is the raw input that led to `destination`. It is
    /// dropped after the first signal hop.
    pub fn resolve(
        &self,
        destination: StepId,
        transition_value: Option<&str>,
        ctx: &mut TreatmentContext,
    ) -> Result<RenderedStep, TreatmentError> {
        let mut current = destination;
        let mut transition_value = transition_value;
        let mut last_signal = None;

        for _ in 0..self.max_iterations {
            let step = self.registry.get_step(&current)?;
            let input = resolve_input(self.registry, step, transition_value, ctx);

            match (step.generator)(ctx, input.as_deref()) {
                StepResponse::Display(text) => {
                    let text = if step.bridge_eligible {
                        digging_deeper::apply_bridge(ctx, text)
                    } else {
                        text
                    };
                    return Ok(RenderedStep {
                        step: current,
                        phase: step.phase,
                        text,
                    });
                }
                StepResponse::Transition(signal) => {
                    last_signal = Some(signal);
                    transition_value = None;
                    let decision = self.router.determine_next_step(
                        &current,
                        &RouteInput::Signal(signal),
                        ctx,
                    )?;
                    if let RouteDecision::Goto(next) = decision {
                        current = next;
                    }
                }
            }
        }

        let signal = last_signal.unwrap_or(RoutingSignal::BeginSession);
        error!(
            session_id = %ctx.session_id(),
            step = %current,
            signal = signal.token(),
            iterations = self.max_iterations,
            "Signal resolution overflow"
        );
        Err(TreatmentError::SignalResolutionOverflow {
            step: current,
            signal,
            iterations: self.max_iterations,
        })
    }
}
