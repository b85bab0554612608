//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `TreatmentStore` - Persistence of contexts, sessions and interaction history
//! - `ValidationFallback` - Optional second opinion on unclear input

mod treatment_store;
mod validation_fallback;

pub use treatment_store::{InteractionRecord, StoreError, TreatmentStore};
pub use validation_fallback::{
    FallbackVerdict, StepPromptContext, ValidationFallback, ValidationFallbackError,
};
